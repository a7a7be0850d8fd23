//! 画像エンコードモジュール
//!
//! 読み込み済みの画像バイト列を、推論リクエストに載せる
//! Base64文字列（`data:` プレフィックスなし）に変換する。

use crate::error::CodecError;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use vision_ocr_common::ImageMime;

/// 読み込み済みの画像（JPG/PNGのみ）
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime: ImageMime,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: ImageMime) -> Self {
        Self { bytes, mime }
    }

    /// 宣言されたMIMEタイプ付きで作る
    ///
    /// JPG/PNG以外は [`CodecError::UnsupportedType`]
    pub fn from_declared(bytes: Vec<u8>, declared_mime: &str) -> Result<Self, CodecError> {
        let mime = ImageMime::from_mime(declared_mime)
            .ok_or_else(|| CodecError::UnsupportedType(declared_mime.to_string()))?;
        Ok(Self::new(bytes, mime))
    }

    /// ファイルから読み込む
    ///
    /// 形式は拡張子で判定し、拡張子がなければ先頭バイトで判定する
    pub async fn load(path: &Path) -> Result<Self, CodecError> {
        let from_ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string());

        if let Some(ext) = &from_ext {
            if ImageMime::from_extension(ext).is_none() {
                return Err(CodecError::UnsupportedType(format!(".{}", ext)));
            }
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CodecError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let mime = match from_ext.as_deref().and_then(ImageMime::from_extension) {
            Some(mime) => mime,
            None => sniff_mime(&bytes)?,
        };

        debug!(path = %path.display(), mime = %mime, size = bytes.len(), "画像を読み込み");
        Ok(Self::new(bytes, mime))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// 先頭バイトから形式を判定
pub fn sniff_mime(bytes: &[u8]) -> Result<ImageMime, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => Ok(ImageMime::Jpeg),
        Ok(image::ImageFormat::Png) => Ok(ImageMime::Png),
        Ok(other) => Err(CodecError::UnsupportedType(format!("{:?}", other))),
        Err(_) => Err(CodecError::UnsupportedType("unknown".into())),
    }
}

/// Base64エンコード済み画像
///
/// 送信中のリクエストだけが所有し、リクエスト終了とともに破棄される
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedImage({} chars)", self.0.len())
    }
}

/// 画像をBase64に変換
///
/// 同じ入力には常に同じ出力を返す
pub fn encode(payload: &ImagePayload) -> Result<EncodedImage, CodecError> {
    if payload.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(EncodedImage(BASE64_STANDARD.encode(payload.bytes())))
}

/// 表示用の画像参照（元ファイルのパスなど）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// ファイルパスから作る（可能なら絶対パスに変換）
    pub async fn from_path(path: &Path) -> Self {
        let abs: PathBuf = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        Self(abs.to_string_lossy().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
