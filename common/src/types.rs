//! ストリーム・画像の型定義
//!
//! CLIとライブラリで共有される型:
//! - StreamRecord: NDJSONストリームの1行分
//! - ImageMime: 受け付ける画像形式

use serde::{Deserialize, Serialize};

/// NDJSONストリームの1レコード
///
/// `{"message": {"content": "..."}, "done": false}` の形。
/// 未知のフィールドは無視し、欠けたフィールドは `None` になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamRecord {
    pub message: Option<StreamMessage>,
    pub done: Option<bool>,
}

/// レコード内のメッセージ部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl StreamRecord {
    /// テキスト断片付きのレコードを作る
    pub fn fragment(content: impl Into<String>) -> Self {
        Self {
            message: Some(StreamMessage {
                role: Some("assistant".into()),
                content: Some(content.into()),
            }),
            done: Some(false),
        }
    }

    /// 終端レコード（`done: true`）を作る
    pub fn finished() -> Self {
        Self {
            message: None,
            done: Some(true),
        }
    }

    /// 空でない `message.content` を返す
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }
}

/// 受け付ける画像のMIMEタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

/// 対応MIMEタイプ一覧
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    /// MIME文字列から判定（大文字小文字・パラメータは無視）
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    /// 拡張子から判定
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageMime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s).ok_or_else(|| {
            format!(
                "Unsupported image type: {}. Use {}",
                s,
                SUPPORTED_IMAGE_TYPES.join(" or ")
            )
        })
    }
}
