//! 画像読み込み・エンコードのテスト

use base64::prelude::*;
use tempfile::tempdir;
use vision_ocr::codec::{self, ImagePayload, ImageRef};
use vision_ocr::error::CodecError;
use vision_ocr_common::ImageMime;

const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// 拡張子からMIMEを決める
#[tokio::test]
async fn test_load_by_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("receipt.JPG");
    std::fs::write(&path, JPEG_HEADER).unwrap();

    let payload = ImagePayload::load(&path).await.unwrap();
    assert_eq!(payload.mime(), ImageMime::Jpeg);
    assert_eq!(payload.bytes(), &JPEG_HEADER);
}

/// 拡張子なしは先頭バイトで判定
#[tokio::test]
async fn test_load_sniffs_without_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("scan");
    std::fs::write(&path, PNG_HEADER).unwrap();

    let payload = ImagePayload::load(&path).await.unwrap();
    assert_eq!(payload.mime(), ImageMime::Png);
}

/// 非対応の拡張子は読み込み前に弾く
#[tokio::test]
async fn test_load_rejects_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("anim.gif");
    std::fs::write(&path, b"GIF89a").unwrap();

    let err = ImagePayload::load(&path).await.unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType(ref t) if t == ".gif"));
}

/// 存在しないファイル
#[tokio::test]
async fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("missing.png");

    let err = ImagePayload::load(&path).await.unwrap_err();
    match err {
        CodecError::Unreadable { path: p, .. } => assert_eq!(p, path),
        other => panic!("Unreadable を期待: {:?}", other),
    }
}

/// 宣言MIMEの検証
#[test]
fn test_from_declared() {
    assert!(ImagePayload::from_declared(PNG_HEADER.to_vec(), "image/png").is_ok());
    assert!(ImagePayload::from_declared(JPEG_HEADER.to_vec(), "image/jpeg").is_ok());
    assert!(matches!(
        ImagePayload::from_declared(vec![1, 2, 3], "image/webp"),
        Err(CodecError::UnsupportedType(_))
    ));
}

/// エンコード結果はデコードすると元のバイト列に戻る
#[tokio::test]
async fn test_encode_loaded_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("page.png");
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    std::fs::write(&path, &bytes).unwrap();

    let payload = ImagePayload::load(&path).await.unwrap();
    let encoded = codec::encode(&payload).unwrap();

    assert_eq!(BASE64_STANDARD.decode(encoded.as_str()).unwrap(), bytes);
}

/// 空ファイルはエンコードで失敗
#[tokio::test]
async fn test_encode_empty_file_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.png");
    std::fs::write(&path, b"").unwrap();

    let payload = ImagePayload::load(&path).await.unwrap();
    assert!(matches!(codec::encode(&payload), Err(CodecError::Empty)));
}

/// 画像参照は絶対パスに解決される
#[tokio::test]
async fn test_image_ref_from_existing_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("a.png");
    std::fs::write(&path, PNG_HEADER).unwrap();

    let image_ref = ImageRef::from_path(&path).await;
    assert!(std::path::Path::new(image_ref.as_str()).is_absolute());
    assert!(image_ref.as_str().ends_with("a.png"));
}

/// 存在しないパスはそのまま使う
#[tokio::test]
async fn test_image_ref_from_missing_path() {
    let image_ref = ImageRef::from_path(std::path::Path::new("relative/missing.png")).await;
    assert_eq!(image_ref.as_str(), "relative/missing.png");
}
