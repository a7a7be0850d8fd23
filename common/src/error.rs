//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// ストリームは正常終了したが、使えるテキストが一つもなかった
    #[error("画像からテキストを抽出できませんでした")]
    EmptyExtraction,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
