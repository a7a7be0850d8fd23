use std::path::PathBuf;
use thiserror::Error;

/// 画像の読み込み・エンコード失敗
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("対応していない画像形式です: {0}（JPGまたはPNGを指定してください）")]
    UnsupportedType(String),

    #[error("画像ファイルを読み込めません: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("画像データが空です")]
    Empty,
}

#[derive(Error, Debug)]
pub enum VisionOcrError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("画像の処理に失敗しました: {status} {body}")]
    Transport { status: u16, body: String },

    #[error("推論サーバーに接続できません: {0}")]
    Request(#[from] reqwest::Error),

    #[error("ストリームの受信が中断されました: {0}")]
    StreamInterrupted(String),

    #[error("画像からテキストを抽出できませんでした")]
    EmptyExtraction,

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<vision_ocr_common::Error> for VisionOcrError {
    fn from(err: vision_ocr_common::Error) -> Self {
        match err {
            vision_ocr_common::Error::EmptyExtraction => VisionOcrError::EmptyExtraction,
        }
    }
}

pub type Result<T> = std::result::Result<T, VisionOcrError>;

/// 失敗の分類（表示層向け）
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// 画像の読み込み・形式エラー
    Codec,
    /// HTTPハンドシェイク・ステータス・受信エラー
    Transport,
    /// テキストが1文字も得られなかった
    EmptyExtraction,
    Internal,
}

/// `RequestState::Failed` が保持するエラー情報
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// Transportで応答ステータスが得られた場合のみ
    pub status: Option<u16>,
}

impl From<&VisionOcrError> for ErrorInfo {
    fn from(err: &VisionOcrError) -> Self {
        let (kind, status) = match err {
            VisionOcrError::Codec(_) => (ErrorKind::Codec, None),
            VisionOcrError::Transport { status, .. } => (ErrorKind::Transport, Some(*status)),
            VisionOcrError::Request(e) => (ErrorKind::Transport, e.status().map(|s| s.as_u16())),
            VisionOcrError::StreamInterrupted(_) => (ErrorKind::Transport, None),
            VisionOcrError::EmptyExtraction => (ErrorKind::EmptyExtraction, None),
            VisionOcrError::Config(_)
            | VisionOcrError::Prompt(_)
            | VisionOcrError::JsonParse(_)
            | VisionOcrError::Io(_) => (ErrorKind::Internal, None),
        };

        ErrorInfo {
            kind,
            message: err.to_string(),
            status,
        }
    }
}

impl From<VisionOcrError> for ErrorInfo {
    fn from(err: VisionOcrError) -> Self {
        ErrorInfo::from(&err)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
