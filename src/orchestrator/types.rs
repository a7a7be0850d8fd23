//! 抽出結果・履歴・リクエスト状態の型定義

use crate::codec::ImageRef;
use crate::error::ErrorInfo;
use chrono::{DateTime, Local};
use serde::Serialize;

/// 抽出結果
///
/// 空でないテキストを最後まで受信できた場合にだけ作られる
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// 送信時刻（ミリ秒）由来のID
    pub id: i64,
    /// 抽出テキスト（Markdown、モデル出力そのまま）
    pub text: String,
    pub created_at: DateTime<Local>,
    /// 表示用の画像参照
    pub image_ref: ImageRef,
    pub file_name: String,
}

/// 抽出結果の履歴（新しい順、追記のみ）
///
/// セッション中だけ保持し、永続化しない
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    entries: Vec<ExtractionResult>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 先頭に追加（書き込みはオーケストレーターのみ）
    pub(crate) fn prepend(&mut self, result: ExtractionResult) {
        self.entries.insert(0, result);
    }

    /// 新しい順の全件
    pub fn entries(&self) -> &[ExtractionResult] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&ExtractionResult> {
        self.entries.first()
    }

    /// 最新を除いた過去分
    pub fn previous(&self) -> &[ExtractionResult] {
        self.entries.get(1..).unwrap_or_default()
    }

    pub fn get(&self, id: i64) -> Option<&ExtractionResult> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 時刻由来のIDを、既存IDより大きくなるよう補正して返す
    pub(crate) fn next_id(&self, timestamp_millis: i64) -> i64 {
        match self.latest() {
            Some(latest) if latest.id >= timestamp_millis => latest.id + 1,
            _ => timestamp_millis,
        }
    }
}

/// リクエスト状態
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded(ExtractionResult),
    Failed(ErrorInfo),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Succeeded(_) | RequestState::Failed(_))
    }

    /// 現在の結果
    pub fn result(&self) -> Option<&ExtractionResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// 現在のエラー（常に最大1件）
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failed(info) => Some(info),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Loading => "loading",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }
}
