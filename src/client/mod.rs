//! 推論サーバー連携モジュール
//!
//! `/api/chat` にストリーミングPOSTを送り、NDJSONボディを
//! [`StreamRecord`] の遅延シーケンスとして返す。
//!
//! - 非2xxはレコードを1件も返さずに `Transport` エラー
//! - 壊れた行は捨てて続行（エラーにしない）
//! - ボディ終端でシーケンス終了（`done: true` は必須ではない）
//!
//! 返したストリームがHTTP接続を所有する。途中で破棄しても接続は解放される。

mod types;

pub use types::{ChatMessage, ChatOptions, ChatRequest};

use crate::config::Config;
use crate::error::{Result, VisionOcrError};
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};
use vision_ocr_common::{LineBuffer, StreamRecord};

/// チャットAPIのパス（固定）
pub const CHAT_PATH: &str = "/api/chat";

/// レコードの遅延シーケンス（有限・再開不可）
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<StreamRecord>> + Send>>;

/// ストリーミング推論クライアント
pub trait InferenceClient: Send + Sync {
    /// リクエストを送り、ハンドシェイク成功後のレコード列を返す
    fn send(&self, request: &ChatRequest) -> impl Future<Output = Result<RecordStream>> + Send;
}

/// HTTP越しの推論クライアント
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// エンドポイントURL（`/api/chat` まで含む）を指定して作る
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InferenceClient for ChatClient {
    fn send(&self, request: &ChatRequest) -> impl Future<Output = Result<RecordStream>> + Send {
        debug!(endpoint = %self.endpoint, model = request.model(), "推論リクエスト送信");
        let http_request = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request);

        async move {
            let response = http_request.send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "推論サーバーがエラーを返しました");
                return Err(VisionOcrError::Transport {
                    status: status.as_u16(),
                    body,
                });
            }

            debug!(status = status.as_u16(), "ストリーム受信開始");
            Ok(decode_ndjson(response.bytes_stream()))
        }
    }
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    lines: LineBuffer,
    ready: VecDeque<StreamRecord>,
    finished: bool,
}

/// バイトチャンクのストリームをレコードのストリームに変換
///
/// チャンク境界で分割された行は次のチャンクと結合してから解析する。
/// 受信エラーは `StreamInterrupted` を1件返して終了する。
pub fn decode_ndjson<S, B, E>(body: S) -> RecordStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        lines: LineBuffer::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let records = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.ready.pop_front() {
                return Some((Ok(record), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let records = state.lines.push(chunk.as_ref());
                    state.ready.extend(records);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "ストリーム受信エラー");
                    state.finished = true;
                    return Some((Err(VisionOcrError::StreamInterrupted(e.to_string())), state));
                }
                None => {
                    state.finished = true;
                    if let Some(record) = std::mem::take(&mut state.lines).finish() {
                        state.ready.push_back(record);
                    }
                }
            }
        }
    });

    Box::pin(records)
}
