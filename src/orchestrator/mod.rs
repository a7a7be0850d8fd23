//! 抽出リクエストの状態機械
//!
//! Idle → Loading → {Succeeded | Failed}
//!
//! 1回の送信で ImageCodec → InferenceClient → accumulate を順に実行し、
//! 成功時のみ履歴の先頭に結果を追加する。リトライは行わない。
//!
//! 状態と履歴は呼び出し側が所有する [`Session`] に置く。
//! `submit` は `&mut Session` を取るため、同じセッションへの
//! 同時送信は型レベルで起こらない。

mod types;

pub use types::{ExtractionResult, HistoryLedger, RequestState};

use crate::accumulator::accumulate_with;
use crate::client::{ChatClient, ChatOptions, ChatRequest, InferenceClient};
use crate::codec::{self, ImagePayload, ImageRef};
use crate::config::Config;
use crate::error::{ErrorInfo, Result, VisionOcrError};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::{debug, info, warn};

/// 状態遷移と受信断片の通知先（表示層）
pub trait Observer {
    fn on_state(&mut self, _state: &RequestState) {}

    fn on_fragment(&mut self, _fragment: &str) {}
}

impl Observer for () {}

/// 呼び出し側が所有する状態と履歴
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: RequestState,
    history: HistoryLedger,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// 直近の成功結果
    pub fn current_result(&self) -> Option<&ExtractionResult> {
        self.state.result()
    }

    pub fn current_error(&self) -> Option<&ErrorInfo> {
        self.state.error()
    }

    /// 終了状態を閉じて Idle に戻す（履歴はそのまま）
    pub fn dismiss(&mut self) {
        if self.state.is_terminal() {
            self.state = RequestState::Idle;
        }
    }

    fn transition(&mut self, next: RequestState, observer: &mut impl Observer) {
        debug!(from = self.state.label(), to = next.label(), "状態遷移");
        self.state = next;
        observer.on_state(&self.state);
    }

    fn begin(&mut self, observer: &mut impl Observer) {
        // 前回のエラー・結果はここで消える
        self.transition(RequestState::Loading, observer);
    }

    fn fail(&mut self, err: VisionOcrError, observer: &mut impl Observer) {
        warn!(error = %err, "抽出失敗");
        self.transition(RequestState::Failed(ErrorInfo::from(&err)), observer);
    }

    fn succeed(&mut self, result: ExtractionResult, observer: &mut impl Observer) {
        info!(id = result.id, file = %result.file_name, chars = result.text.chars().count(), "抽出完了");
        self.history.prepend(result.clone());
        self.transition(RequestState::Succeeded(result), observer);
    }
}

/// 抽出リクエストの実行役
pub struct Orchestrator<C = ChatClient> {
    client: C,
    model: String,
    options: ChatOptions,
}

impl Orchestrator<ChatClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ChatClient::from_config(config)?;
        Ok(Self::new(client, config.model.clone(), config.chat_options()))
    }
}

impl<C: InferenceClient> Orchestrator<C> {
    pub fn new(client: C, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client,
            model: model.into(),
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 読み込み済み画像を1枚送信
    pub async fn submit<'s>(
        &self,
        session: &'s mut Session,
        payload: ImagePayload,
        file_name: &str,
        image_ref: ImageRef,
    ) -> &'s RequestState {
        self.submit_with(session, payload, file_name, image_ref, &mut ()).await
    }

    /// 状態遷移・断片を `observer` に通知しながら送信
    pub async fn submit_with<'s>(
        &self,
        session: &'s mut Session,
        payload: ImagePayload,
        file_name: &str,
        image_ref: ImageRef,
        observer: &mut impl Observer,
    ) -> &'s RequestState {
        let submitted_at = Local::now();
        session.begin(observer);
        self.complete(session, payload, file_name, image_ref, submitted_at, observer)
            .await;
        &session.state
    }

    /// 画像ファイルを読み込んで送信
    ///
    /// 読み込み失敗・非対応形式は Failed になる
    pub async fn submit_file<'s>(
        &self,
        session: &'s mut Session,
        path: &Path,
        observer: &mut impl Observer,
    ) -> &'s RequestState {
        let submitted_at = Local::now();
        session.begin(observer);

        let payload = match ImagePayload::load(path).await {
            Ok(payload) => payload,
            Err(e) => {
                session.fail(e.into(), observer);
                return &session.state;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let image_ref = ImageRef::from_path(path).await;

        self.complete(session, payload, &file_name, image_ref, submitted_at, observer)
            .await;
        &session.state
    }

    async fn complete(
        &self,
        session: &mut Session,
        payload: ImagePayload,
        file_name: &str,
        image_ref: ImageRef,
        submitted_at: DateTime<Local>,
        observer: &mut impl Observer,
    ) {
        let outcome = self.extract(&payload, observer).await;
        drop(payload);

        match outcome {
            Ok(text) => {
                let result = ExtractionResult {
                    id: session.history.next_id(submitted_at.timestamp_millis()),
                    text,
                    created_at: Local::now(),
                    image_ref,
                    file_name: file_name.to_string(),
                };
                session.succeed(result, observer);
            }
            Err(e) => session.fail(e, observer),
        }
    }

    /// encode → send → accumulate
    async fn extract(&self, payload: &ImagePayload, observer: &mut impl Observer) -> Result<String> {
        let image = codec::encode(payload)?;
        debug!(mime = %payload.mime(), encoded_len = image.len(), "画像エンコード完了");

        let request = ChatRequest::extraction(&self.model, image, self.options);
        let records = self.client.send(&request).await?;
        drop(request);

        accumulate_with(records, |fragment| observer.on_fragment(fragment)).await
    }
}
