//! vision-ocr
//!
//! 画像を推論サーバー（Ollama `/api/chat`）に送り、NDJSONで返る
//! 応答ストリームから抽出テキストを組み立てる。

pub mod accumulator;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod session;

pub use client::{ChatClient, InferenceClient};
pub use codec::{ImagePayload, ImageRef};
pub use config::Config;
pub use error::{ErrorInfo, ErrorKind, Result, VisionOcrError};
pub use orchestrator::{ExtractionResult, HistoryLedger, Orchestrator, RequestState, Session};
