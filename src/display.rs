//! 端末表示
//!
//! 状態遷移はスピナー、抽出テキストは stdout に出す。

use crate::error::ErrorInfo;
use crate::orchestrator::{ExtractionResult, HistoryLedger, Observer, RequestState};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use vision_ocr_common::UNCERTAIN_MARKER;

/// スピナーと逐次表示を担当するオブザーバ
pub struct ConsoleObserver {
    spinner: Option<ProgressBar>,
    stream: bool,
    streamed_any: bool,
}

impl ConsoleObserver {
    /// `stream` が true なら受信した断片をそのまま stdout に書く（スピナーなし）
    pub fn new(stream: bool) -> Self {
        Self {
            spinner: None,
            stream,
            streamed_any: false,
        }
    }

    fn start_spinner(&mut self) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message("画像を処理中...");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Observer for ConsoleObserver {
    fn on_state(&mut self, state: &RequestState) {
        match state {
            RequestState::Loading => {
                self.streamed_any = false;
                if !self.stream {
                    self.start_spinner();
                }
            }
            RequestState::Succeeded(_) | RequestState::Failed(_) => {
                self.stop_spinner();
                if self.streamed_any {
                    println!();
                }
            }
            RequestState::Idle => self.stop_spinner(),
        }
    }

    fn on_fragment(&mut self, fragment: &str) {
        if self.stream {
            self.streamed_any = true;
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(fragment.as_bytes());
            let _ = out.flush();
        }
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

/// 判読不能箇所の数
pub fn count_uncertain(text: &str) -> usize {
    text.matches(UNCERTAIN_MARKER).count()
}

/// 抽出結果の見出し行
pub fn result_header(result: &ExtractionResult) -> String {
    let uncertain = count_uncertain(&result.text);
    let mut header = format!(
        "#{} {} ({})",
        result.id,
        result.file_name,
        result.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if uncertain > 0 {
        header.push_str(&format!(" 判読不能: {}箇所", uncertain));
    }
    header
}

/// 抽出結果の全文表示
pub fn render_result(result: &ExtractionResult) -> String {
    format!("{}\n---\n{}", result_header(result), result.text)
}

/// 一覧の1行表示（本文は先頭のみ）
pub fn render_summary(index: usize, result: &ExtractionResult) -> String {
    const PREVIEW_CHARS: usize = 40;
    let first_line = result.text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    format!("[{}] {}  {}", index, result_header(result), preview.trim())
}

/// 最新結果と「以前のスキャン」の一覧
pub fn render_history(history: &HistoryLedger) -> String {
    let Some(latest) = history.latest() else {
        return "履歴はありません".to_string();
    };

    let mut lines = vec!["最新:".to_string(), format!("  {}", render_summary(1, latest))];
    let previous = history.previous();
    if !previous.is_empty() {
        lines.push(format!("以前のスキャン ({}件):", previous.len()));
        for (i, result) in previous.iter().enumerate() {
            lines.push(format!("  {}", render_summary(i + 2, result)));
        }
    }
    lines.join("\n")
}

pub fn render_error(error: &ErrorInfo) -> String {
    format!("✖ {}", error)
}
