//! 対話モード
//!
//! 画像パスを入力するたびに抽出を実行し、結果を履歴に積む。
//! 1件ずつ順番に処理するため、処理中に次の入力は受け付けない。

use crate::client::InferenceClient;
use crate::display::{self, ConsoleObserver};
use crate::error::{Result, VisionOcrError};
use crate::orchestrator::{Orchestrator, RequestState, Session};
use dialoguer::Input;
use std::path::PathBuf;

/// 対話コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// 画像を抽出
    Submit(PathBuf),
    /// 履歴一覧
    History,
    /// 履歴のN番目（1始まり）を全文表示
    Show(usize),
    /// 直前の結果・エラー表示を閉じる
    Dismiss,
    Help,
    /// 終了
    Quit,
}

/// 入力行をコマンドに変換
pub fn parse_command(input: &str) -> SessionCommand {
    let trimmed = input.trim();

    match trimmed {
        "" | "q" | "quit" | "exit" => return SessionCommand::Quit,
        "h" | "history" => return SessionCommand::History,
        "d" | "dismiss" => return SessionCommand::Dismiss,
        "?" | "help" => return SessionCommand::Help,
        _ => {}
    }

    if let Some(rest) = trimmed.strip_prefix("show ") {
        if let Ok(n) = rest.trim().parse::<usize>() {
            return SessionCommand::Show(n);
        }
    }

    // ドラッグ&ドロップで付く引用符を外す
    let path = trimmed.trim_matches(|c| c == '"' || c == '\'');
    SessionCommand::Submit(PathBuf::from(path))
}

const HELP: &str = "操作: [画像パス]抽出 [h]履歴 [show N]全文表示 [d]表示を閉じる [q/Enter]終了";

/// 対話モードを実行
pub async fn run_interactive_session<C: InferenceClient>(orchestrator: &Orchestrator<C>) -> Result<()> {
    let mut session = Session::new();
    let mut observer = ConsoleObserver::new(false);

    println!("モデル: {}", orchestrator.model());
    println!("---");
    println!("{}", HELP);
    println!("---\n");

    loop {
        let input = prompt_line()?;

        match parse_command(&input) {
            SessionCommand::Quit => {
                println!("終了します ({}件抽出)", session.history().len());
                break;
            }
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::History => println!("{}\n", display::render_history(session.history())),
            SessionCommand::Dismiss => {
                session.dismiss();
                println!("  → 表示を閉じました\n");
            }
            SessionCommand::Show(n) => {
                match n.checked_sub(1).and_then(|i| session.history().entries().get(i)) {
                    Some(result) => println!("{}\n", display::render_result(result)),
                    None => println!("  → {}番目の履歴はありません\n", n),
                }
            }
            SessionCommand::Submit(path) => {
                let state = orchestrator.submit_file(&mut session, &path, &mut observer).await;
                match state {
                    RequestState::Succeeded(result) => println!("✔ {}\n", display::render_result(result)),
                    RequestState::Failed(error) => println!("{}\n", display::render_error(error)),
                    RequestState::Idle | RequestState::Loading => {}
                }
            }
        }
    }

    Ok(())
}

fn prompt_line() -> Result<String> {
    Input::<String>::new()
        .with_prompt("画像")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| VisionOcrError::Prompt(e.to_string()))
}
