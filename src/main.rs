use clap::Parser;
use vision_ocr::{cli, config, display, logging, orchestrator, session};
use cli::{Cli, Commands};
use config::Config;
use orchestrator::{Orchestrator, RequestState, Session};
use vision_ocr::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Extract { image, output, json, stream } => {
            let config = effective_config(Config::load()?, cli.url.as_deref(), cli.model.as_deref())?;
            eprintln!("🔍 vision-ocr - テキスト抽出 ({})\n", config.model);

            let orchestrator = Orchestrator::from_config(&config)?;
            let mut session = Session::new();
            let mut observer = display::ConsoleObserver::new(stream && !json);

            let state = orchestrator.submit_file(&mut session, &image, &mut observer).await;
            let result = match state {
                RequestState::Succeeded(result) => result,
                RequestState::Failed(error) => {
                    eprintln!("{}", display::render_error(error));
                    std::process::exit(1);
                }
                RequestState::Idle | RequestState::Loading => {
                    unreachable!("submit_file は終了状態を返す")
                }
            };

            let rendered = if json {
                serde_json::to_string_pretty(result)?
            } else {
                result.text.clone()
            };

            if let Some(path) = output {
                std::fs::write(&path, &rendered)?;
                eprintln!("✔ 結果を保存: {}", path.display());
            } else if json || !stream {
                println!("{}", rendered);
            }

            eprintln!("\n✅ {}", display::result_header(result));
        }

        Commands::Session => {
            let config = effective_config(Config::load()?, cli.url.as_deref(), cli.model.as_deref())?;
            println!("💬 vision-ocr - 対話モード\n");

            let orchestrator = Orchestrator::from_config(&config)?;
            session::run_interactive_session(&orchestrator).await?;
        }

        Commands::Config { show, set_url, set_model, reset } => {
            let mut config = Config::load_for_edit(reset)?;

            if reset {
                config.save()?;
                println!("✔ 設定を初期化しました");
            }

            if let Some(url) = set_url {
                config.set_base_url(&url)?;
                config.save()?;
                println!("✔ URLを設定しました");
            }

            if let Some(model) = set_model {
                config.set_model(&model)?;
                config.save()?;
                println!("✔ モデルを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  URL: {}", config.base_url);
                println!("  エンドポイント: {}", config.endpoint());
                println!("  モデル: {}", config.model);
                println!("  temperature: {}", config.temperature);
                println!("  max_tokens: {}", config.max_tokens);
                println!("  接続タイムアウト: {}秒", config.connect_timeout_seconds);
            }
        }
    }

    Ok(())
}

/// 設定ファイル < 環境変数 < コマンドライン
fn effective_config(mut config: Config, url: Option<&str>, model: Option<&str>) -> Result<Config> {
    config.apply_env();
    if let Some(url) = url {
        config.set_base_url(url)?;
    }
    if let Some(model) = model {
        config.set_model(model)?;
    }
    Ok(config)
}
