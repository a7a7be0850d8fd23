//! ログ初期化
//!
//! 出力は stderr。stdout は抽出テキスト専用にしておく。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` があればそれを優先し、なければ `-v` の有無で info / debug
pub fn init(verbose: bool) {
    let level = default_level(verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // テストなどで二重に初期化された場合は無視
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "vision_ocr=debug,vision_ocr_common=debug,warn"
    } else {
        "vision_ocr=info,warn"
    }
}
