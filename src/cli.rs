use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vision-ocr")]
#[command(about = "ローカル推論サーバーによる画像テキスト抽出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 推論サーバーのURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// 使用するモデル
    #[arg(long, global = true)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚からテキストを抽出
    Extract {
        /// 画像ファイル（JPG/PNG）
        #[arg(required = true)]
        image: PathBuf,

        /// 抽出結果の保存先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// 受信したテキストを逐次表示
        #[arg(long)]
        stream: bool,
    },

    /// 対話モードで複数の画像を続けて抽出
    Session,

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 推論サーバーのURLを設定
        #[arg(long)]
        set_url: Option<String>,

        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を初期値に戻す
        #[arg(long)]
        reset: bool,
    },
}
