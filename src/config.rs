use crate::client::{ChatOptions, CHAT_PATH};
use crate::error::{Result, VisionOcrError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// 推論サーバーのベースURL（環境変数）
pub const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";
/// モデル名（環境変数）
pub const ENV_MODEL: &str = "VISION_OCR_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// 接続確立までのタイムアウト（受信中のストリームには適用しない）
    pub connect_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        let options = ChatOptions::default();
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            connect_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// ファイルがなければデフォルト設定
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// `config` コマンド用
    ///
    /// 初期化する場合は既存ファイルを読まない（壊れていても上書きできる）
    pub fn load_for_edit(reset: bool) -> Result<Self> {
        Self::load_from_for_edit(&Self::config_path()?, reset)
    }

    fn load_from_for_edit(path: &Path, reset: bool) -> Result<Self> {
        if reset {
            Ok(Self::default())
        } else {
            Self::load_from(path)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| VisionOcrError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vision-ocr").join("config.json"))
    }

    /// 環境変数で上書き
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
    }

    /// `/api/chat` までのURL
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_PATH)
    }

    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VisionOcrError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.base_url = url.to_string();
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<()> {
        let model = model.trim();
        if model.is_empty() {
            return Err(VisionOcrError::Config("モデル名が空です".into()));
        }
        self.model = model.to_string();
        Ok(())
    }
}
