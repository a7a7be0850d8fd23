//! 推論サーバー（`/api/chat`）のリクエスト型

use crate::codec::EncodedImage;
use serde::Serialize;
use vision_ocr_common::EXTRACTION_PROMPT;

/// チャットリクエスト
///
/// 送信ごとに新しく作り、作成後は変更しない
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    role: &'static str,
    content: &'static str,
    images: Vec<EncodedImage>,
}

/// 生成オプション
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2048,
        }
    }
}

impl ChatRequest {
    /// 固定の抽出プロンプトと画像1枚からストリーミングリクエストを作る
    pub fn extraction(model: impl Into<String>, image: EncodedImage, options: ChatOptions) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user",
                content: EXTRACTION_PROMPT,
                images: vec![image],
            }],
            stream: true,
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content)
            .unwrap_or_default()
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.messages.first().and_then(|m| m.images.first())
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn options(&self) -> ChatOptions {
        self.options
    }
}
