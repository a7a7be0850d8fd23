//! プロンプト定義モジュール
//!
//! 抽出リクエストの指示文は固定。リクエスト形状を毎回同一にするため、
//! 呼び出し側から差し替える手段は用意しない。

/// テキスト抽出・翻訳用の指示文
///
/// 1. 内容種別（文書・請求書・手書きメモ・スクリーンショット等）を判定
/// 2. 構造を保ったままテキストを抽出し、英語以外は英語に翻訳
/// 3. 見出し・表・箇条書き・コードブロックを使ったMarkdownで出力
/// 4. 判読が不確かな手書き文字は `[?]` で示す
pub const EXTRACTION_PROMPT: &str = r#"Analyze this image and follow these instructions:

1. First, identify the type of content (e.g., document, invoice, handwritten note, screenshot, etc.).

2. Extract all text from the image with these requirements:
   - Maintain the original structure and formatting
   - Translate any non-English text to English
   - Preserve numbers, dates, and amounts exactly as shown
   - For handwritten text, focus on accuracy and context

3. Format the output in markdown:
   - Use appropriate headers (##) for sections
   - Use tables for structured data (especially in invoices)
   - Use bullet points for lists
   - Use code blocks for technical content
   - Preserve paragraph spacing

4. For specific content types:
   - Invoices: Clearly identify total amounts, dates, and parties involved
   - Documents: Maintain heading hierarchy and paragraph structure
   - Handwritten: Note any uncertain words with [?]
   - Technical: Preserve code formatting and indentation

Output the result in clean, well-formatted markdown. Focus on accuracy and readability."#;

/// 判読不能な単語に付けるマーカー
pub const UNCERTAIN_MARKER: &str = "[?]";
