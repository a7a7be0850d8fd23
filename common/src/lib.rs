//! Vision OCR Common Library
//!
//! CLIとライブラリ本体で共有される型とユーティリティ。
//! ネットワーク・ファイルI/Oは持たない。

pub mod types;
pub mod prompts;
pub mod parser;
pub mod accumulator;
pub mod error;

pub use types::{ImageMime, StreamMessage, StreamRecord, SUPPORTED_IMAGE_TYPES};
pub use prompts::{EXTRACTION_PROMPT, UNCERTAIN_MARKER};
pub use parser::{parse_ndjson, parse_stream_line, LineBuffer};
pub use accumulator::{accumulate_records, Accumulator};
pub use error::{Error, Result};
