//! レスポンス組み立てモジュール
//!
//! レコードを到着順に受け取り、`message.content` の断片を連結する。
//! 断片はトリムも並べ替えもせずそのまま追記する。

use crate::error::{Error, Result};
use crate::types::StreamRecord;

/// 断片の連結状態
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
    records: usize,
    fragments: usize,
    done_seen: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを1件取り込む
    ///
    /// 断片があれば追記して、その断片を返す
    pub fn push<'a>(&mut self, record: &'a StreamRecord) -> Option<&'a str> {
        self.records += 1;
        if record.is_done() {
            self.done_seen = true;
        }

        let fragment = record.content()?;
        self.text.push_str(fragment);
        self.fragments += 1;
        Some(fragment)
    }

    /// 現時点までの連結テキスト
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// `done: true` を受け取ったか
    ///
    /// 受け取らずにボディが終わっても正常終了として扱う
    pub fn done_seen(&self) -> bool {
        self.done_seen
    }

    /// 連結結果を確定
    ///
    /// 空白のみの場合は [`Error::EmptyExtraction`]
    pub fn finish(self) -> Result<String> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyExtraction);
        }
        Ok(self.text)
    }
}

/// レコード列をまとめて連結
///
/// # Examples
/// ```
/// use vision_ocr_common::{accumulate_records, StreamRecord};
///
/// let records = vec![StreamRecord::fragment("Hel"), StreamRecord::fragment("lo")];
/// assert_eq!(accumulate_records(records).unwrap(), "Hello");
/// ```
pub fn accumulate_records<I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = StreamRecord>,
{
    let mut acc = Accumulator::new();
    for record in records {
        acc.push(&record);
    }
    acc.finish()
}
