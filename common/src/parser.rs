//! NDJSONストリームパーサー
//!
//! 推論サーバーのレスポンスボディ（1行1JSON）をレコードに分解する。
//!
//! 壊れた行・途中で切れた行はエラーにせず捨てる（drop, don't fail）。
//! ネットワークのチャンク境界で1レコードが分割されても、
//! [`LineBuffer`] がバイト単位で次のチャンクと結合してから解析する。

use crate::types::StreamRecord;
use tracing::{debug, trace};

/// 1行をレコードとして解析
///
/// 空行・JSONとして不正な行・形の合わない行は `None`。
///
/// # Examples
/// ```
/// use vision_ocr_common::parse_stream_line;
///
/// let record = parse_stream_line(r#"{"message":{"content":"A"}}"#).unwrap();
/// assert_eq!(record.content(), Some("A"));
/// assert!(parse_stream_line("{broken").is_none());
/// ```
pub fn parse_stream_line(line: &str) -> Option<StreamRecord> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamRecord>(line) {
        Ok(record) => Some(record),
        Err(e) => {
            trace!(error = %e, len = line.len(), "不正なNDJSON行を破棄");
            None
        }
    }
}

/// ボディ全体（複数行）をまとめて解析
pub fn parse_ndjson(body: &str) -> Vec<StreamRecord> {
    body.lines().filter_map(parse_stream_line).collect()
}

/// 1行の上限バイト数。超えた行は改行まで読み捨てる
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// チャンク境界をまたぐ行を組み立てるバッファ
///
/// UTF-8の多バイト文字がチャンク間で分割されても壊れないよう、
/// 改行が来るまでバイトのまま保持する。
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// `pending` の先頭から改行なしと確認済みのバイト数
    scanned: usize,
    /// 上限を超えた行の残りを読み捨て中
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンクを追加し、完結した行から得られたレコードを到着順に返す
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamRecord> {
        let mut records = Vec::new();
        let mut chunk = chunk;

        if self.discarding {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.discarding = false;
                    chunk = &chunk[pos + 1..];
                }
                None => return records,
            }
        }

        self.pending.extend_from_slice(chunk);

        // 走査済みの部分は見直さない
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            let text = String::from_utf8_lossy(&self.pending[start..end]);
            if let Some(record) = parse_stream_line(&text) {
                records.push(record);
            }
            start = end + 1;
            from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();

        if self.pending.len() > MAX_LINE_BYTES {
            debug!(len = self.pending.len(), "上限を超えた行を破棄");
            self.pending.clear();
            self.scanned = 0;
            self.discarding = true;
        }

        records
    }

    /// ボディ終端で残った改行なしの行を解析
    pub fn finish(self) -> Option<StreamRecord> {
        if self.pending.is_empty() {
            return None;
        }
        parse_stream_line(&String::from_utf8_lossy(&self.pending))
    }

    /// 未完結のまま保持しているバイト数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // parse_stream_line テスト
    // =============================================

    #[test]
    fn test_parse_line_valid() {
        let record = parse_stream_line(r#"{"message":{"content":"Hel"}}"#).unwrap();
        assert_eq!(record.content(), Some("Hel"));
    }

    #[test]
    fn test_parse_line_blank() {
        assert!(parse_stream_line("").is_none());
        assert!(parse_stream_line("   ").is_none());
        assert!(parse_stream_line("\r").is_none());
    }

    #[test]
    fn test_parse_line_crlf() {
        let record = parse_stream_line("{\"done\":true}\r").unwrap();
        assert!(record.is_done());
    }

    #[test]
    fn test_parse_line_malformed() {
        assert!(parse_stream_line("{broken").is_none());
        assert!(parse_stream_line("not json").is_none());
        assert!(parse_stream_line(r#"{"message":{"content":"cut"#).is_none());
    }

    #[test]
    fn test_parse_line_wrong_shape() {
        // JSONとしては正しいが形が合わない
        assert!(parse_stream_line("42").is_none());
        assert!(parse_stream_line(r#"{"message":"text"}"#).is_none());
        assert!(parse_stream_line(r#"{"message":{"content":5}}"#).is_none());
    }

    #[test]
    fn test_parse_ndjson_skips_broken_lines() {
        let body = "{\"message\":{\"content\":\"A\"}}\n{broken\n{\"message\":{\"content\":\"B\"}}\n";
        let records = parse_ndjson(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content(), Some("A"));
        assert_eq!(records[1].content(), Some("B"));
    }

    // =============================================
    // LineBuffer テスト
    // =============================================

    #[test]
    fn test_line_buffer_whole_lines() {
        let mut buffer = LineBuffer::new();
        let records = buffer.push(b"{\"message\":{\"content\":\"A\"}}\n{\"done\":true}\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content(), Some("A"));
        assert!(records[1].is_done());
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_line_buffer_record_split_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"message\":{\"con").is_empty());
        assert!(buffer.pending_len() > 0);

        let records = buffer.push(b"tent\":\"A\"}}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content(), Some("A"));
    }

    #[test]
    fn test_line_buffer_multibyte_split() {
        let line = "{\"message\":{\"content\":\"日本\"}}\n".as_bytes();
        // 「日」の途中で分割
        let split = line.iter().position(|&b| b >= 0x80).unwrap() + 1;

        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&line[..split]).is_empty());
        let records = buffer.push(&line[split..]);
        assert_eq!(records[0].content(), Some("日本"));
    }

    #[test]
    fn test_line_buffer_drops_malformed_between_valid() {
        let mut buffer = LineBuffer::new();
        let mut records = buffer.push(b"{\"message\":{\"content\":\"A\"}}\n{broken\n");
        records.extend(buffer.push(b"{\"message\":{\"content\":\"B\"}}\n"));
        let text: String = records.iter().filter_map(|r| r.content()).collect();
        assert_eq!(text, "AB");
    }

    #[test]
    fn test_line_buffer_long_line_in_small_chunks() {
        let content = "x".repeat(10_000);
        let line = format!("{{\"message\":{{\"content\":\"{}\"}}}}\n", content);

        let mut buffer = LineBuffer::new();
        let mut records = Vec::new();
        for chunk in line.as_bytes().chunks(7) {
            records.extend(buffer.push(chunk));
        }
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content(), Some(content.as_str()));
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_line_buffer_oversized_line_is_dropped() {
        let mut buffer = LineBuffer::new();
        let filler = vec![b'x'; 64 * 1024];
        for _ in 0..(MAX_LINE_BYTES / filler.len() + 1) {
            assert!(buffer.push(&filler).is_empty());
            assert!(buffer.pending_len() <= MAX_LINE_BYTES);
        }
        assert_eq!(buffer.pending_len(), 0);

        // 残りは改行まで読み捨て、次の行から再開
        assert!(buffer.push(b"more garbage").is_empty());
        let records = buffer.push(b"tail\n{\"message\":{\"content\":\"A\"}}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content(), Some("A"));
    }

    #[test]
    fn test_line_buffer_finish_trailing_line() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"message\":{\"content\":\"tail\"}}").is_empty());
        let record = buffer.finish().unwrap();
        assert_eq!(record.content(), Some("tail"));
    }

    #[test]
    fn test_line_buffer_finish_incomplete_is_dropped() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"{\"message\":{\"content\":\"A\"}}\n{\"message\":");
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_line_buffer_finish_empty() {
        assert!(LineBuffer::new().finish().is_none());
    }
}
