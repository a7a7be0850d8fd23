//! レコードストリームを最後まで読み、テキストを確定する

use crate::error::Result;
use futures::{Stream, StreamExt};
use tracing::debug;
use vision_ocr_common::{Accumulator, StreamRecord};

/// ストリームを読み切って断片を連結
pub async fn accumulate<S>(records: S) -> Result<String>
where
    S: Stream<Item = Result<StreamRecord>> + Unpin,
{
    accumulate_with(records, |_| {}).await
}

/// 断片ごとに `on_fragment` を呼びながら連結
///
/// 受信エラーが来た時点でストリームを破棄してエラーを返す
pub async fn accumulate_with<S, F>(mut records: S, mut on_fragment: F) -> Result<String>
where
    S: Stream<Item = Result<StreamRecord>> + Unpin,
    F: FnMut(&str),
{
    let mut acc = Accumulator::new();

    while let Some(record) = records.next().await {
        let record = record?;
        if let Some(fragment) = acc.push(&record) {
            on_fragment(fragment);
        }
    }

    debug!(
        records = acc.record_count(),
        fragments = acc.fragment_count(),
        chars = acc.text().chars().count(),
        done_seen = acc.done_seen(),
        "ストリーム終了"
    );

    Ok(acc.finish()?)
}
