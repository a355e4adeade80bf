//! Batch sizing and ordering of full scans

use futures::executor::block_on;
use proptest::prelude::*;

mod common;
use common::{FakeSource, LIST_SQL, RecordingDocIdPusher, adaptor, base_config, id_rows};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn full_scan_batches_by_max_urls(rows in 0usize..120, batch in 1i64..25) {
        let source = FakeSource::new().with_rows(LIST_SQL, id_rows(rows));
        let adaptor = adaptor(base_config(batch), source);
        let pusher = RecordingDocIdPusher::new();

        block_on(adaptor.get_doc_ids(&pusher)).unwrap();

        let n = batch as usize;
        let calls = pusher.batches();
        // Every full batch is pushed as soon as it fills, plus one final push
        prop_assert_eq!(calls.len(), rows / n + 1);
        prop_assert_eq!(pusher.non_empty_batches().len(), rows.div_ceil(n));
        prop_assert!(calls.iter().all(|b| b.len() <= n));
        prop_assert!(calls[..calls.len() - 1].iter().all(|b| b.len() == n));

        let expected: Vec<String> = (0..rows).map(|i| i.to_string()).collect();
        prop_assert_eq!(pusher.doc_ids(), expected);
        prop_assert!(pusher.records().iter().all(|r| !r.crawl_immediately));
    }
}

#[tokio::test]
async fn exact_multiple_ends_with_empty_push() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(6));
    let adaptor = adaptor(base_config(3), source);
    let pusher = RecordingDocIdPusher::new();

    adaptor.get_doc_ids(&pusher).await.unwrap();

    let sizes: Vec<usize> = pusher.batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 0]);
}

#[tokio::test]
async fn empty_table_pushes_one_empty_batch() {
    let source = FakeSource::new().with_rows(LIST_SQL, Vec::new());
    let adaptor = adaptor(base_config(10), source);
    let pusher = RecordingDocIdPusher::new();

    adaptor.get_doc_ids(&pusher).await.unwrap();

    assert_eq!(pusher.batches().len(), 1);
    assert!(pusher.records().is_empty());
}
