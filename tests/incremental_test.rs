use chrono::{TimeDelta, Utc};
use kodegen_tools_dbfeed::config::AdaptorConfig;
use kodegen_tools_dbfeed::database::Value;
use kodegen_tools_dbfeed::{AdaptorError, ConfigError, Watermark};

mod common;
use common::{
    CONTENT_SQL, FakeSource, LIST_SQL, RecordingDocIdPusher, UPDATE_SQL, adaptor, base_config,
    id_rows,
};

fn incremental_config(batch: i64) -> AdaptorConfig {
    AdaptorConfig::builder()
        .max_ids_per_feed_file(batch)
        .update_sql(UPDATE_SQL)
        .every_doc_id_sql(LIST_SQL)
        .single_doc_content_sql(CONTENT_SQL)
        .mode_of_operation("rowToText")
        .build()
        .unwrap()
}

#[tokio::test]
async fn unavailable_without_update_sql() {
    let adaptor = adaptor(base_config(10), FakeSource::new());
    assert!(adaptor.watermark().is_none());

    let mut watermark = Watermark::now();
    let before = watermark;
    let err = adaptor
        .get_modified_doc_ids(&mut watermark, &RecordingDocIdPusher::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AdaptorError::Config(ConfigError::Missing(_))));
    assert_eq!(watermark, before);
}

#[tokio::test]
async fn watermark_starts_at_construction_time() {
    let start = Utc::now();
    let adaptor = adaptor(incremental_config(10), FakeSource::new());
    let built = Utc::now();
    let watermark = adaptor.watermark().unwrap();
    assert!(watermark.get() >= start);
    assert!(watermark.get() <= built);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert_eq!(adaptor.watermark(), Some(watermark));
}

#[tokio::test]
async fn success_pushes_crawl_immediately_and_advances() {
    let source = FakeSource::new().with_rows(UPDATE_SQL, id_rows(3));
    let adaptor = adaptor(incremental_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    let start = Utc::now() - TimeDelta::hours(1);
    let mut watermark = Watermark::starting_at(start);
    adaptor
        .get_modified_doc_ids(&mut watermark, &pusher)
        .await
        .unwrap();

    assert_eq!(pusher.doc_ids(), vec!["0", "1", "2"]);
    assert!(pusher.records().iter().all(|r| r.crawl_immediately));
    assert!(watermark.get() > start);

    // The previous watermark is the only bind parameter
    let executed = source.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].0, UPDATE_SQL);
    assert_eq!(executed[0].1, vec![Value::Timestamp(start)]);
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn successive_passes_strictly_increase() {
    let source = FakeSource::new().with_rows(UPDATE_SQL, Vec::new());
    let adaptor = adaptor(incremental_config(5), source);
    let pusher = RecordingDocIdPusher::new();

    let mut watermark = adaptor.watermark().unwrap();
    let mut previous = watermark.get();
    for _ in 0..5 {
        adaptor
            .get_modified_doc_ids(&mut watermark, &pusher)
            .await
            .unwrap();
        assert!(watermark.get() > previous);
        previous = watermark.get();
    }
}

#[tokio::test]
async fn failure_leaves_watermark_unchanged() {
    let source = FakeSource::new().with_rows(UPDATE_SQL, id_rows(4));
    source.fail_after(UPDATE_SQL, 3);
    let adaptor = adaptor(incremental_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    let mut watermark = adaptor.watermark().unwrap();
    let before = watermark;
    let err = adaptor
        .get_modified_doc_ids(&mut watermark, &pusher)
        .await
        .unwrap_err();

    assert!(err.is_io());
    assert_eq!(watermark, before);
    assert_eq!(pusher.doc_ids(), vec!["0", "1"]);

    // A failed push at the final flush also keeps it
    source.clear_failures();
    pusher.fail_pushes(true);
    assert!(adaptor.get_modified_doc_ids(&mut watermark, &pusher).await.is_err());
    assert_eq!(watermark, before);

    pusher.fail_pushes(false);
    adaptor
        .get_modified_doc_ids(&mut watermark, &pusher)
        .await
        .unwrap();
    assert!(watermark.get() > before.get());
}
