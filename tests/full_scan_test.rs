use kodegen_tools_dbfeed::database::{Row, Value};
use kodegen_tools_dbfeed::identity::PrimaryKey;
use kodegen_tools_dbfeed::{AdaptorError, CancellationToken, DatabaseAdaptor, StrategyRegistry};

mod common;
use common::{FakeSource, LIST_SQL, RecordingDocIdPusher, adaptor, base_config, id_rows};

#[tokio::test]
async fn pushes_every_id_and_releases_connection() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(5));
    let adaptor = adaptor(base_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    adaptor.get_doc_ids(&pusher).await.unwrap();

    assert_eq!(pusher.doc_ids(), vec!["0", "1", "2", "3", "4"]);
    assert_eq!(source.connects(), 1);
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn composite_keys_are_escaped() {
    let rows = vec![Row::from_pairs([
        ("dept", Value::from("r&d/east")),
        ("seq", Value::Int(4)),
    ])];
    let source = FakeSource::new().with_rows(LIST_SQL, rows);
    let codec = PrimaryKey::parse("dept:string,seq:int", "").unwrap();
    let adaptor =
        DatabaseAdaptor::new(base_config(10), source, codec, &StrategyRegistry::new()).unwrap();
    let pusher = RecordingDocIdPusher::new();

    adaptor.get_doc_ids(&pusher).await.unwrap();

    assert_eq!(pusher.doc_ids(), vec![r"r&d\/east/4"]);
}

#[tokio::test]
async fn cursor_failure_keeps_flushed_batches() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(10));
    source.fail_after(LIST_SQL, 5);
    let adaptor = adaptor(base_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    let err = adaptor.get_doc_ids(&pusher).await.unwrap_err();

    assert!(matches!(err, AdaptorError::Database(_)));
    assert!(err.is_io());
    // Two full batches went out before the failure; the fifth id was buffered
    assert_eq!(pusher.doc_ids(), vec!["0", "1", "2", "3"]);
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn connect_failure_is_io() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(3));
    source.fail_connect(true);
    let adaptor = adaptor(base_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    let err = adaptor.get_doc_ids(&pusher).await.unwrap_err();

    assert!(err.is_io());
    assert!(pusher.batches().is_empty());
    assert_eq!(source.closes(), 0);
}

#[tokio::test]
async fn close_failure_is_not_escalated() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(3));
    source.fail_close(true);
    let adaptor = adaptor(base_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();

    adaptor.get_doc_ids(&pusher).await.unwrap();

    assert_eq!(pusher.doc_ids().len(), 3);
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn push_rejection_surfaces_as_push_error() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(3));
    let adaptor = adaptor(base_config(2), source.clone());
    let pusher = RecordingDocIdPusher::new();
    pusher.fail_pushes(true);

    let err = adaptor.get_doc_ids(&pusher).await.unwrap_err();

    assert!(matches!(err, AdaptorError::Push(_)));
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn cancellation_interrupts_the_scan() {
    let source = FakeSource::new().with_rows(LIST_SQL, id_rows(3));
    let token = CancellationToken::new();
    token.cancel();
    let adaptor = adaptor(base_config(2), source.clone()).with_cancellation(token);
    let pusher = RecordingDocIdPusher::new();

    let err = adaptor.get_doc_ids(&pusher).await.unwrap_err();

    assert!(matches!(err, AdaptorError::Interrupted));
    assert!(pusher.batches().is_empty());
    assert_eq!(source.closes(), 1);
}

#[tokio::test]
async fn null_key_aborts_the_scan() {
    let rows = vec![
        Row::from_pairs([("id", Value::Int(1))]),
        Row::from_pairs([("id", Value::Null)]),
    ];
    let source = FakeSource::new().with_rows(LIST_SQL, rows);
    let adaptor = adaptor(base_config(10), source.clone());
    let pusher = RecordingDocIdPusher::new();

    let err = adaptor.get_doc_ids(&pusher).await.unwrap_err();

    assert!(matches!(err, AdaptorError::Identity(_)));
    assert!(pusher.batches().is_empty());
    assert_eq!(source.closes(), 1);
}
