//! Test utilities shared by the integration suites: a recording pusher and a
//! scripted in-memory relational source.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use kodegen_tools_dbfeed::config::AdaptorConfig;
use kodegen_tools_dbfeed::database::{Connection, DbError, DbResult, RelationalSource, Row, RowStream, Value};
use kodegen_tools_dbfeed::feed::{DocIdPusher, PushError, Record};
use kodegen_tools_dbfeed::identity::PrimaryKey;
use kodegen_tools_dbfeed::{DatabaseAdaptor, StrategyRegistry};

/// Keeps every batch it is handed, in order
#[derive(Default)]
pub struct RecordingDocIdPusher {
    batches: Mutex<Vec<Vec<Record>>>,
    fail: AtomicBool,
}

impl RecordingDocIdPusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_pushes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every push call, including empty ones
    pub fn batches(&self) -> Vec<Vec<Record>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn non_empty_batches(&self) -> Vec<Vec<Record>> {
        self.batches().into_iter().filter(|b| !b.is_empty()).collect()
    }

    pub fn records(&self) -> Vec<Record> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn doc_ids(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|r| r.doc_id.unique_id().to_string())
            .collect()
    }

    pub fn reset(&self) {
        self.batches.lock().unwrap().clear();
    }
}

impl DocIdPusher for RecordingDocIdPusher {
    async fn push_records(&self, records: &[Record]) -> Result<(), PushError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PushError::Rejected {
                count: records.len(),
                message: "recording pusher told to fail".into(),
            });
        }
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(())
    }
}

type Responder = Arc<dyn Fn(&[Value]) -> Vec<Row> + Send + Sync>;

#[derive(Default)]
struct Script {
    responders: HashMap<String, Responder>,
    /// query -> number of rows yielded before an error
    failures: HashMap<String, usize>,
    executed: Vec<(String, Vec<Value>)>,
}

#[derive(Default)]
struct Shared {
    script: Mutex<Script>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    fail_connect: AtomicBool,
    fail_close: AtomicBool,
}

/// Relational source answering queries from a script
#[derive(Clone, Default)]
pub struct FakeSource {
    shared: Arc<Shared>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `query` returns `rows` whatever its parameters
    pub fn with_rows(self, query: &str, rows: Vec<Row>) -> Self {
        self.respond(query, move |_| rows.clone())
    }

    /// `query` returns the rows whose `key` column equals the first parameter
    pub fn with_keyed_rows(self, query: &str, key: &str, rows: Vec<Row>) -> Self {
        let key = key.to_string();
        self.respond(query, move |params| {
            rows.iter()
                .filter(|row| params.first().is_some_and(|p| row.get(&key) == Some(p)))
                .cloned()
                .collect()
        })
    }

    pub fn respond(self, query: &str, responder: impl Fn(&[Value]) -> Vec<Row> + Send + Sync + 'static) -> Self {
        self.shared
            .script
            .lock()
            .unwrap()
            .responders
            .insert(query.to_string(), Arc::new(responder));
        self
    }

    /// `query` yields `rows_before_error` rows then fails
    pub fn fail_after(&self, query: &str, rows_before_error: usize) {
        self.shared
            .script
            .lock()
            .unwrap()
            .failures
            .insert(query.to_string(), rows_before_error);
    }

    pub fn clear_failures(&self) {
        self.shared.script.lock().unwrap().failures.clear();
    }

    pub fn fail_connect(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.shared.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Every query run so far with its parameters
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.shared.script.lock().unwrap().executed.clone()
    }

    fn run(&self, query: &str, params: &[Value]) -> Vec<DbResult<Row>> {
        let mut script = self.shared.script.lock().unwrap();
        script.executed.push((query.to_string(), params.to_vec()));

        let rows = match script.responders.get(query) {
            Some(responder) => responder(params),
            None => return vec![Err(DbError::Other(format!("no such table for query: {query}")))],
        };

        match script.failures.get(query) {
            Some(&limit) => rows
                .into_iter()
                .take(limit)
                .map(Ok)
                .chain(std::iter::once(Err(DbError::Other("injected failure".into()))))
                .collect(),
            None => rows.into_iter().map(Ok).collect(),
        }
    }
}

impl RelationalSource for FakeSource {
    type Connection = FakeConnection;

    async fn connect(&self) -> DbResult<FakeConnection> {
        if self.shared.fail_connect.load(Ordering::SeqCst) {
            return Err(DbError::Other("connection refused".into()));
        }
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            source: self.clone(),
        })
    }
}

pub struct FakeConnection {
    source: FakeSource,
}

impl Connection for FakeConnection {
    fn execute_streaming<'a>(&'a mut self, query: &'a str, _fetch_hint: usize) -> RowStream<'a> {
        futures::stream::iter(self.source.run(query, &[])).boxed()
    }

    fn execute_parameterized<'a>(&'a mut self, query: &'a str, params: &'a [Value]) -> RowStream<'a> {
        futures::stream::iter(self.source.run(query, params)).boxed()
    }

    async fn close(self) -> DbResult<()> {
        self.source.shared.closes.fetch_add(1, Ordering::SeqCst);
        if self.source.shared.fail_close.load(Ordering::SeqCst) {
            return Err(DbError::Other("close failed".into()));
        }
        Ok(())
    }
}

pub const LIST_SQL: &str = "select id from docs";
pub const CONTENT_SQL: &str = "select * from docs where id = ?";
pub const UPDATE_SQL: &str = "select id from docs where modified > ?";
pub const ACL_SQL: &str = "select * from acls where id = ?";

/// Rows `{id: 0..count}`
pub fn id_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|n| Row::from_pairs([("id", Value::Int(n as i64))]))
        .collect()
}

pub fn base_config(batch: i64) -> AdaptorConfig {
    AdaptorConfig::builder()
        .max_ids_per_feed_file(batch)
        .every_doc_id_sql(LIST_SQL)
        .single_doc_content_sql(CONTENT_SQL)
        .mode_of_operation("rowToText")
        .build()
        .unwrap()
}

pub fn int_key() -> PrimaryKey {
    PrimaryKey::parse("id:int", "").unwrap()
}

pub fn adaptor(config: AdaptorConfig, source: FakeSource) -> DatabaseAdaptor<FakeSource, PrimaryKey> {
    DatabaseAdaptor::new(config, source, int_key(), &StrategyRegistry::new()).unwrap()
}
