use gantt_filter::api::{ApiError, GanttApi, UserPreset};
use gantt_filter::behavior::{BehaviorFactory, GanttItem, ItemStore, ResultBehavior, ResultMode};
use gantt_filter::options::OptionsSnapshot;
use gantt_filter::query::Query;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn unavailable(what: &str) -> ApiError {
    ApiError::Status {
        status: 503,
        body: format!("{what} unavailable"),
    }
}

/// In-memory [`GanttApi`] that records every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockApi {
    /// Served by `fetch_filters`; `None` makes the fetch fail.
    pub snapshot: Mutex<Option<OptionsSnapshot>>,
    /// Remote preset list, replaced by successful persists.
    pub presets: Mutex<Vec<UserPreset>>,
    /// Served by `fetch_data` for any params.
    pub data: Mutex<Value>,
    pub fail_preset_fetch: AtomicBool,
    pub fail_persist: AtomicBool,
    pub persisted: Mutex<Vec<Vec<UserPreset>>>,
    pub data_requests: Mutex<Vec<(String, Query)>>,
    pub roots_seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockApi {
    /// Options for the standard fields plus two saved presets.
    pub fn standard() -> Self {
        let api = Self::default();
        *api.snapshot.lock() = Some(OptionsSnapshot::from_json(json!({
            "donors": [{"id": 1, "name": "World Bank"}, {"id": 2, "name": "UNDP"}],
            "responsible": [{"id": 10}, {"id": 11}],
            "commitments": [{"id": 20}],
            "commitmentType": [{"id": "soft"}, {"id": "hard"}],
            "outputs": [{"id": 30}, {"id": 31}],
        })));
        *api.presets.lock() = vec![
            UserPreset::new("Donor 1", Query::from_json(json!({"donors": [1]}))),
            UserPreset::new(
                "Search",
                Query::from_json(json!({"search": "bridge", "outputs": [31]})),
            ),
        ];
        api
    }

    pub fn with_snapshot(snapshot: Value) -> Self {
        let api = Self::default();
        *api.snapshot.lock() = Some(OptionsSnapshot::from_json(snapshot));
        api
    }

    pub fn last_persisted(&self) -> Option<Vec<UserPreset>> {
        self.persisted.lock().last().cloned()
    }
}

impl GanttApi for MockApi {
    async fn fetch_filters(&self, root_uid: &str) -> Result<OptionsSnapshot, ApiError> {
        self.roots_seen.lock().push(root_uid.to_string());
        self.snapshot
            .lock()
            .clone()
            .ok_or_else(|| unavailable("options"))
    }

    async fn fetch_user_filters(&self, root_uid: &str) -> Result<Vec<UserPreset>, ApiError> {
        self.roots_seen.lock().push(root_uid.to_string());
        if self.fail_preset_fetch.load(Ordering::SeqCst) {
            return Err(unavailable("presets"));
        }
        Ok(self.presets.lock().clone())
    }

    async fn update_user_filters(
        &self,
        root_uid: &str,
        presets: &[UserPreset],
    ) -> Result<(), ApiError> {
        self.roots_seen.lock().push(root_uid.to_string());
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(unavailable("persist"));
        }
        self.persisted.lock().push(presets.to_vec());
        *self.presets.lock() = presets.to_vec();
        Ok(())
    }

    async fn fetch_data(&self, root_uid: &str, params: &Query) -> Result<Value, ApiError> {
        self.data_requests
            .lock()
            .push((root_uid.to_string(), params.clone()));
        Ok(self.data.lock().clone())
    }
}

/// Behavior that records `filter`/`cancel` calls into a shared log.
#[allow(dead_code)]
#[derive(Debug)]
pub struct RecordingBehavior {
    id: usize,
    mode: ResultMode,
    applied: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl ResultBehavior for RecordingBehavior {
    fn mode(&self) -> ResultMode {
        self.mode
    }

    fn filter(&mut self, _all_items: &ItemStore, filtered: &[String]) {
        self.applied = true;
        self.log
            .lock()
            .push(format!("filter:{}:{}:{}", self.id, self.mode, filtered.len()));
    }

    fn cancel_filtration(&mut self) {
        self.applied = false;
        self.log.lock().push(format!("cancel:{}", self.id));
    }

    fn is_applied(&self) -> bool {
        self.applied
    }
}

/// Factory numbering each instance it creates, plus the shared log.
#[allow(dead_code)]
pub fn recording_factory() -> (BehaviorFactory, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let counter = Arc::new(AtomicUsize::new(0));
    let shared = log.clone();
    let factory: BehaviorFactory = Box::new(move |mode: ResultMode| {
        Box::new(RecordingBehavior {
            id: counter.fetch_add(1, Ordering::SeqCst),
            mode,
            applied: false,
            log: shared.clone(),
        }) as Box<dyn ResultBehavior>
    });
    (factory, log)
}

#[allow(dead_code)]
pub fn items(uids: &[&str]) -> ItemStore {
    ItemStore::new(uids.iter().map(|uid| GanttItem::new(*uid)).collect())
}
