//! End-to-end tests driving `QueryLogger` the way an execution layer would:
//! one `record` call per completed query, with recording sinks standing in
//! for the log transport.

use std::error::Error;
use std::sync::{Arc, Mutex};

use query_observer::{
    BoundValue, ChannelSink, Channels, ObservabilityConfig, ObserverError, QueryLogger, Statement,
    ValueFormatter, UNLIMITED,
};

struct Utf8Formatter;

impl ValueFormatter for Utf8Formatter {
    fn format(&self, value: &BoundValue) -> Result<String, ObserverError> {
        let raw = value.raw.as_deref().unwrap_or_default();
        String::from_utf8(raw.to_vec()).map_err(|e| ObserverError::ValueRender(e.to_string()))
    }
}

#[derive(Clone)]
struct RecordingSink {
    base: bool,
    detail: bool,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn new(base: bool, detail: bool) -> Self {
        Self { base, detail, lines: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl ChannelSink for RecordingSink {
    fn base_enabled(&self) -> bool {
        self.base
    }
    fn detail_enabled(&self) -> bool {
        self.detail
    }
    fn emit(&self, message: &str, _cause: Option<&(dyn Error + 'static)>) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

struct Setup {
    logger: QueryLogger,
    config: Arc<ObservabilityConfig>,
    normal: RecordingSink,
    slow: RecordingSink,
    timeout: RecordingSink,
    error: RecordingSink,
}

fn setup(detail: bool) -> Setup {
    let normal = RecordingSink::new(true, detail);
    let slow = RecordingSink::new(true, detail);
    let timeout = RecordingSink::new(true, detail);
    let error = RecordingSink::new(true, detail);
    let channels = Channels {
        normal: Box::new(normal.clone()),
        slow: Box::new(slow.clone()),
        timeout: Box::new(timeout.clone()),
        error: Box::new(error.clone()),
    };
    let config = Arc::new(ObservabilityConfig::new());
    let logger = QueryLogger::with_channels(config.clone(), Arc::new(Utf8Formatter), channels);
    Setup { logger, config, normal, slow, timeout, error }
}

fn lines(sink: &RecordingSink) -> Vec<String> {
    sink.lines.lock().unwrap().clone()
}

fn nanos(ms: u64) -> u64 {
    ms * 1_000_000
}

#[test]
fn test_bound_update_with_detail_end_to_end() {
    // default config: threshold 5000, query length 500, parameter length 50
    let s = setup(true);
    let stmt = Statement::bound(
        "UPDATE t SET c=? WHERE pk=?",
        vec!["c".to_string(), "pk".to_string()],
        vec![
            BoundValue::new(b"foo".to_vec(), "text"),
            BoundValue::new(b"42".to_vec(), "int"),
        ],
    );

    s.logger.record("10.1.2.3", &stmt, None, false, nanos(10));

    let normal = lines(&s.normal);
    assert_eq!(normal.len(), 1);
    assert!(normal[0].contains("UPDATE t SET c=? WHERE pk=?"));
    assert!(normal[0].contains("c:foo"));
    assert!(normal[0].contains("pk:42"));
    assert!(lines(&s.slow).is_empty());
    assert!(lines(&s.timeout).is_empty());
    assert!(lines(&s.error).is_empty());
}

#[test]
fn test_exactly_one_channel_per_outcome() {
    let s = setup(false);
    s.config.set_slow_query_threshold_ms(100);
    let stmt = Statement::simple("SELECT 1");
    let failure = std::io::Error::other("boom");

    s.logger.record("h", &stmt, None, false, nanos(50));
    s.logger.record("h", &stmt, None, false, nanos(150));
    s.logger.record("h", &stmt, Some(&failure), true, nanos(50));
    s.logger.record("h", &stmt, Some(&failure), false, nanos(50));

    assert_eq!(lines(&s.normal).len(), 1);
    assert_eq!(lines(&s.slow).len(), 1);
    assert_eq!(lines(&s.timeout).len(), 1);
    assert_eq!(lines(&s.error).len(), 1);
}

#[test]
fn test_internal_statement_invisible_on_all_channels() {
    let s = setup(true);
    s.config.set_slow_query_threshold_ms(0);
    let failure = std::io::Error::other("boom");

    s.logger.record("h", &Statement::Internal, None, false, nanos(10));
    s.logger.record("h", &Statement::Internal, Some(&failure), false, nanos(10));
    s.logger.record("h", &Statement::Internal, Some(&failure), true, nanos(10));

    assert!(lines(&s.normal).is_empty());
    assert!(lines(&s.slow).is_empty());
    assert!(lines(&s.timeout).is_empty());
    assert!(lines(&s.error).is_empty());
}

#[test]
fn test_live_config_mutation_applies_between_calls() {
    let s = setup(false);
    let stmt = Statement::simple("SELECT * FROM test WHERE pk = 42");

    s.logger.record("h", &stmt, None, false, nanos(10));
    assert!(lines(&s.normal)[0].contains("SELECT * FROM test WHERE pk = 42;"));

    s.config.set_max_query_string_length(5).unwrap();
    s.logger.record("h", &stmt, None, false, nanos(10));
    let normal = lines(&s.normal);
    assert!(normal[1].ends_with("SELEC..."));

    s.config.set_max_query_string_length(UNLIMITED).unwrap();
    s.logger.record("h", &stmt, None, false, nanos(10));
    assert!(lines(&s.normal)[2].contains("SELECT * FROM test WHERE pk = 42;"));
}

#[test]
fn test_invalid_config_write_rejected_and_old_value_visible() {
    let s = setup(false);
    s.config.set_max_query_string_length(10).unwrap();
    assert!(s.config.set_max_query_string_length(0).is_err());
    assert!(s.config.set_max_query_string_length(-7).is_err());
    assert_eq!(s.config.max_query_string_length(), 10);

    let stmt = Statement::simple("SELECT * FROM test WHERE pk = 42");
    s.logger.record("h", &stmt, None, false, nanos(10));
    assert!(lines(&s.normal)[0].ends_with("SELECT * F..."));
}

#[test]
fn test_concurrent_record_calls_with_config_writer() {
    let s = Arc::new(setup(false));
    let stmt = Arc::new(Statement::simple("SELECT 1"));

    let writer = {
        let s = Arc::clone(&s);
        std::thread::spawn(move || {
            for i in 0..500u64 {
                s.config.set_slow_query_threshold_ms(i % 20);
            }
        })
    };
    let recorders: Vec<_> = (0..4)
        .map(|_| {
            let s = Arc::clone(&s);
            let stmt = Arc::clone(&stmt);
            std::thread::spawn(move || {
                for _ in 0..250 {
                    s.logger.record("h", &stmt, None, false, nanos(10));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in recorders {
        r.join().unwrap();
    }

    // every call lands on exactly one of normal/slow depending on the
    // threshold it observed
    assert_eq!(lines(&s.normal).len() + lines(&s.slow).len(), 1000);
    assert!(lines(&s.timeout).is_empty());
    assert!(lines(&s.error).is_empty());
}

#[test]
fn test_tracing_channels_emit_through_subscriber() {
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("query_observer::normal=trace")
        .with_writer(BufferWriter(buffer.clone()))
        .finish();

    let config = Arc::new(ObservabilityConfig::new());
    let logger = QueryLogger::new(config, Arc::new(Utf8Formatter));
    let stmt = Statement::bound(
        "SELECT * FROM t WHERE pk=?",
        vec!["pk".to_string()],
        vec![BoundValue::new(b"42".to_vec(), "int")],
    );

    tracing::subscriber::with_default(subscriber, || {
        logger.record("10.0.0.1", &stmt, None, false, nanos(3));
    });

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(output.contains("Query completed normally on host 10.0.0.1"));
    assert!(output.contains("SELECT * FROM t WHERE pk=?"));
    assert!(output.contains("pk:42"));
}
