//! End-to-end tests for the rowplate engine.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockall::mock;
use rowplate_core::application::ApplicationError;
use rowplate_core::domain::MAX_ROWS;
use rowplate_core::prelude::*;

mock! {
    pub Transport {}

    impl HttpTransport for Transport {
        fn execute(&self, request: &Request) -> RowplateResult<Response>;
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Cycles through a fixed list of colors.
struct Palette {
    next: AtomicUsize,
}

impl FakeDataProvider for Palette {
    fn evaluate(&self, _: &str) -> RowplateResult<String> {
        const COLORS: [&str; 3] = ["red", "green", "blue"];
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(COLORS[n % COLORS.len()].to_string())
    }
}

fn resolver() -> ParamResolver {
    ParamResolver::new(Arc::new(Palette {
        next: AtomicUsize::new(0),
    }))
}

#[derive(Clone, Default)]
struct VecSink {
    bytes: Arc<Mutex<Vec<u8>>>,
}

struct VecWriter(Arc<Mutex<Vec<u8>>>);

impl Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ByteSink for VecSink {
    fn open(&self) -> RowplateResult<Box<dyn Write + Send>> {
        Ok(Box::new(VecWriter(Arc::clone(&self.bytes))))
    }

    fn appends(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

impl VecSink {
    fn text(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
    }
}

fn ok_response() -> Response {
    Response {
        status: 200,
        reason: "OK".into(),
        ..Response::default()
    }
}

/// Transport that records every request and answers 200.
fn recording_transport() -> (MockTransport, Arc<Mutex<Vec<Request>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let mut transport = MockTransport::new();
    transport.expect_execute().returning(move |request| {
        log.lock().unwrap().push(request.clone());
        Ok(ok_response())
    });
    (transport, seen)
}

fn no_pacing() -> SendOptions {
    SendOptions {
        pacing: Duration::ZERO,
        credentials: None,
    }
}

fn render(template: &LineTemplate, csv: &str) -> String {
    let table = RowTable::parse(csv, CellDelimiter::Any);
    let mut out = Vec::new();
    FileBuilder::new(resolver())
        .render_to(template, &table, &mut out, true)
        .unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Line mode
// ============================================================================

#[test]
fn rows_bind_index_and_cells() {
    let template = LineTemplate::builder()
        .name("rows")
        .pattern("${_index0}|${_index1}|${_csv0}|${_csv1}")
        .build()
        .unwrap();

    assert_eq!(render(&template, "a,b\nc,d\ne,f"), "0|1|a|b\n1|2|c|d\n2|3|e|f\n");
}

#[test]
fn header_and_footer_never_see_row_data() {
    let template = LineTemplate::builder()
        .name("wrapped")
        .header("-- ${_index0} ${_csv0}")
        .pattern("${_csv0}")
        .footer("-- ${_index1}")
        .build()
        .unwrap();

    assert_eq!(render(&template, "x\ny"), "-- ${_index0} ${_csv0}\nx\ny\n-- ${_index1}\n");
}

#[test]
fn insert_scenario_with_fake_colors() {
    let template = LineTemplate::builder()
        .name("insert")
        .pattern("INSERT INTO fruit (name, qty, color) VALUES ('${_csv0}', ${_csv1}, '${color}');")
        .param(Param::new("color", ParamType::Datafaker).unwrap().with_option("#{color.name}"))
        .build()
        .unwrap();

    let output = render(&template, "apple,8\nbanana,3\ncherry,12");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("INSERT INTO fruit (name, qty, color) VALUES ('apple', 8, '"));
    assert!(lines[2].contains("'cherry', 12"));

    let colors: Vec<&str> = lines
        .iter()
        .map(|l| l.rsplit('\'').nth(1).unwrap_or_default())
        .collect();
    assert_ne!(colors[0], colors[1]);
    assert_ne!(colors[1], colors[2]);
}

#[test]
fn oversized_table_is_truncated_with_warning() {
    let template = LineTemplate::builder()
        .name("big")
        .pattern("${_csv0}")
        .build()
        .unwrap();
    let table = RowTable::from_rows(vec![vec!["x".to_string()]; MAX_ROWS + 1]);
    let builder = FileBuilder::new(resolver());

    let report = builder.validate(&template, &table);
    assert!(!report.passed());
    assert_eq!(
        report.size_exceeded().map(|s| (s.actual, s.max)),
        Some((MAX_ROWS + 1, MAX_ROWS))
    );

    let mut out = Vec::new();
    let summary = builder.render_to(&template, &table, &mut out, true).unwrap();
    assert_eq!(summary.rows, MAX_ROWS);
    assert_eq!(out.iter().filter(|b| **b == b'\n').count(), MAX_ROWS);
}

#[test]
fn validator_flags_missing_param_and_is_idempotent() {
    let template = LineTemplate::builder()
        .name("missing")
        .pattern("${_csv0} ${undefined}")
        .build()
        .unwrap();
    let table = RowTable::parse("a\nb", CellDelimiter::Any);
    let builder = FileBuilder::new(resolver());

    let first = builder.validate(&template, &table);
    let second = builder.validate(&template, &table);
    assert!(!first.passed());
    assert!(first.contains_placeholders());
    assert_eq!(first, second);
    assert_eq!(table.len(), 2);
}

#[test]
fn worker_builds_into_sink() {
    let template = LineTemplate::builder()
        .name("json")
        .header("[")
        .pattern("\"${_csv0}\"")
        .delimiter(",")
        .footer("]")
        .build()
        .unwrap();
    let table = RowTable::parse("a\nb", CellDelimiter::Any);
    let sink = VecSink::default();

    let handle = Worker::new()
        .spawn_build(FileBuilder::new(resolver()), &template, table, Arc::new(sink.clone()))
        .unwrap();
    let outcome = handle.wait();

    assert!(outcome.is_completed());
    assert_eq!(outcome.output().map(|s| s.rows), Some(2));
    assert_eq!(sink.text(), "[\n\"a\",\n\"b\"\n]\n");
}

// ============================================================================
// Request mode
// ============================================================================

fn batch_template(size: usize) -> RequestTemplate {
    RequestTemplate::builder()
        .name("bulk")
        .uri("http://localhost:8080/${table}")
        .headers("Content-Type: application/json\nX-Table: ${table}")
        .body("{\"name\":\"${_csv0}\",\"row\":${_index1}}")
        .batch(Batch::of(size).with_wrapper("[", "]").with_separator(","))
        .param(Param::constant("table", "fruit").unwrap())
        .build()
        .unwrap()
}

#[test]
fn seven_rows_in_batches_of_three() {
    let template = batch_template(3);
    let table = RowTable::parse("a\nb\nc\nd\ne\nf\ng", CellDelimiter::Any);
    let resolver = resolver();
    let mut queue = BatchRequestQueue::new(&template, &table, &resolver);

    assert_eq!(queue.size(), 3);
    let bodies: Vec<String> = queue.by_ref().map(|r| r.unwrap().body).collect();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[2], "[{\"name\":\"g\",\"row\":7}]");
}

#[test]
fn batch_of_two_over_three_rows_sends_two_requests() {
    let (transport, seen) = recording_transport();
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let template = batch_template(2);
    let table = RowTable::parse("apple\nbanana\ncherry", CellDelimiter::Any);

    let outcome = sender.send(&template, &table, &no_pacing(), &CancellationToken::new(), |_| {});
    let report = outcome.output().cloned().unwrap();
    assert!(outcome.is_completed());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].processed_range(), "1 - 2");
    assert_eq!(report.records[1].processed_range(), "3");

    let requests = seen.lock().unwrap();
    assert_eq!(
        requests[0].body,
        "[{\"name\":\"apple\",\"row\":1},{\"name\":\"banana\",\"row\":2}]"
    );
    assert_eq!(requests[1].body, "[{\"name\":\"cherry\",\"row\":3}]");
    assert_eq!(requests[0].uri, requests[1].uri);
    assert_eq!(requests[0].headers, requests[1].headers);
    assert_eq!(requests[0].uri.as_str(), "http://localhost:8080/fruit");
    assert_eq!(requests[0].header("X-Table"), Some("fruit"));
}

#[test]
fn failures_are_recorded_and_do_not_stop_the_queue() {
    let mut transport = MockTransport::new();
    let mut calls = 0;
    transport.expect_execute().times(3).returning(move |_| {
        calls += 1;
        match calls {
            1 => Err(ApplicationError::Transport {
                reason: "connection refused".into(),
            }
            .into()),
            2 => Ok(Response {
                status: 500,
                reason: "Internal Server Error".into(),
                ..Response::default()
            }),
            _ => Ok(ok_response()),
        }
    });
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let template = RequestTemplate::builder()
        .name("single")
        .uri("http://localhost/${_csv0}")
        .build()
        .unwrap();
    let table = RowTable::parse("1\n2\n3", CellDelimiter::Any);

    let mut snapshots = Vec::new();
    let outcome = sender.send(&template, &table, &no_pacing(), &CancellationToken::new(), |p| {
        snapshots.push(p)
    });

    let report = outcome.output().unwrap();
    assert!(outcome.is_completed());
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.records[0].summary(), "failed: Application error: Transport error: connection refused");
    assert_eq!(report.records[1].summary(), "500 Internal Server Error");

    let last = snapshots.last().copied().unwrap();
    assert_eq!((last.requests_sent, last.planned_requests), (3, 3));
    assert_eq!((last.succeeded, last.failed), (1, 2));
    assert_eq!(last.processed_rows, 3);
}

#[test]
fn invalid_uri_fails_the_run_with_partial_log() {
    let (transport, _) = recording_transport();
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let template = RequestTemplate::builder()
        .name("bad")
        .uri("${_csv0}")
        .build()
        .unwrap();
    let table = RowTable::parse("http://localhost/ok\nnot a uri\nhttp://localhost/never", CellDelimiter::Any);

    match sender.send(&template, &table, &no_pacing(), &CancellationToken::new(), |_| {}) {
        Outcome::Failed { error, partial } => {
            assert!(matches!(
                error,
                RowplateError::Application(ApplicationError::InvalidUri { .. })
            ));
            assert_eq!(partial.map(|r| r.records.len()), Some(1));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn cancelling_a_paced_run_returns_collected_records() {
    let (transport, seen) = recording_transport();
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let template = RequestTemplate::builder()
        .name("paced")
        .uri("http://localhost/${_csv0}")
        .build()
        .unwrap();
    let table = RowTable::parse("1\n2\n3\n4", CellDelimiter::Any);
    let options = SendOptions {
        pacing: Duration::from_secs(30),
        credentials: None,
    };

    let handle = Worker::new()
        .spawn_send(sender, &template, table, options)
        .unwrap();
    // First request goes out immediately, then the run sleeps.
    let first = handle
        .events()
        .iter()
        .find_map(|e| match e {
            RunEvent::Progress(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(first.requests_sent, 1);

    handle.cancel();
    match handle.wait() {
        Outcome::Cancelled(report) => assert_eq!(report.records.len(), 1),
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn basic_auth_replaces_template_authorization() {
    let (transport, seen) = recording_transport();
    let sender = HttpSender::new(resolver(), Arc::new(transport));
    let template = RequestTemplate::builder()
        .name("auth")
        .uri("https://api.example.com/items/${_csv0}")
        .headers("Authorization: Bearer stale")
        .build()
        .unwrap();
    let table = RowTable::parse("1", CellDelimiter::Any);
    let options = SendOptions {
        pacing: Duration::ZERO,
        credentials: Some(Credentials::new("Aladdin", "open sesame")),
    };

    let outcome = sender.send(&template, &table, &options, &CancellationToken::new(), |_| {});
    assert!(outcome.is_completed());
    let requests = seen.lock().unwrap();
    assert_eq!(
        requests[0].header("authorization"),
        Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
    );
    assert_eq!(requests[0].headers.len(), 1);
}
