//! HTTP Sender - serial request loop with pacing and cancellation.
//!
//! One request in flight at a time. Per-request failures (network error,
//! non-2xx status) are logged and the loop moves on; an unparseable URI
//! stops the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::{Origin, Url};

use crate::{
    application::{
        ports::HttpTransport,
        run::{CancellationToken, Outcome, Progress},
        services::{BatchRequestQueue, ParamResolver, Validator},
    },
    domain::{Request, RequestTemplate, Response, RowTable, ValidationReport, placeholder},
};

pub const DEFAULT_PACING: Duration = Duration::from_millis(200);

const AUTHORIZATION: &str = "Authorization";

// ============================================================================
// Options
// ============================================================================

/// Basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn header_value(&self) -> String {
        let pair = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Pause between two requests.
    pub pacing: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            credentials: None,
        }
    }
}

/// Credentials bound to the origin of the template URI.
///
/// The origin is taken from the URI with all placeholders removed. When no
/// origin can be derived the credentials go with every request.
struct AuthScope {
    origin: Option<Origin>,
    header: String,
}

impl AuthScope {
    fn new(uri_template: &str, credentials: &Credentials) -> Self {
        let stripped = placeholder::remove_placeholders(uri_template);
        let origin = match Url::parse(stripped.trim()) {
            Ok(url) => Some(url.origin()),
            Err(e) => {
                warn!(uri = %stripped, error = %e, "cannot scope credentials to an origin");
                None
            }
        };
        Self {
            origin,
            header: credentials.header_value(),
        }
    }

    fn apply(&self, request: &mut Request) {
        request
            .headers
            .retain(|k, _| !k.eq_ignore_ascii_case(AUTHORIZATION));
        let in_scope = self
            .origin
            .as_ref()
            .is_none_or(|origin| *origin == request.uri.origin());
        if in_scope {
            request
                .headers
                .insert(AUTHORIZATION.to_string(), self.header.clone());
        }
    }
}

// ============================================================================
// Log
// ============================================================================

/// What came back for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    Responded(Response),
    Failed { reason: String },
}

/// One sent request and its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Zero-based index of the first row in the request.
    pub index: usize,
    /// Rows carried by the request.
    pub rows: usize,
    pub timestamp: DateTime<Local>,
    pub request: Request,
    pub delivery: Delivery,
    pub duration: Duration,
}

impl LogRecord {
    /// One-based row range: `"3"` or `"3 - 5"`.
    pub fn processed_range(&self) -> String {
        if self.rows <= 1 {
            (self.index + 1).to_string()
        } else {
            format!("{} - {}", self.index + 1, self.index + self.rows)
        }
    }

    /// True for a 2xx response.
    pub fn is_success(&self) -> bool {
        matches!(&self.delivery, Delivery::Responded(r) if r.is_success())
    }

    pub fn response(&self) -> Option<&Response> {
        match &self.delivery {
            Delivery::Responded(r) => Some(r),
            Delivery::Failed { .. } => None,
        }
    }

    /// Status line, or the failure reason when nothing came back.
    pub fn summary(&self) -> String {
        match &self.delivery {
            Delivery::Responded(r) => r.status_line(),
            Delivery::Failed { reason } => format!("failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendReport {
    pub planned: usize,
    pub records: Vec<LogRecord>,
}

impl SendReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

// ============================================================================
// HttpSender
// ============================================================================

#[derive(Clone)]
pub struct HttpSender {
    resolver: ParamResolver,
    transport: Arc<dyn HttpTransport>,
}

impl HttpSender {
    pub fn new(resolver: ParamResolver, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    pub fn validate(&self, template: &RequestTemplate, table: &RowTable) -> ValidationReport {
        Validator::new(&self.resolver).validate_requests(template, table)
    }

    /// Requests a run over `table` would send.
    pub fn plan(&self, template: &RequestTemplate, table: &RowTable) -> usize {
        BatchRequestQueue::new(template, table, &self.resolver).size()
    }

    /// Render requests without sending them.
    pub fn preview<'a>(
        &'a self,
        template: &'a RequestTemplate,
        table: &'a RowTable,
        options: &SendOptions,
    ) -> impl Iterator<Item = crate::error::RowplateResult<Request>> + 'a {
        let auth = options
            .credentials
            .as_ref()
            .map(|c| AuthScope::new(&template.uri, c));
        BatchRequestQueue::new(template, table, &self.resolver).map(move |request| {
            let mut request = request?;
            if let Some(auth) = &auth {
                auth.apply(&mut request);
            }
            Ok(request)
        })
    }

    #[instrument(skip_all, fields(template = %template.name, rows = table.effective_len()))]
    pub fn send(
        &self,
        template: &RequestTemplate,
        table: &RowTable,
        options: &SendOptions,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Outcome<SendReport> {
        let mut queue = BatchRequestQueue::new(template, table, &self.resolver);
        let auth = options
            .credentials
            .as_ref()
            .map(|c| AuthScope::new(&template.uri, c));

        let mut report = SendReport {
            planned: queue.size(),
            records: Vec::with_capacity(queue.size()),
        };
        let mut progress = Progress {
            total_rows: queue.total_rows(),
            planned_requests: report.planned,
            ..Progress::default()
        };
        info!(planned = report.planned, batch = queue.batch_size(), "sending requests");

        while queue.has_next() {
            if cancel.is_cancelled() {
                info!(sent = report.records.len(), "send cancelled");
                return Outcome::Cancelled(report);
            }

            let first = queue.index();
            let mut request = match queue.next_request() {
                Some(Ok(request)) => request,
                Some(Err(error)) => {
                    warn!(%error, row = first + 1, "stopping run");
                    return Outcome::Failed {
                        error,
                        partial: Some(report),
                    };
                }
                None => break,
            };
            if let Some(auth) = &auth {
                auth.apply(&mut request);
            }

            let record = self.deliver(request, first, queue.index() - first);

            progress.processed_rows = queue.index();
            progress.requests_sent += 1;
            if record.is_success() {
                progress.succeeded += 1;
            } else {
                progress.failed += 1;
            }
            report.records.push(record);
            on_progress(progress);

            if queue.has_next() && !options.pacing.is_zero() && cancel.sleep(options.pacing) {
                info!(sent = report.records.len(), "send cancelled");
                return Outcome::Cancelled(report);
            }
        }

        info!(
            succeeded = progress.succeeded,
            failed = progress.failed,
            "send finished"
        );
        Outcome::Completed(report)
    }

    fn deliver(&self, request: Request, index: usize, rows: usize) -> LogRecord {
        let timestamp = Local::now();
        let started = Instant::now();
        let delivery = match self.transport.execute(&request) {
            Ok(response) => Delivery::Responded(response),
            Err(e) => Delivery::Failed {
                reason: e.to_string(),
            },
        };
        let record = LogRecord {
            index,
            rows,
            timestamp,
            request,
            delivery,
            duration: started.elapsed(),
        };

        if record.is_success() {
            debug!(rows = %record.processed_range(), status = %record.summary(), "request sent");
        } else {
            warn!(rows = %record.processed_range(), status = %record.summary(), "request failed");
        }
        record
    }
}

impl std::fmt::Debug for HttpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSender").finish_non_exhaustive()
    }
}
