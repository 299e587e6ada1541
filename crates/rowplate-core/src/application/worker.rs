//! Background runs on a dedicated thread per run.
//!
//! ```text
//! caller ──spawn_*──▶ Worker ──thread──▶ FileBuilder / HttpSender
//!   ▲                                         │
//!   └────── RunEvent over crossbeam channel ◀─┘
//! ```
//!
//! The caller never blocks unless it chooses to wait on the handle.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::ByteSink,
        run::{CancellationToken, Outcome, Progress},
        services::{BuildSummary, FileBuilder, HttpSender, SendOptions, SendReport},
    },
    domain::{LineTemplate, RequestTemplate, RowTable},
    error::{RowplateError, RowplateResult},
};

/// Lifecycle event of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent<T> {
    Scheduled,
    Progress(Progress),
    Succeeded(T),
    Failed {
        error: RowplateError,
        partial: Option<T>,
    },
    Cancelled(T),
}

impl<T> RunEvent<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded(_) | Self::Failed { .. } | Self::Cancelled(_)
        )
    }

    fn from_outcome(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Completed(out) => Self::Succeeded(out),
            Outcome::Cancelled(out) => Self::Cancelled(out),
            Outcome::Failed { error, partial } => Self::Failed { error, partial },
        }
    }
}

// ============================================================================
// RunGuard
// ============================================================================

/// Registration of an active run; at most one per template id.
#[derive(Debug)]
pub struct RunGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
    id: Uuid,
}

impl RunGuard {
    fn acquire(active: &Arc<Mutex<HashSet<Uuid>>>, id: Uuid, name: &str) -> RowplateResult<Self> {
        let mut set = active.lock().map_err(|_| ApplicationError::LockPoisoned)?;
        if !set.insert(id) {
            return Err(ApplicationError::RunAlreadyActive {
                template: name.to_string(),
            }
            .into());
        }
        Ok(Self {
            active: Arc::clone(active),
            id,
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.active.lock() {
            set.remove(&self.id);
        }
    }
}

// ============================================================================
// RunHandle
// ============================================================================

/// Caller side of a background run.
#[derive(Debug)]
pub struct RunHandle<T> {
    template_id: Uuid,
    events: Receiver<RunEvent<T>>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl<T> RunHandle<T> {
    pub fn template_id(&self) -> Uuid {
        self.template_id
    }

    pub fn events(&self) -> &Receiver<RunEvent<T>> {
        &self.events
    }

    /// Ask the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Block until the run ends, forwarding progress snapshots.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(Progress)) -> Outcome<T> {
        let outcome = loop {
            match self.events.recv() {
                Ok(RunEvent::Scheduled) => {}
                Ok(RunEvent::Progress(progress)) => on_progress(progress),
                Ok(RunEvent::Succeeded(out)) => break Outcome::Completed(out),
                Ok(RunEvent::Cancelled(out)) => break Outcome::Cancelled(out),
                Ok(RunEvent::Failed { error, partial }) => break Outcome::Failed { error, partial },
                Err(_) => {
                    break Outcome::Failed {
                        error: ApplicationError::Worker {
                            reason: "run stopped without reporting a result".into(),
                        }
                        .into(),
                        partial: None,
                    };
                }
            }
        };
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!(template = %self.template_id, "run thread panicked");
            }
        }
        outcome
    }

    pub fn wait(self) -> Outcome<T> {
        self.wait_with(|_| {})
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Spawns runs and enforces one active run per template.
#[derive(Debug, Clone, Default)]
pub struct Worker {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl Worker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, template_id: Uuid) -> bool {
        self.active
            .lock()
            .map(|set| set.contains(&template_id))
            .unwrap_or(false)
    }

    /// Generate a file in the background.
    pub fn spawn_build(
        &self,
        builder: FileBuilder,
        template: &LineTemplate,
        table: RowTable,
        sink: Arc<dyn ByteSink>,
    ) -> RowplateResult<RunHandle<BuildSummary>> {
        let snapshot = Arc::new(template.clone());
        self.spawn(template.id, &template.name, move |cancel, on_progress| {
            builder.build(&snapshot, &table, sink.as_ref(), cancel, on_progress)
        })
    }

    /// Send requests in the background.
    pub fn spawn_send(
        &self,
        sender: HttpSender,
        template: &RequestTemplate,
        table: RowTable,
        options: SendOptions,
    ) -> RowplateResult<RunHandle<SendReport>> {
        let snapshot = Arc::new(template.clone());
        self.spawn(template.id, &template.name, move |cancel, on_progress| {
            sender.send(&snapshot, &table, &options, cancel, on_progress)
        })
    }

    fn spawn<T, F>(&self, id: Uuid, name: &str, job: F) -> RowplateResult<RunHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&CancellationToken, &mut dyn FnMut(Progress)) -> Outcome<T> + Send + 'static,
    {
        let guard = RunGuard::acquire(&self.active, id, name)?;
        let cancel = CancellationToken::new();
        let (tx, rx) = unbounded();

        let token = cancel.clone();
        let run_name = name.to_string();
        let thread = std::thread::Builder::new()
            .name(format!("rowplate-run-{name}"))
            .spawn(move || run(guard, &token, &tx, &run_name, job))
            .map_err(|e| ApplicationError::Worker {
                reason: e.to_string(),
            })?;

        Ok(RunHandle {
            template_id: id,
            events: rx,
            cancel,
            thread: Some(thread),
        })
    }
}

fn run<T, F>(guard: RunGuard, cancel: &CancellationToken, tx: &Sender<RunEvent<T>>, name: &str, job: F)
where
    F: FnOnce(&CancellationToken, &mut dyn FnMut(Progress)) -> Outcome<T>,
{
    // A send only fails once the handle is gone; the run still finishes.
    let _ = tx.send(RunEvent::Scheduled);
    info!(template = %name, "run started");

    let mut on_progress = |progress: Progress| {
        let _ = tx.send(RunEvent::Progress(progress));
    };
    let outcome = job(cancel, &mut on_progress);

    drop(guard);
    let event = RunEvent::from_outcome(outcome);
    debug!(template = %name, terminal = event.is_terminal(), "run finished");
    let _ = tx.send(event);
}
