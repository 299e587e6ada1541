//! Run bookkeeping shared by the runners and the worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

// ============================================================================
// CancellationToken
// ============================================================================

/// Cooperative cancellation, checked once per loop iteration.
///
/// Clones share state. [`CancellationToken::sleep`] wakes up as soon as the
/// token is cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Full means a wake-up is already pending.
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` when the token is cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.wake_rx.recv_timeout(duration) {
            Ok(()) => {
                // Keep the wake-up for other sleepers sharing this token.
                let _ = self.wake_tx.try_send(());
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => self.is_cancelled(),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Immutable snapshot of a run's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub processed_rows: usize,
    pub total_rows: usize,
    pub requests_sent: usize,
    pub planned_requests: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Progress {
    pub fn rows(processed_rows: usize, total_rows: usize) -> Self {
        Self {
            processed_rows,
            total_rows,
            ..Self::default()
        }
    }

    /// Completed share in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total_rows == 0 {
            1.0
        } else {
            self.processed_rows as f64 / self.total_rows as f64
        }
    }
}

/// How a run ended, with whatever output it produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled(T),
    Failed {
        error: crate::error::RowplateError,
        partial: Option<T>,
    },
}

impl<T> Outcome<T> {
    pub fn output(&self) -> Option<&T> {
        match self {
            Self::Completed(out) | Self::Cancelled(out) => Some(out),
            Self::Failed { partial, .. } => partial.as_ref(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn sleep_runs_full_duration_when_not_cancelled() {
        let token = CancellationToken::new();
        let started = Instant::now();
        assert!(!token.sleep(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_wakes_a_sleeping_thread() {
        let token = CancellationToken::new();
        let sleeper = token.clone();
        let handle = std::thread::spawn(move || {
            let started = Instant::now();
            (sleeper.sleep(Duration::from_secs(10)), started.elapsed())
        });

        std::thread::sleep(Duration::from_millis(20));
        token.cancel();
        let (cancelled, elapsed) = handle.join().unwrap();
        assert!(cancelled);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn cancelled_token_does_not_sleep() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(token.is_cancelled());
    }

    #[test]
    fn progress_fraction() {
        assert_eq!(Progress::rows(0, 0).fraction(), 1.0);
        assert_eq!(Progress::rows(1, 4).fraction(), 0.25);
    }
}
