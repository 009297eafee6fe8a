//! Job status polling: the `idle → polling → {completed, failed,
//! timed_out}` state machine.
//!
//! [`JobPoller::run`] is one polling loop for one job id: an immediate
//! status check, then fixed-interval checks until a terminal state, the
//! wall-clock ceiling, or cancellation. Checks are serialized by the
//! loop structure, so at most one is in flight per job.
//!
//! [`JobWatcher`] owns the loop for a UI context: replacing the watched
//! job id (including with `None`) tears down the previous loop and
//! resets all per-job state, and the registered completion or error
//! callback fires exactly once per watched job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use relay_core::content::decode_result;
use relay_core::status::JobStatus;
use relay_core::types::DbId;

use crate::source::{JobSnapshot, JobStatusSource};

/// Default delay between consecutive status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default wall-clock ceiling for one polling loop.
pub const DEFAULT_MAX_POLLING_TIME: Duration = Duration::from_secs(180);

/// Terminal result of one polling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job completed; carries the fully decoded result.
    Completed(serde_json::Value),
    /// The job failed; carries the stored error message.
    Failed(String),
    /// The ceiling elapsed without a terminal state. The job may still
    /// be finalized later, but this loop will never observe it.
    TimedOut,
}

/// Observable state of a [`JobWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// Polls a single job until terminal, timed out, or cancelled.
pub struct JobPoller {
    source: Arc<dyn JobStatusSource>,
    poll_interval: Duration,
    max_polling_time: Duration,
}

impl JobPoller {
    /// Create a poller with the default 2 s interval and 3 min ceiling.
    pub fn new(source: Arc<dyn JobStatusSource>) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polling_time: DEFAULT_MAX_POLLING_TIME,
        }
    }

    /// Override the poll interval and ceiling.
    pub fn with_timing(mut self, poll_interval: Duration, max_polling_time: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.max_polling_time = max_polling_time;
        self
    }

    /// Run one polling loop for `job_id`.
    ///
    /// Returns `None` when cancelled, `Some(outcome)` otherwise. A
    /// transient status-check failure is logged and retried on the next
    /// tick; only the ceiling bounds it.
    pub async fn run(&self, job_id: DbId, cancel: CancellationToken) -> Option<PollOutcome> {
        let started = tokio::time::Instant::now();

        loop {
            match self.source.fetch(job_id).await {
                Ok(snapshot) => {
                    if let Some(outcome) = terminal_outcome(&snapshot) {
                        return Some(outcome);
                    }
                }
                Err(e) => {
                    tracing::warn!(job_id, error = %e, "Status check failed, will retry");
                }
            }

            if started.elapsed() >= self.max_polling_time {
                tracing::warn!(
                    job_id,
                    ceiling_secs = self.max_polling_time.as_secs(),
                    "Polling ceiling reached without a terminal state",
                );
                return Some(PollOutcome::TimedOut);
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Detect a terminal state in a snapshot.
///
/// A job is terminal on an explicit `completed`/`failed` status, or --
/// as a tolerance for upstream inconsistency -- when both a completion
/// timestamp and a result are present.
fn terminal_outcome(snapshot: &JobSnapshot) -> Option<PollOutcome> {
    match JobStatus::from_id(snapshot.status_id) {
        Some(JobStatus::Completed) => Some(PollOutcome::Completed(decode_result(
            snapshot.result.clone().unwrap_or(serde_json::Value::Null),
        ))),
        Some(JobStatus::Failed) => Some(PollOutcome::Failed(
            snapshot
                .error_message
                .clone()
                .unwrap_or_else(|| "Job failed".to_string()),
        )),
        _ => {
            if snapshot.completed_at.is_some() {
                if let Some(result) = &snapshot.result {
                    return Some(PollOutcome::Completed(decode_result(result.clone())));
                }
            }
            None
        }
    }
}

/// A watch in flight; the token tears its loop down.
struct ActiveWatch {
    job_id: DbId,
    cancel: CancellationToken,
}

/// Owns at most one polling loop and delivers its outcome exactly once.
pub struct JobWatcher {
    poller: Arc<JobPoller>,
    state: Arc<Mutex<WatchState>>,
    current: Option<ActiveWatch>,
}

impl JobWatcher {
    pub fn new(poller: JobPoller) -> Self {
        Self {
            poller: Arc::new(poller),
            state: Arc::new(Mutex::new(WatchState::Idle)),
            current: None,
        }
    }

    /// The state of the current (or last finished) watch.
    pub fn state(&self) -> WatchState {
        *self.state.lock().unwrap()
    }

    /// The job id currently being watched, if any.
    pub fn current_job(&self) -> Option<DbId> {
        self.current.as_ref().map(|active| active.job_id)
    }

    /// Replace the watched job id.
    ///
    /// Tears down any previous loop first and resets per-job state.
    /// With `Some(job_id)`, starts a new loop; `on_complete` receives
    /// the fully decoded result, `on_error` the failure or timeout
    /// message. Exactly one of them is invoked, exactly once, unless
    /// the watch is replaced or stopped before a terminal state.
    pub fn watch<C, E>(&mut self, job_id: Option<DbId>, on_complete: C, on_error: E)
    where
        C: FnOnce(serde_json::Value) + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        self.teardown();

        let Some(job_id) = job_id else {
            return;
        };

        // Fresh state cell per watch: a loop that is torn down later
        // can never clobber the state of its replacement.
        let state = Arc::new(Mutex::new(WatchState::Polling));
        self.state = Arc::clone(&state);

        let cancel = CancellationToken::new();
        let delivered = Arc::new(AtomicBool::new(false));

        let poller = Arc::clone(&self.poller);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let outcome = poller.run(job_id, task_cancel.clone()).await;

            let Some(outcome) = outcome else {
                return; // cancelled mid-poll
            };
            if task_cancel.is_cancelled() {
                return; // cancelled between terminal check and delivery
            }
            if delivered.swap(true, Ordering::SeqCst) {
                return; // reentrancy guard: deliver at most once
            }

            match outcome {
                PollOutcome::Completed(result) => {
                    *state.lock().unwrap() = WatchState::Completed;
                    on_complete(result);
                }
                PollOutcome::Failed(message) => {
                    *state.lock().unwrap() = WatchState::Failed;
                    on_error(message);
                }
                PollOutcome::TimedOut => {
                    *state.lock().unwrap() = WatchState::TimedOut;
                    on_error("Timed out waiting for the job to complete".to_string());
                }
            }
        });

        self.current = Some(ActiveWatch { job_id, cancel });
    }

    /// Tear down the current loop, if any, and return to idle.
    pub fn stop(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(active) = self.current.take() {
            active.cancel.cancel();
        }
        self.state = Arc::new(Mutex::new(WatchState::Idle));
    }
}

impl Drop for JobWatcher {
    fn drop(&mut self) {
        if let Some(active) = self.current.take() {
            active.cancel.cancel();
        }
    }
}
