//! Polling client for Relay jobs.
//!
//! The UI layer does not hold an open connection while a workflow runs;
//! it watches the job row instead. [`JobPoller`] checks a job's status
//! on a fixed interval until a terminal state or a wall-clock ceiling,
//! and [`JobWatcher`] wraps it with exactly-once callback delivery and
//! teardown on job-identifier change.

pub mod poller;
pub mod source;

pub use poller::{JobPoller, JobWatcher, PollOutcome, WatchState};
pub use source::{HttpStatusSource, JobSnapshot, JobStatusSource, SourceError};
