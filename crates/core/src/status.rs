//! Job status enum mapping to the `job_statuses` SMALLINT lookup table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! database. Transitions are forward-only: once a job reaches a terminal
//! status it is never mutated again.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Lifecycle status of a workflow job.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

/// Terminal statuses: completed, failed.
pub const TERMINAL_STATUSES: [StatusId; 2] = [
    JobStatus::Completed as StatusId,
    JobStatus::Failed as StatusId,
];

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Map a raw status ID back to the enum, if it is a known value.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(JobStatus::Pending),
            2 => Some(JobStatus::Processing),
            3 => Some(JobStatus::Completed),
            4 => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}
