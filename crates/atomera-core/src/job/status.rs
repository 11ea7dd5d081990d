use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado de un job.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Pending` -> `Failed` (p.ej. deadline vencido antes de arrancar)
/// - `Running` -> `Complete`
/// - `Running` -> `Failed`
/// - `Running` -> `Cancelled`
///
/// `Failed` admite reintento, pero el reintento crea un job nuevo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!((self, next),
                 (JobStatus::Pending, JobStatus::Running)
                 | (JobStatus::Pending, JobStatus::Failed)
                 | (JobStatus::Running, JobStatus::Complete)
                 | (JobStatus::Running, JobStatus::Failed)
                 | (JobStatus::Running, JobStatus::Cancelled))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
