//! Errores del core: ciclo de vida de jobs y navegación entre etapas.

use atomera_domain::StageId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::job::JobStatus;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum JobError {
    #[error("job {job_id} is still {status}; only one job may run per stage")]
    AlreadyRunning { job_id: Uuid, status: JobStatus },
    #[error("no current job")]
    NoCurrentJob,
    #[error("job {job_id} is no longer the current job")]
    Stale { job_id: Uuid },
    #[error("job {job_id} was cancelled")]
    Cancelled { job_id: Uuid },
    #[error("invalid job transition {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("only failed jobs can be retried (current status: {status})")]
    NotRetryable { status: JobStatus },
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum WorkflowError {
    #[error("stage '{stage}' is locked")]
    GatingViolation { stage: StageId },
    #[error("serialization: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WorkflowError {
    fn from(e: serde_json::Error) -> Self {
        WorkflowError::Serialization(e.to_string())
    }
}
