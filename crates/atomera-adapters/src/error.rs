//! Taxonomía de errores de las etapas.
//!
//! - `Validation`: entrada inválida; bloquea la acción, nunca es fatal.
//! - `JobFailure`: estado terminal `failed` de un job; reintentable.
//! - `GatingViolation`: etapa bloqueada; se rechaza en silencio.
//! - `Collaborator`: el visor o la API rechazaron la llamada.

use atomera_core::{JobError, WorkflowError};
use atomera_domain::{DomainError, StageId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("viewer failed to load structure: {0}")]
    Load(String),
    #[error("viewer error: {0}")]
    Viewer(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("http error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(e: reqwest::Error) -> Self {
        CollaboratorError::Http(e.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    JobFailure(String),
    #[error("stage '{0}' is locked")]
    GatingViolation(StageId),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Job(JobError),
    #[error("switching input mode discards the current target; confirmation required")]
    ConfirmationRequired,
    #[error("job timed out after {0}s")]
    TimedOut(u64),
    #[error("job cancelled")]
    Cancelled,
}

impl StageError {
    pub fn validation(message: impl Into<String>) -> Self {
        StageError::Validation(vec![message.into()])
    }

    /// Errores que no deben reflejarse en `status_message`.
    pub fn is_silent(&self) -> bool {
        matches!(self,
                 StageError::GatingViolation(_) | StageError::Cancelled | StageError::Job(JobError::Stale { .. }))
    }
}

impl From<JobError> for StageError {
    fn from(e: JobError) -> Self {
        match e {
            JobError::Cancelled { .. } => StageError::Cancelled,
            other => StageError::Job(other),
        }
    }
}

impl From<WorkflowError> for StageError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::GatingViolation { stage } => StageError::GatingViolation(stage),
            WorkflowError::Serialization(msg) => StageError::JobFailure(msg),
        }
    }
}

impl From<DomainError> for StageError {
    fn from(e: DomainError) -> Self {
        StageError::validation(e.to_string())
    }
}
