//! Tipos de evento del ciclo de vida de un job.
//!
//! Cada transición aceptada por `JobManager` emite exactamente un evento. El
//! historial de eventos es la auditoría fina; `JobManager::history` conserva
//! el último estado de cada job.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::JobKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEventKind {
    /// Job creado en estado `pending`. Debe ser el primer evento de un `job_id`.
    JobCreated { kind: JobKind, description: String, attempt: u32 },
    JobStarted,
    /// Checkpoint de progreso aplicado.
    JobProgress { progress: u8, message: String },
    JobCompleted { message: String },
    /// Fallo terminal; conserva el último progreso alcanzado.
    JobFailed { error: String, progress: u8 },
    JobCancelled { progress: u8 },
    /// Se emite sobre el job fallido; el nuevo job lleva su propio `JobCreated`.
    RetryScheduled { new_job_id: Uuid, attempt: u32 },
}

impl JobEventKind {
    /// Nombre corto de la variante (logs).
    pub fn variant_name(&self) -> &'static str {
        match self {
            JobEventKind::JobCreated { .. } => "JobCreated",
            JobEventKind::JobStarted => "JobStarted",
            JobEventKind::JobProgress { .. } => "JobProgress",
            JobEventKind::JobCompleted { .. } => "JobCompleted",
            JobEventKind::JobFailed { .. } => "JobFailed",
            JobEventKind::JobCancelled { .. } => "JobCancelled",
            JobEventKind::RetryScheduled { .. } => "RetryScheduled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub seq: u64, // asignado por el store (orden global de append)
    pub job_id: Uuid,
    pub kind: JobEventKind,
    pub ts: DateTime<Utc>,
}
