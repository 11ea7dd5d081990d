use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{JobKind, JobStatus};

/// Job rastreado por un `JobManager`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub description: String,
    pub status: JobStatus,
    /// 0..=100
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Descripción legible del paso actual.
    pub message: String,
    pub result: Option<Value>,
    pub error: Option<String>,
    /// 1 para la primera ejecución, +1 por cada reintento.
    pub attempt: u32,
}

impl Job {
    pub(crate) fn new(kind: JobKind, description: &str, attempt: u32) -> Self {
        Self { id: Uuid::new_v4(),
               kind,
               description: description.to_string(),
               status: JobStatus::Pending,
               progress: 0,
               created_at: Utc::now(),
               start_time: None,
               end_time: None,
               message: description.to_string(),
               result: None,
               error: None,
               attempt }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Duración en milisegundos si el job arrancó.
    pub fn elapsed_ms(&self) -> Option<i64> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or_else(Utc::now);
        Some((end - start).num_milliseconds())
    }
}

/// Cambios parciales aplicables al job actual.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobUpdate {
    pub progress: Option<u8>,
    pub message: Option<String>,
}

impl JobUpdate {
    pub fn progress(progress: u8, message: impl Into<String>) -> Self {
        Self { progress: Some(progress),
               message: Some(message.into()) }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { progress: None,
               message: Some(message.into()) }
    }
}
