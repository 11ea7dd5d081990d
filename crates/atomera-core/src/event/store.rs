use chrono::Utc;
use uuid::Uuid;

use super::{JobEvent, JobEventKind};

/// Almacenamiento de eventos append-only.
pub trait JobEventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, job_id: Uuid, kind: JobEventKind) -> JobEvent;
    /// Lista eventos de un job (orden ascendente por seq).
    fn list(&self, job_id: Uuid) -> Vec<JobEvent>;
    /// Todos los eventos en orden de append.
    fn list_all(&self) -> Vec<JobEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryJobEventStore {
    inner: Vec<JobEvent>,
}

impl JobEventStore for InMemoryJobEventStore {
    fn append_kind(&mut self, job_id: Uuid, kind: JobEventKind) -> JobEvent {
        let seq = self.inner.len() as u64;
        let ev = JobEvent { seq,
                            job_id,
                            kind,
                            ts: Utc::now() };
        self.inner.push(ev.clone());
        ev
    }

    fn list(&self, job_id: Uuid) -> Vec<JobEvent> {
        self.inner.iter().filter(|e| e.job_id == job_id).cloned().collect()
    }

    fn list_all(&self) -> Vec<JobEvent> {
        self.inner.clone()
    }
}
