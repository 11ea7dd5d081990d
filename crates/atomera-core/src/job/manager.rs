//! `JobManager`: máquina de estados del job actual de una etapa.
//!
//! Invariantes:
//! - Como máximo un job no terminal por manager (`create_job` rechaza
//!   `AlreadyRunning` mientras el actual esté `pending` o `running`).
//! - Toda mutación nombra el `job_id` al que pertenece; si ya no es el job
//!   actual se rechaza con `JobError::Stale` sin tocar nada. Así un timer
//!   huérfano de un job reemplazado no puede escribir progreso.
//! - Los jobs terminales no se resucitan: `retry` crea uno nuevo.
use atomera_domain::StageId;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Job, JobKind, JobStatus, JobUpdate};
use crate::constants::MAX_PROGRESS;
use crate::errors::JobError;
use crate::event::{InMemoryJobEventStore, JobEvent, JobEventKind, JobEventStore};
use crate::store::lock;

struct Inner<E> {
    current: Option<Uuid>,
    history: Vec<Job>,
    events: E,
}

impl<E: JobEventStore> Inner<E> {
    fn job_mut(&mut self, id: Uuid) -> Option<&mut Job> {
        self.history.iter_mut().rev().find(|j| j.id == id)
    }

    /// Devuelve el job actual si coincide con `id`.
    fn current_mut(&mut self, id: Uuid) -> Result<&mut Job, JobError> {
        match self.current {
            None => Err(JobError::NoCurrentJob),
            Some(cur) if cur != id => Err(JobError::Stale { job_id: id }),
            Some(_) => self.job_mut(id).ok_or(JobError::NoCurrentJob),
        }
    }

    fn transition(&mut self, id: Uuid, next: JobStatus) -> Result<&mut Job, JobError> {
        let job = self.current_mut(id)?;
        if job.status == JobStatus::Cancelled && next != JobStatus::Cancelled {
            return Err(JobError::Cancelled { job_id: id });
        }
        if !job.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition { from: job.status,
                                                     to: next });
        }
        job.status = next;
        Ok(job)
    }
}

pub struct JobManager<E: JobEventStore = InMemoryJobEventStore> {
    stage: StageId,
    inner: Mutex<Inner<E>>,
}

impl JobManager<InMemoryJobEventStore> {
    /// Manager con registro de eventos en memoria.
    pub fn new(stage: StageId) -> Self {
        Self::with_store(stage, InMemoryJobEventStore::default())
    }
}

impl<E: JobEventStore> JobManager<E> {
    pub fn with_store(stage: StageId, events: E) -> Self {
        Self { stage,
               inner: Mutex::new(Inner { current: None,
                                         history: Vec::new(),
                                         events }) }
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// Crea un job `pending` y lo expone como job actual de la etapa.
    pub fn create_job(&self, kind: JobKind, description: &str) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        if let Some(cur) = inner.current.and_then(|id| inner.history.iter().find(|j| j.id == id)) {
            if cur.is_active() {
                return Err(JobError::AlreadyRunning { job_id: cur.id,
                                                      status: cur.status });
            }
        }
        let job = Job::new(kind, description, 1);
        Self::record(&mut inner, job.id, JobEventKind::JobCreated { kind,
                                                                     description: description.to_string(),
                                                                     attempt: 1 });
        debug!("create_job stage={} job_id={} kind={}", self.stage, job.id, kind);
        inner.current = Some(job.id);
        inner.history.push(job.clone());
        Ok(job)
    }

    /// `pending` -> `running`; fija `start_time`.
    pub fn start_job(&self, id: Uuid) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        let job = inner.transition(id, JobStatus::Running)?;
        job.start_time = Some(Utc::now());
        let snapshot = job.clone();
        Self::record(&mut inner, id, JobEventKind::JobStarted);
        debug!("start_job stage={} job_id={}", self.stage, id);
        Ok(snapshot)
    }

    /// Aplica un checkpoint al job actual. El progreso nunca retrocede.
    pub fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        let job = inner.current_mut(id)?;
        match job.status {
            JobStatus::Running => {}
            JobStatus::Cancelled => return Err(JobError::Cancelled { job_id: id }),
            other => {
                return Err(JobError::InvalidTransition { from: other,
                                                         to: JobStatus::Running })
            }
        }
        if let Some(p) = update.progress {
            job.progress = job.progress.max(p.min(MAX_PROGRESS));
        }
        if let Some(m) = update.message {
            job.message = m;
        }
        let snapshot = job.clone();
        Self::record(&mut inner,
                     id,
                     JobEventKind::JobProgress { progress: snapshot.progress,
                                                 message: snapshot.message.clone() });
        Ok(snapshot)
    }

    /// Marca el job como `complete` con progreso 100.
    pub fn complete_job(&self, id: Uuid, result: Option<Value>, message: &str) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        let job = inner.transition(id, JobStatus::Complete)?;
        job.progress = MAX_PROGRESS;
        job.end_time = Some(Utc::now());
        job.result = result;
        job.message = message.to_string();
        let snapshot = job.clone();
        Self::record(&mut inner, id, JobEventKind::JobCompleted { message: message.to_string() });
        debug!("complete_job stage={} job_id={}", self.stage, id);
        Ok(snapshot)
    }

    /// Marca el job como `failed` conservando el último progreso.
    pub fn fail_job(&self, id: Uuid, error: &str) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        let job = inner.transition(id, JobStatus::Failed)?;
        job.end_time = Some(Utc::now());
        job.error = Some(error.to_string());
        job.message = error.to_string();
        let snapshot = job.clone();
        Self::record(&mut inner,
                     id,
                     JobEventKind::JobFailed { error: error.to_string(),
                                               progress: snapshot.progress });
        warn!("job failed stage={} job_id={} error={}", self.stage, id, error);
        Ok(snapshot)
    }

    /// Cancela el job actual sólo si está `running`. En cualquier otro caso
    /// no hace nada y devuelve `None`.
    pub fn cancel(&self) -> Option<Job> {
        let mut inner = lock(&self.inner);
        let id = inner.current?;
        let job = inner.job_mut(id)?;
        if job.status != JobStatus::Running {
            debug!("cancel ignored stage={} job_id={} status={}", self.stage, id, job.status);
            return None;
        }
        job.status = JobStatus::Cancelled;
        job.end_time = Some(Utc::now());
        job.message = "Cancelled".to_string();
        let snapshot = job.clone();
        Self::record(&mut inner, id, JobEventKind::JobCancelled { progress: snapshot.progress });
        debug!("cancel stage={} job_id={}", self.stage, id);
        Some(snapshot)
    }

    /// Crea un job nuevo del mismo tipo a partir del job actual fallido.
    pub fn retry(&self) -> Result<Job, JobError> {
        let mut inner = lock(&self.inner);
        let id = inner.current.ok_or(JobError::NoCurrentJob)?;
        let failed = inner.job_mut(id).ok_or(JobError::NoCurrentJob)?.clone();
        if failed.status != JobStatus::Failed {
            return Err(JobError::NotRetryable { status: failed.status });
        }
        let job = Job::new(failed.kind, &failed.description, failed.attempt + 1);
        Self::record(&mut inner,
                     failed.id,
                     JobEventKind::RetryScheduled { new_job_id: job.id,
                                                    attempt: job.attempt });
        Self::record(&mut inner,
                     job.id,
                     JobEventKind::JobCreated { kind: job.kind,
                                                description: job.description.clone(),
                                                attempt: job.attempt });
        debug!("retry stage={} previous={} job_id={} attempt={}", self.stage, failed.id, job.id, job.attempt);
        inner.current = Some(job.id);
        inner.history.push(job.clone());
        Ok(job)
    }

    /// Comprueba que `id` sigue siendo el job actual y está `running`.
    pub fn ensure_active(&self, id: Uuid) -> Result<(), JobError> {
        let mut inner = lock(&self.inner);
        let job = inner.current_mut(id)?;
        match job.status {
            JobStatus::Running => Ok(()),
            JobStatus::Cancelled => Err(JobError::Cancelled { job_id: id }),
            other => Err(JobError::InvalidTransition { from: other,
                                                       to: JobStatus::Running }),
        }
    }

    pub fn current(&self) -> Option<Job> {
        let inner = lock(&self.inner);
        let id = inner.current?;
        inner.history.iter().rev().find(|j| j.id == id).cloned()
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        lock(&self.inner).history.iter().find(|j| j.id == id).cloned()
    }

    /// `true` si hay un job `pending` o `running`.
    pub fn is_busy(&self) -> bool {
        self.current().map(|j| j.is_active()).unwrap_or(false)
    }

    /// Historial de jobs (orden de creación).
    pub fn history(&self) -> Vec<Job> {
        lock(&self.inner).history.clone()
    }

    pub fn events(&self) -> Vec<JobEvent> {
        lock(&self.inner).events.list_all()
    }

    pub fn events_for(&self, id: Uuid) -> Vec<JobEvent> {
        lock(&self.inner).events.list(id)
    }

    fn record(inner: &mut Inner<E>, id: Uuid, kind: JobEventKind) {
        let _ = inner.events.append_kind(id, kind);
    }
}

impl<E: JobEventStore> std::fmt::Debug for JobManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
         .field("stage", &self.stage)
         .field("current", &self.current().map(|j| (j.id, j.status)))
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(manager: &JobManager) -> Job {
        let job = manager.create_job(JobKind::PocketDetection, "detect").unwrap();
        manager.start_job(job.id).unwrap()
    }

    #[test]
    fn create_rejects_second_active_job() {
        let m = JobManager::new(StageId::Pocket);
        let job = m.create_job(JobKind::PocketDetection, "detect").unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        let err = m.create_job(JobKind::PocketDetection, "again").unwrap_err();
        assert!(matches!(err, JobError::AlreadyRunning { job_id, .. } if job_id == job.id));
    }

    #[test]
    fn complete_sets_full_progress_and_end_time() {
        let m = JobManager::new(StageId::Pocket);
        let job = running(&m);
        m.update_job(job.id, JobUpdate::progress(40, "half")).unwrap();
        let done = m.complete_job(job.id, Some(serde_json::json!({"pockets": 3})), "done").unwrap();
        assert_eq!(done.status, JobStatus::Complete);
        assert_eq!(done.progress, 100);
        assert!(done.end_time.is_some());
        assert!(m.create_job(JobKind::PocketDetection, "next").is_ok());
    }

    #[test]
    fn fail_preserves_progress_and_retry_creates_new_job() {
        let m = JobManager::new(StageId::Pocket);
        let job = running(&m);
        m.update_job(job.id, JobUpdate::progress(55, "scoring")).unwrap();
        let failed = m.fail_job(job.id, "boom").unwrap();
        assert_eq!(failed.progress, 55);
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let retried = m.retry().unwrap();
        assert_ne!(retried.id, job.id);
        assert_eq!(retried.kind, JobKind::PocketDetection);
        assert_eq!(retried.attempt, 2);
        assert_eq!(retried.status, JobStatus::Pending);
        assert_eq!(m.get(job.id).unwrap().status, JobStatus::Failed);
        assert_eq!(m.history().len(), 2);
    }

    #[test]
    fn cancel_only_applies_to_running_jobs() {
        let m = JobManager::new(StageId::Screen);
        assert!(m.cancel().is_none());
        let job = m.create_job(JobKind::Screening, "screen").unwrap();
        assert!(m.cancel().is_none(), "pending job must not be cancellable");
        m.start_job(job.id).unwrap();
        let cancelled = m.cancel().unwrap();
        assert_eq!(cancelled.status, JobStatus::Cancelled);
        assert!(m.cancel().is_none(), "terminal job must not be cancelled twice");
        assert_eq!(m.update_job(job.id, JobUpdate::progress(90, "late")).unwrap_err(),
                   JobError::Cancelled { job_id: job.id });
        assert!(matches!(m.complete_job(job.id, None, "late").unwrap_err(), JobError::Cancelled { .. }));
        assert!(matches!(m.retry().unwrap_err(), JobError::NotRetryable { status: JobStatus::Cancelled }));
    }

    #[test]
    fn stale_job_cannot_write() {
        let m = JobManager::new(StageId::Pocket);
        let old = running(&m);
        m.fail_job(old.id, "first attempt").unwrap();
        let new = m.retry().unwrap();
        assert_eq!(m.update_job(old.id, JobUpdate::message("stale")).unwrap_err(),
                   JobError::Stale { job_id: old.id });
        assert!(m.ensure_active(old.id).is_err());
        assert_eq!(m.current().unwrap().id, new.id);
    }

    #[test]
    fn update_without_job_is_a_noop() {
        let m = JobManager::new(StageId::Prep);
        assert_eq!(m.update_job(Uuid::new_v4(), JobUpdate::message("x")).unwrap_err(), JobError::NoCurrentJob);
        assert!(m.history().is_empty());
        assert!(m.events().is_empty());
    }

    #[test]
    fn events_follow_transitions() {
        let m = JobManager::new(StageId::Prep);
        let job = running(&m);
        m.update_job(job.id, JobUpdate::progress(10, "a")).unwrap();
        m.complete_job(job.id, None, "ok").unwrap();
        let names: Vec<&str> = m.events_for(job.id).iter().map(|e| e.kind.variant_name()).collect();
        assert_eq!(names, vec!["JobCreated", "JobStarted", "JobProgress", "JobCompleted"]);
    }
}
