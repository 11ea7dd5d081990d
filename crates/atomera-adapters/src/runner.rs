//! Ejecución asíncrona de jobs sobre un `JobManager`.
//!
//! `JobRun` es el único camino por el que una etapa avanza un job: cada
//! checkpoint espera su `delay` (escalado por `Pacing`) y luego se aplica con
//! `update_job`, que falla si el job fue cancelado o reemplazado. Así ningún
//! timer pendiente puede escribir sobre un job que ya no es el actual.

use atomera_core::{Checkpoint, CheckpointPlan, Job, JobKind, JobManager, JobUpdate};
use log::{debug, warn};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::error::StageError;

/// Escala de tiempo de las esperas simuladas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub time_scale: f64,
}

impl Pacing {
    pub fn new(time_scale: f64) -> Self {
        Self { time_scale: if time_scale.is_finite() { time_scale.max(0.0) } else { 1.0 } }
    }

    pub fn scaled(&self, nominal: Duration) -> Duration {
        nominal.mul_f64(self.time_scale)
    }

    /// Espera `nominal * time_scale`. Con escala 0 sólo cede el turno, de modo
    /// que la cancelación sigue observándose entre checkpoints.
    pub async fn wait(&self, nominal: Duration) {
        let d = self.scaled(nominal);
        if d.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(d).await;
        }
    }
}

pub struct JobRun<'a> {
    jobs: &'a JobManager,
    job: Job,
    pacing: Pacing,
}

impl<'a> JobRun<'a> {
    /// Crea y arranca un job nuevo.
    pub fn begin(jobs: &'a JobManager, kind: JobKind, description: &str, pacing: Pacing) -> Result<Self, StageError> {
        let job = jobs.create_job(kind, description)?;
        Self::resume(jobs, job, pacing)
    }

    /// Arranca un job ya creado (p.ej. el que devuelve `JobManager::retry`).
    pub fn resume(jobs: &'a JobManager, job: Job, pacing: Pacing) -> Result<Self, StageError> {
        let job = jobs.start_job(job.id)?;
        debug!("job run started stage={} job_id={} attempt={}", jobs.stage(), job.id, job.attempt);
        Ok(Self { jobs, job, pacing })
    }

    pub fn id(&self) -> Uuid {
        self.job.id
    }

    pub fn attempt(&self) -> u32 {
        self.job.attempt
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub async fn checkpoint(&self, checkpoint: &Checkpoint) -> Result<Job, StageError> {
        self.pacing.wait(checkpoint.delay).await;
        self.update(JobUpdate::progress(checkpoint.progress, checkpoint.message.clone()))
    }

    pub async fn run_plan(&self, plan: &CheckpointPlan) -> Result<(), StageError> {
        for cp in plan {
            self.checkpoint(cp).await?;
        }
        Ok(())
    }

    /// Aplica un avance arbitrario (p.ej. el reportado por el backend remoto).
    pub fn update(&self, update: JobUpdate) -> Result<Job, StageError> {
        Ok(self.jobs.update_job(self.job.id, update)?)
    }

    pub fn ensure_active(&self) -> Result<(), StageError> {
        Ok(self.jobs.ensure_active(self.job.id)?)
    }

    pub fn complete(&self, result: Option<Value>, message: &str) -> Result<Job, StageError> {
        Ok(self.jobs.complete_job(self.job.id, result, message)?)
    }

    /// Marca el job como fallido. `None` si ya no es el job actual o no está
    /// en curso (cancelado, reemplazado).
    pub fn fail(&self, error: &StageError) -> Option<Job> {
        match self.jobs.fail_job(self.job.id, &error.to_string()) {
            Ok(job) => Some(job),
            Err(e) => {
                debug!("fail ignored job_id={} reason={}", self.job.id, e);
                None
            }
        }
    }
}

/// Aplica el deadline configurado a `fut`.
pub async fn with_deadline<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, StageError>
    where F: Future<Output = Result<T, StageError>>
{
    match timeout {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(out) => out,
            Err(_) => {
                warn!("job exceeded deadline of {}s", limit.as_secs());
                Err(StageError::TimedOut(limit.as_secs()))
            }
        },
    }
}
