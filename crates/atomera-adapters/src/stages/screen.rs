//! Etapa de cribado virtual.
//!
//! El cribado local recorre la biblioteca en lotes y publica el resumen
//! (`screening_progress`) tras cada lote. El remoto sondea el backend a la
//! cadencia configurada. En ambos casos la finalización publica hits, flag
//! activo y resumen en una sola escritura, y cancelar los resetea también en
//! una sola escritura.

use atomera_core::{Job, JobError, JobKind, JobManager, JobUpdate, ScreeningProgress, WorkflowPatch};
use atomera_domain::{Hit, Pocket, StageId};
use log::info;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::context::{lock, StageContext};
use crate::collaborators::{JobRequest, RemoteStage, ScreeningApi};
use crate::error::StageError;
use crate::runner::JobRun;
use crate::synth::{self, SCREEN_BATCHES, SCREEN_BATCH_DELAY_MS};

/// Tamaño de la biblioteca de compuestos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySize {
    Focused,
    #[default]
    Standard,
    Extended,
    Custom(u64),
}

impl LibrarySize {
    pub fn compounds(&self) -> u64 {
        match self {
            LibrarySize::Focused => 1_000,
            LibrarySize::Standard => 10_000,
            LibrarySize::Extended => 50_000,
            LibrarySize::Custom(n) => *n,
        }
    }
}

impl FromStr for LibrarySize {
    type Err = StageError;

    /// `focused`, `standard`, `extended` o un número de compuestos.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focused" => Ok(LibrarySize::Focused),
            "standard" => Ok(LibrarySize::Standard),
            "extended" => Ok(LibrarySize::Extended),
            other => other.parse::<u64>()
                          .map(LibrarySize::Custom)
                          .map_err(|_| StageError::validation(format!("Unknown library size '{s}'"))),
        }
    }
}

/// Escala del resumen para jobs remotos: `processed` es el porcentaje.
const REMOTE_TOTAL: u64 = 100;

#[derive(Debug, Default)]
struct ScreenLocal {
    library: LibrarySize,
    /// Tamaño usado por el último cribado local; lo reutiliza `retry`.
    last_total: Option<u64>,
    remote_job_id: Option<String>,
}

pub struct ScreenController {
    ctx: StageContext,
    jobs: JobManager,
    local: Mutex<ScreenLocal>,
    rng: Mutex<StdRng>,
}

impl ScreenController {
    pub fn new(ctx: StageContext) -> Self {
        let rng = synth::rng_for(ctx.config.seed, StageId::Screen.index() as u64);
        Self { ctx,
               jobs: JobManager::new(StageId::Screen),
               local: Mutex::new(ScreenLocal::default()),
               rng: Mutex::new(rng) }
    }

    pub fn library_size(&self) -> LibrarySize {
        lock(&self.local).library
    }

    pub fn set_library_size(&self, size: LibrarySize) {
        lock(&self.local).library = size;
    }

    /// Id del último job remoto creado, si lo hubo.
    pub fn remote_job_id(&self) -> Option<String> {
        lock(&self.local).remote_job_id.clone()
    }

    pub fn current_job(&self) -> Option<Job> {
        self.jobs.current()
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    fn reset_patch() -> WorkflowPatch {
        WorkflowPatch::new().is_screening_active(false)
                            .screening_progress(ScreeningProgress::default())
    }

    /// Cancela el cribado en curso. `false` si no había uno corriendo.
    pub fn cancel(&self) -> bool {
        match self.jobs.cancel() {
            Some(job) => {
                info!("screening job {} cancelled at {}%", job.id, job.progress);
                self.ctx.store.set_state(Self::reset_patch().status("Screening cancelled"));
                true
            }
            None => false,
        }
    }

    pub async fn start(&self) -> Result<Vec<Hit>, StageError> {
        self.ctx.ensure_unlocked(StageId::Screen)?;
        let total = self.library_size().compounds();
        if total == 0 {
            return Err(StageError::validation("Library must contain at least one compound"));
        }
        let run = JobRun::begin(&self.jobs,
                                JobKind::Screening,
                                &format!("Screen {total} compounds"),
                                self.ctx.pacing())?;
        {
            let mut local = lock(&self.local);
            local.last_total = Some(total);
            local.remote_job_id = None;
        }
        self.execute_local(run, total).await
    }

    pub async fn retry(&self) -> Result<Vec<Hit>, StageError> {
        self.ctx.ensure_unlocked(StageId::Screen)?;
        let total = lock(&self.local).last_total.ok_or(StageError::Job(JobError::NoCurrentJob))?;
        let job = self.jobs.retry()?;
        let run = JobRun::resume(&self.jobs, job, self.ctx.pacing())?;
        self.execute_local(run, total).await
    }

    async fn execute_local(&self, run: JobRun<'_>, total: u64) -> Result<Vec<Hit>, StageError> {
        let out = self.ctx.deadline(self.perform_local(&run, total)).await;
        if let Err(e) = &out {
            self.ctx.report_failure(StageId::Screen, &run, e, Self::reset_patch());
        }
        out
    }

    fn selected_pocket(&self) -> Result<Pocket, StageError> {
        self.ctx
            .store
            .read(|s| s.selected_pocket.clone())
            .ok_or(StageError::GatingViolation(StageId::Screen))
    }

    /// Falla si el bolsillo seleccionado cambió desde que empezó el job.
    fn ensure_same_pocket(&self, pocket: &Pocket) -> Result<(), StageError> {
        let current = self.selected_pocket()?;
        if current.id == pocket.id {
            Ok(())
        } else {
            Err(StageError::JobFailure(format!("Selected pocket changed from {} to {} during screening",
                                               pocket.id, current.id)))
        }
    }

    fn publish_started(&self, job_id: Uuid, total: u64, pocket: &Pocket) {
        self.ctx.store.set_state(WorkflowPatch::new().is_screening_active(true)
                                                     .screening_progress(ScreeningProgress { job_id: Some(job_id),
                                                                                             processed: 0,
                                                                                             total,
                                                                                             workers: 1 })
                                                     .hits(Vec::new())
                                                     .selected_hit(None)
                                                     .interactions(None)
                                                     .status(format!("Screening against {}", pocket.id)));
    }

    fn publish_completed(&self, summary: ScreeningProgress, hits: &[Hit]) {
        let status = match hits.first() {
            Some(best) => format!("Screening complete: {} hits, best {} ({:.2} kcal/mol)",
                                  hits.len(),
                                  best.name,
                                  best.score),
            None => "Screening complete: no hits".to_string(),
        };
        self.ctx.store.set_state(WorkflowPatch::new().hits(hits.to_vec())
                                                     .is_screening_active(false)
                                                     .screening_progress(summary)
                                                     .status(status));
    }

    async fn perform_local(&self, run: &JobRun<'_>, total: u64) -> Result<Vec<Hit>, StageError> {
        let pocket = self.selected_pocket()?;
        let job_id = run.id();
        self.publish_started(job_id, total, &pocket);

        let batch = total.div_ceil(SCREEN_BATCHES).max(1);
        let mut processed = 0;
        while processed < total {
            let delay = {
                let mut rng = lock(&self.rng);
                Duration::from_millis(synth::jitter(&mut *rng, SCREEN_BATCH_DELAY_MS))
            };
            run.pacing().wait(delay).await;
            processed = (processed + batch).min(total);
            let percent = (processed * 100 / total) as u8;
            run.update(JobUpdate::progress(percent, format!("Screened {processed}/{total} compounds")))?;
            self.ensure_same_pocket(&pocket)?;
            self.ctx.store.set_state(WorkflowPatch::new().screening_progress(ScreeningProgress {
                job_id: Some(job_id),
                processed,
                total,
                workers: synth::workers_for(processed, total),
            }));
        }

        self.ensure_same_pocket(&pocket)?;
        let hits = synth::generate_hits(total, &pocket, &mut *lock(&self.rng));
        run.complete(Some(json!({ "compounds": total,
                                  "hits": hits.len(),
                                  "bestScore": hits.first().map(|h| h.score) })),
                     &format!("{} hits", hits.len()))?;
        info!("screening complete job_id={} hits={}", job_id, hits.len());
        self.publish_completed(ScreeningProgress { job_id: Some(job_id),
                                                   processed: total,
                                                   total,
                                                   workers: synth::workers_for(total, total) },
                               &hits);
        Ok(hits)
    }

    /// Cribado en el backend remoto: crea el job, sondea su etapa cada
    /// `poll_interval` y trae el resumen de resultados al terminar.
    pub async fn run_remote(&self, api: &dyn ScreeningApi, request: &JobRequest) -> Result<Vec<Hit>, StageError> {
        self.ctx.ensure_unlocked(StageId::Screen)?;
        let run = JobRun::begin(&self.jobs, JobKind::Screening, "Remote screening", self.ctx.pacing())?;
        {
            let mut local = lock(&self.local);
            local.last_total = None;
            local.remote_job_id = None;
        }
        let out = self.ctx.deadline(self.perform_remote(&run, api, request)).await;
        if let Err(e) = &out {
            self.ctx.report_failure(StageId::Screen, &run, e, Self::reset_patch());
        }
        out
    }

    async fn perform_remote(&self,
                            run: &JobRun<'_>,
                            api: &dyn ScreeningApi,
                            request: &JobRequest)
                            -> Result<Vec<Hit>, StageError> {
        let pocket = self.selected_pocket()?;
        let job_id = run.id();
        let mut remote = api.create_job(request).await?;
        let remote_id = remote.job_id.clone();
        lock(&self.local).remote_job_id = Some(remote_id.clone());
        info!("remote screening job {} submitted", remote_id);
        self.publish_started(job_id, REMOTE_TOTAL, &pocket);

        loop {
            let stage = remote.status;
            // un job fallido conserva el último progreso alcanzado
            if stage == RemoteStage::Error {
                let reason = remote.message.clone().unwrap_or_else(|| stage.message().to_string());
                return Err(StageError::JobFailure(reason));
            }
            run.update(JobUpdate::progress(stage.progress(), stage.message()))?;
            self.ensure_same_pocket(&pocket)?;
            if stage == RemoteStage::Done {
                break;
            }
            self.ctx.store.set_state(WorkflowPatch::new().screening_progress(ScreeningProgress {
                job_id: Some(job_id),
                processed: u64::from(stage.progress()),
                total: REMOTE_TOTAL,
                workers: 1,
            }));
            tokio::time::sleep(self.ctx.config.poll_interval).await;
            remote = api.job_status(&remote_id).await?;
        }

        let summary = api.results(&remote_id).await?;
        run.ensure_active()?;
        let mut hits = summary.hits();
        for hit in &mut hits {
            if let Some(pose) = hit.pose.as_mut() {
                pose.pocket_id = pocket.id.clone();
            }
        }
        run.complete(Some(json!({ "remoteJobId": remote_id, "hits": hits.len() })),
                     &format!("{} hits", hits.len()))?;
        self.publish_completed(ScreeningProgress { job_id: Some(job_id),
                                                   processed: REMOTE_TOTAL,
                                                   total: REMOTE_TOTAL,
                                                   workers: 1 },
                               &hits);
        Ok(hits)
    }
}

impl std::fmt::Debug for ScreenController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenController")
         .field("library", &self.library_size())
         .field("jobs", &self.jobs)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_sizes() {
        assert_eq!(LibrarySize::Focused.compounds(), 1_000);
        assert_eq!(LibrarySize::default().compounds(), 10_000);
        assert_eq!(LibrarySize::Extended.compounds(), 50_000);
        assert_eq!(LibrarySize::Custom(42).compounds(), 42);
    }

    #[test]
    fn library_size_parses_names_and_counts() {
        assert_eq!("Extended".parse::<LibrarySize>(), Ok(LibrarySize::Extended));
        assert_eq!("2500".parse::<LibrarySize>(), Ok(LibrarySize::Custom(2500)));
        assert!("huge".parse::<LibrarySize>().is_err());
    }
}
