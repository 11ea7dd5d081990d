//! Etapa Pocket: detección simulada de bolsillos y selección de uno.

use atomera_core::{Job, JobKind, JobManager, WorkflowPatch};
use atomera_domain::{Pocket, StageId};
use log::info;
use rand::rngs::StdRng;
use serde_json::json;
use std::sync::Mutex;

use super::context::{lock, StageContext};
use crate::error::StageError;
use crate::runner::JobRun;
use crate::synth;

pub struct PocketController {
    ctx: StageContext,
    jobs: JobManager,
    rng: Mutex<StdRng>,
}

impl PocketController {
    pub fn new(ctx: StageContext) -> Self {
        let rng = synth::rng_for(ctx.config.seed, StageId::Pocket.index() as u64);
        Self { ctx,
               jobs: JobManager::new(StageId::Pocket),
               rng: Mutex::new(rng) }
    }

    pub fn current_job(&self) -> Option<Job> {
        self.jobs.current()
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    pub fn pockets(&self) -> Vec<Pocket> {
        self.ctx.store.read(|s| s.pockets.clone())
    }

    pub async fn detect(&self) -> Result<Vec<Pocket>, StageError> {
        self.ctx.ensure_unlocked(StageId::Pocket)?;
        let run = JobRun::begin(&self.jobs, JobKind::PocketDetection, "Detect binding pockets", self.ctx.pacing())?;
        self.execute(run).await
    }

    pub async fn retry(&self) -> Result<Vec<Pocket>, StageError> {
        self.ctx.ensure_unlocked(StageId::Pocket)?;
        let job = self.jobs.retry()?;
        let run = JobRun::resume(&self.jobs, job, self.ctx.pacing())?;
        self.execute(run).await
    }

    async fn execute(&self, run: JobRun<'_>) -> Result<Vec<Pocket>, StageError> {
        let out = self.ctx.deadline(self.perform(&run)).await;
        if let Err(e) = &out {
            self.ctx.report_failure(StageId::Pocket, &run, e, WorkflowPatch::new());
        }
        out
    }

    async fn perform(&self, run: &JobRun<'_>) -> Result<Vec<Pocket>, StageError> {
        let target = self.ctx.current_target(StageId::Pocket)?;
        let plan = synth::pocket_detection_plan(&mut *lock(&self.rng));
        run.run_plan(&plan).await?;

        self.ctx.ensure_unlocked(StageId::Pocket)?;
        self.ctx.ensure_same_target(StageId::Pocket, &target)?;
        let pockets = synth::generate_pockets(&target, &mut *lock(&self.rng));
        let status = match pockets.first() {
            Some(best) => format!("Detected {} pockets; best {} (score {:.2})", pockets.len(), best.id, best.score),
            None => "No pockets detected".to_string(),
        };
        run.complete(Some(json!({ "pockets": pockets.len() })), &status)?;
        info!("pocket detection found {} pockets", pockets.len());
        self.ctx.publish_for_target(StageId::Pocket,
                                    &target,
                                    WorkflowPatch::new().pockets(pockets.clone())
                                                        .selected_pocket(None)
                                                        .clear_after_pocket()
                                                        .status(status));
        Ok(pockets)
    }

    /// Selecciona el bolsillo `index` (0-based) de la lista publicada.
    ///
    /// Elegir un bolsillo distinto descarta el cribado y los hits previos.
    pub fn select_pocket(&self, index: usize) -> Result<Pocket, StageError> {
        self.ctx.ensure_unlocked(StageId::Pocket)?;
        let (pocket, same) = self.ctx.store.read(|s| {
                                               let pocket = s.pockets.get(index).cloned();
                                               let same = match (&pocket, &s.selected_pocket) {
                                                   (Some(p), Some(cur)) => p.id == cur.id,
                                                   _ => false,
                                               };
                                               (pocket, same)
                                           });
        let pocket = pocket.ok_or_else(|| {
                               StageError::validation(format!("Pocket index {index} out of range ({} pockets)",
                                                              self.pockets().len()))
                           })?;
        let mut patch = WorkflowPatch::new().selected_pocket(Some(pocket.clone()));
        if !same {
            patch = patch.clear_after_pocket();
        }
        self.ctx
            .store
            .set_state(patch.status(format!("Selected {} (rank {}, score {:.2})", pocket.id, pocket.rank, pocket.score)));
        if let Err(e) = self.ctx.viewer.highlight_pocket(&pocket) {
            self.ctx.report_collaborator_error(StageId::Pocket, &e.into());
        }
        Ok(pocket)
    }

    pub fn select_pocket_by_id(&self, id: &str) -> Result<Pocket, StageError> {
        let index = self.ctx
                        .store
                        .read(|s| s.pockets.iter().position(|p| p.id == id))
                        .ok_or_else(|| StageError::validation(format!("Unknown pocket '{id}'")))?;
        self.select_pocket(index)
    }
}

impl std::fmt::Debug for PocketController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketController").field("jobs", &self.jobs).finish()
    }
}
