//! Etapa de preparación: dos verificaciones simuladas sobre el target.

use atomera_core::{Job, JobKind, JobManager, WorkflowPatch};
use atomera_domain::{StageId, TargetInfo};
use log::info;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::context::{lock, StageContext};
use crate::error::StageError;
use crate::runner::JobRun;
use crate::synth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepReport {
    pub checks: Vec<PrepCheck>,
}

impl PrepReport {
    fn for_target(target: &TargetInfo) -> Self {
        let checks = vec![PrepCheck { name: "Geometry cleanup".into(),
                                      passed: true,
                                      detail: format!("{} residues across {} chain(s) normalised",
                                                      target.residue_count, target.chain_count) },
                          PrepCheck { name: "Coordinate consistency".into(),
                                      passed: true,
                                      detail: format!("{} atoms checked", target.atom_count) }];
        Self { checks }
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

pub struct PrepController {
    ctx: StageContext,
    jobs: JobManager,
    rng: Mutex<StdRng>,
}

impl PrepController {
    pub fn new(ctx: StageContext) -> Self {
        let rng = synth::rng_for(ctx.config.seed, StageId::Prep.index() as u64);
        Self { ctx,
               jobs: JobManager::new(StageId::Prep),
               rng: Mutex::new(rng) }
    }

    pub fn current_job(&self) -> Option<Job> {
        self.jobs.current()
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    pub async fn run(&self) -> Result<PrepReport, StageError> {
        self.ctx.ensure_unlocked(StageId::Prep)?;
        let run = JobRun::begin(&self.jobs,
                                JobKind::StructurePreparation,
                                "Prepare target structure",
                                self.ctx.pacing())?;
        self.execute(run).await
    }

    pub async fn retry(&self) -> Result<PrepReport, StageError> {
        self.ctx.ensure_unlocked(StageId::Prep)?;
        let job = self.jobs.retry()?;
        let run = JobRun::resume(&self.jobs, job, self.ctx.pacing())?;
        self.execute(run).await
    }

    async fn execute(&self, run: JobRun<'_>) -> Result<PrepReport, StageError> {
        let out = self.ctx.deadline(self.perform(&run)).await;
        if let Err(e) = &out {
            self.ctx.report_failure(StageId::Prep, &run, e, WorkflowPatch::new());
        }
        out
    }

    async fn perform(&self, run: &JobRun<'_>) -> Result<PrepReport, StageError> {
        let target = self.ctx.current_target(StageId::Prep)?;
        let plan = synth::preparation_plan(&mut *lock(&self.rng));
        run.run_plan(&plan).await?;

        // el target puede haberse descartado o sustituido mientras el job corría
        self.ctx.ensure_unlocked(StageId::Prep)?;
        self.ctx.ensure_same_target(StageId::Prep, &target)?;
        let report = PrepReport::for_target(&target);
        let status = format!("Structure prepared: {}/{} checks passed", report.passed(), report.checks.len());
        run.complete(serde_json::to_value(&report).ok(), &status)?;
        info!("prep complete target={}", target.name);
        self.ctx.publish_for_target(StageId::Prep,
                                    &target,
                                    WorkflowPatch::new().is_prep_complete(true).status(status));
        Ok(report)
    }
}

impl std::fmt::Debug for PrepController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrepController").field("jobs", &self.jobs).finish()
    }
}
