//! `Workbench`: conecta los seis controladores a un único store y visor.

use atomera_core::{Job, WorkflowPatch, WorkflowStore};
use atomera_domain::StageId;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::collaborators::{PickedAtom, Viewer};
use crate::config::WorkbenchConfig;
use crate::error::StageError;
use crate::stages::{HitsController, InteractionsController, PocketController, PrepController, ScreenController,
                    StageContext, TargetController};

/// Vista uniforme sobre el controlador de una etapa.
#[derive(Debug, Clone, Copy)]
pub enum StageController<'a> {
    Target(&'a TargetController),
    Prep(&'a PrepController),
    Pocket(&'a PocketController),
    Screen(&'a ScreenController),
    Hits(&'a HitsController),
    Interactions(&'a InteractionsController),
}

impl StageController<'_> {
    pub fn id(&self) -> StageId {
        match self {
            StageController::Target(_) => StageId::Target,
            StageController::Prep(_) => StageId::Prep,
            StageController::Pocket(_) => StageId::Pocket,
            StageController::Screen(_) => StageId::Screen,
            StageController::Hits(_) => StageId::Hits,
            StageController::Interactions(_) => StageId::Interactions,
        }
    }

    /// Job actual de la etapa. Hits e Interactions no ejecutan jobs.
    pub fn current_job(&self) -> Option<Job> {
        match self {
            StageController::Target(c) => c.current_job(),
            StageController::Prep(c) => c.current_job(),
            StageController::Pocket(c) => c.current_job(),
            StageController::Screen(c) => c.current_job(),
            StageController::Hits(_) | StageController::Interactions(_) => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_job().is_some_and(|j| j.is_active())
    }
}

pub struct Workbench {
    ctx: StageContext,
    target: Arc<TargetController>,
    prep: Arc<PrepController>,
    pocket: Arc<PocketController>,
    screen: Arc<ScreenController>,
    hits: Arc<HitsController>,
    interactions: Arc<InteractionsController>,
}

impl Workbench {
    pub fn new(viewer: Arc<dyn Viewer>, config: WorkbenchConfig) -> Self {
        Self::with_store(WorkflowStore::new(), viewer, config)
    }

    pub fn with_store(store: WorkflowStore, viewer: Arc<dyn Viewer>, config: WorkbenchConfig) -> Self {
        let ctx = StageContext::new(store, viewer, config);
        info!("workbench session {} started", ctx.session_id);
        Self { target: Arc::new(TargetController::new(ctx.clone())),
               prep: Arc::new(PrepController::new(ctx.clone())),
               pocket: Arc::new(PocketController::new(ctx.clone())),
               screen: Arc::new(ScreenController::new(ctx.clone())),
               hits: Arc::new(HitsController::new(ctx.clone())),
               interactions: Arc::new(InteractionsController::new(ctx.clone())),
               ctx }
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.ctx.store
    }

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    pub fn target(&self) -> &Arc<TargetController> {
        &self.target
    }

    pub fn prep(&self) -> &Arc<PrepController> {
        &self.prep
    }

    pub fn pocket(&self) -> &Arc<PocketController> {
        &self.pocket
    }

    pub fn screen(&self) -> &Arc<ScreenController> {
        &self.screen
    }

    pub fn hits(&self) -> &Arc<HitsController> {
        &self.hits
    }

    pub fn interactions(&self) -> &Arc<InteractionsController> {
        &self.interactions
    }

    pub fn stage(&self, id: StageId) -> StageController<'_> {
        match id {
            StageId::Target => StageController::Target(&self.target),
            StageId::Prep => StageController::Prep(&self.prep),
            StageId::Pocket => StageController::Pocket(&self.pocket),
            StageId::Screen => StageController::Screen(&self.screen),
            StageId::Hits => StageController::Hits(&self.hits),
            StageId::Interactions => StageController::Interactions(&self.interactions),
        }
    }

    pub fn active_stage(&self) -> StageController<'_> {
        self.stage(self.ctx.store.read(|s| s.active_section))
    }

    /// Navega a `stage`; una etapa bloqueada se rechaza sin notificar.
    pub fn switch_section(&self, stage: StageId) -> Result<(), StageError> {
        Ok(self.ctx.store.switch_section(stage)?)
    }

    /// Activa el modo picking: cada átomo elegido se informa en la barra de estado.
    pub fn enable_picking(&self) {
        let store = self.ctx.store.clone();
        self.ctx.viewer.set_pick_handler(Some(Arc::new(move |atom: PickedAtom| {
                                           store.set_state(WorkflowPatch::new().status(format!("Picked {} {} (atom {})",
                                                                                             atom.residue,
                                                                                             atom.atom_name,
                                                                                             atom.serial)));
                                       })));
    }

    pub fn disable_picking(&self) {
        self.ctx.viewer.set_pick_handler(None);
    }

    /// Sesión exportada con huella de contenido.
    pub fn export_session(&self) -> Result<Value, StageError> {
        Ok(self.ctx.store.export_session()?)
    }

    /// Cancela los jobs de todas las etapas, vacía el estado compartido y
    /// limpia el visor. Un job cancelado ya no puede escribir en el store.
    pub fn reset(&self) {
        for jobs in [self.target.jobs(), self.prep.jobs(), self.pocket.jobs()] {
            if let Some(job) = jobs.cancel() {
                info!("job {} of stage {} cancelled by reset", job.id, jobs.stage());
            }
        }
        self.screen.cancel();
        self.ctx.store.reset_state();
        if let Err(e) = self.ctx.viewer.clear_viewer() {
            warn!("viewer clear failed: {}", e);
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench").field("ctx", &self.ctx).finish_non_exhaustive()
    }
}
