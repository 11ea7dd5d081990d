use atomera_core::{WorkflowPatch, WorkflowStore};
use atomera_domain::{StageId, TargetInfo};
use log::warn;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::collaborators::Viewer;
use crate::config::WorkbenchConfig;
use crate::error::StageError;
use crate::runner::{with_deadline, JobRun, Pacing};

/// Estado local de los controladores; un panic ajeno no lo invalida.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Dependencias comunes a todas las etapas.
#[derive(Clone)]
pub struct StageContext {
    pub store: WorkflowStore,
    pub viewer: Arc<dyn Viewer>,
    pub config: WorkbenchConfig,
    /// Identifica la sesión en los registros de procedencia.
    pub session_id: Uuid,
}

impl StageContext {
    pub fn new(store: WorkflowStore, viewer: Arc<dyn Viewer>, config: WorkbenchConfig) -> Self {
        Self { store,
               viewer,
               config,
               session_id: Uuid::new_v4() }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::new(self.config.time_scale)
    }

    pub fn ensure_unlocked(&self, stage: StageId) -> Result<(), StageError> {
        if self.store.is_unlocked(stage) {
            Ok(())
        } else {
            Err(StageError::GatingViolation(stage))
        }
    }

    /// Target publicado; sin target la etapa `stage` está bloqueada.
    pub(crate) fn current_target(&self, stage: StageId) -> Result<TargetInfo, StageError> {
        self.store.read(|s| s.target.clone()).ok_or(StageError::GatingViolation(stage))
    }

    /// Falla si el target publicado ya no es el que había al iniciar el job.
    pub(crate) fn ensure_same_target(&self, stage: StageId, started: &TargetInfo) -> Result<(), StageError> {
        let current = self.current_target(stage)?;
        if current == *started {
            Ok(())
        } else {
            Err(StageError::JobFailure(format!("Target changed from {} to {} during {}",
                                               started.name,
                                               current.name,
                                               stage.title().to_lowercase())))
        }
    }

    /// Publica `patch` sólo si `started` sigue siendo el target actual.
    pub(crate) fn publish_for_target(&self, stage: StageId, started: &TargetInfo, patch: WorkflowPatch) -> bool {
        let published = self.store.set_state_if(|s| s.target.as_ref() == Some(started), patch);
        if !published {
            warn!("stage {} result discarded: target {} replaced", stage, started.name);
        }
        published
    }

    pub(crate) async fn deadline<T, F>(&self, fut: F) -> Result<T, StageError>
        where F: Future<Output = Result<T, StageError>>
    {
        with_deadline(self.config.job_timeout, fut).await
    }

    /// Cierra un job fallido y publica el error en `status_message`.
    ///
    /// `extra` se fusiona en la misma escritura (p.ej. para resetear el
    /// resumen del cribado). Nada se publica si el job ya no es el actual o
    /// si el error es silencioso.
    pub(crate) fn report_failure(&self, stage: StageId, run: &JobRun<'_>, err: &StageError, extra: WorkflowPatch) {
        if matches!(err, StageError::Cancelled) {
            return;
        }
        if run.fail(err).is_none() {
            return;
        }
        warn!("stage {} job {} failed: {}", stage, run.id(), err);
        let patch = if err.is_silent() { extra } else { extra.status(format!("{} failed: {}", stage.title(), err)) };
        if !patch.is_empty() {
            self.store.set_state(patch);
        }
    }

    /// Error de colaborador fuera de un job: sólo se informa.
    pub(crate) fn report_collaborator_error(&self, stage: StageId, err: &StageError) {
        warn!("stage {} collaborator error: {}", stage, err);
        self.store.set_state(WorkflowPatch::new().status(format!("{}: {}", stage.title(), err)));
    }
}

impl std::fmt::Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
         .field("store", &self.store)
         .field("config", &self.config)
         .field("session_id", &self.session_id)
         .finish()
    }
}
