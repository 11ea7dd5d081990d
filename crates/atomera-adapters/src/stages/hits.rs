//! Etapa Hits: listado (ya ordenado) y selección de un hit.

use atomera_core::WorkflowPatch;
use atomera_domain::{Hit, Interactions, StageId};
use rand::rngs::StdRng;
use std::sync::Mutex;

use super::context::{lock, StageContext};
use crate::collaborators::ScreeningApi;
use crate::error::StageError;
use crate::synth;

/// Proyección de sólo lectura para la vista de hits.
#[derive(Debug, Clone, PartialEq)]
pub struct HitsView {
    pub hits: Vec<Hit>,
    pub selected: Option<String>,
    pub screening_active: bool,
}

pub struct HitsController {
    ctx: StageContext,
    rng: Mutex<StdRng>,
}

impl HitsController {
    pub fn new(ctx: StageContext) -> Self {
        let rng = synth::rng_for(ctx.config.seed, StageId::Hits.index() as u64);
        Self { ctx,
               rng: Mutex::new(rng) }
    }

    pub fn view(&self) -> HitsView {
        self.ctx.store.read(|s| HitsView { hits: s.hits.clone(),
                                           selected: s.selected_hit.clone(),
                                           screening_active: s.is_screening_active })
    }

    fn find_hit(&self, hit_id: &str) -> Result<Hit, StageError> {
        self.ctx
            .store
            .read(|s| s.hit(hit_id).cloned())
            .ok_or_else(|| StageError::validation(format!("Unknown hit '{hit_id}'")))
    }

    /// Selecciona un hit y publica sus interacciones (sintéticas).
    pub fn select_hit(&self, hit_id: &str) -> Result<Interactions, StageError> {
        self.ctx.ensure_unlocked(StageId::Hits)?;
        let hit = self.find_hit(hit_id)?;
        let pool = self.ctx.store.read(|s| {
                                     let pose_pocket = hit.pose.as_ref().map(|p| p.pocket_id.as_str());
                                     s.selected_pocket
                                      .iter()
                                      .chain(s.pockets.iter())
                                      .find(|p| pose_pocket.is_none() || pose_pocket == Some(p.id.as_str()))
                                      .map(|p| p.residues.clone())
                                      .unwrap_or_default()
                                 });
        let interactions = synth::generate_interactions(&pool, &mut *lock(&self.rng));
        self.publish_selection(&hit, interactions.clone());
        Ok(interactions)
    }

    /// Igual que `select_hit` pero con las interacciones calculadas por el
    /// backend para el job remoto `job_id`.
    pub async fn select_remote_hit(&self,
                                   api: &dyn ScreeningApi,
                                   job_id: &str,
                                   hit_id: &str)
                                   -> Result<Interactions, StageError> {
        self.ctx.ensure_unlocked(StageId::Hits)?;
        let hit = self.find_hit(hit_id)?;
        let details = api.ligand_details(job_id, hit_id).await?;
        let interactions = details.to_interactions();
        // la lista pudo cambiar mientras esperábamos al backend
        self.find_hit(hit_id)?;
        self.publish_selection(&hit, interactions.clone());
        Ok(interactions)
    }

    pub fn clear_selection(&self) {
        self.ctx.store.set_state(WorkflowPatch::new().selected_hit(None).interactions(None));
    }

    fn publish_selection(&self, hit: &Hit, interactions: Interactions) {
        let status = format!("Selected {} ({:.2} kcal/mol, {} confidence, {} interactions)",
                             hit.name,
                             hit.score,
                             hit.confidence,
                             interactions.len());
        self.ctx.store.set_state(WorkflowPatch::new().selected_hit(Some(hit.id.clone()))
                                                     .interactions(Some(interactions))
                                                     .status(status));
        if let Err(e) = self.ctx.viewer.display_ligand(hit) {
            self.ctx.report_collaborator_error(StageId::Hits, &e.into());
        }
    }
}

impl std::fmt::Debug for HitsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitsController").finish_non_exhaustive()
    }
}
