//! `WorkflowState`: única fuente de verdad del workflow.
//!
//! El store no valida invariantes; son contrato de quien escribe:
//! - `screening_progress.processed <= screening_progress.total`.
//! - `hits` ordenado ascendentemente por `score` al publicarse.
//! - `selected_hit` referencia un `Hit::id` presente en `hits`.
use atomera_domain::{Hit, Interactions, Pocket, StageId, TargetInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::INITIAL_STATUS;

/// Resumen del cribado publicado por la etapa de screening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningProgress {
    pub job_id: Option<Uuid>,
    pub processed: u64,
    pub total: u64,
    pub workers: u32,
}

impl ScreeningProgress {
    /// Porcentaje entero completado (0 si `total == 0`).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.processed.min(self.total) * 100) / self.total) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub target: Option<TargetInfo>,
    pub is_target_loaded: bool,
    pub is_prep_complete: bool,
    pub selected_pocket: Option<Pocket>,
    pub pockets: Vec<Pocket>,
    pub is_screening_active: bool,
    pub screening_progress: ScreeningProgress,
    pub hits: Vec<Hit>,
    /// Id del hit seleccionado (referencia por identidad, no por índice).
    pub selected_hit: Option<String>,
    pub interactions: Option<Interactions>,
    pub active_section: StageId,
    pub status_message: String,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self { target: None,
               is_target_loaded: false,
               is_prep_complete: false,
               selected_pocket: None,
               pockets: Vec::new(),
               is_screening_active: false,
               screening_progress: ScreeningProgress::default(),
               hits: Vec::new(),
               selected_hit: None,
               interactions: None,
               active_section: StageId::Target,
               status_message: INITIAL_STATUS.to_string() }
    }
}

impl WorkflowState {
    /// Resuelve `selected_hit` contra `hits`.
    pub fn selected_hit(&self) -> Option<&Hit> {
        let id = self.selected_hit.as_deref()?;
        self.hits.iter().find(|h| h.id == id)
    }

    pub fn hit(&self, id: &str) -> Option<&Hit> {
        self.hits.iter().find(|h| h.id == id)
    }
}
