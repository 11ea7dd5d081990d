//! Resolución de gating: qué etapas están desbloqueadas y completas.
//!
//! Función pura sobre el estado, recalculada en cada lectura. La cadena de
//! dependencias es fija y lineal; cada `unlocked` es la señal de completitud
//! de la etapa anterior.
use atomera_domain::StageId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::state::WorkflowState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStatus {
    pub unlocked: bool,
    pub complete: bool,
}

/// Estado de cada etapa, en orden de workflow.
pub type Gating = IndexMap<StageId, SectionStatus>;

pub fn section_status(state: &WorkflowState, stage: StageId) -> SectionStatus {
    let (unlocked, complete) = match stage {
        StageId::Target => (true, state.is_target_loaded),
        StageId::Prep => (state.is_target_loaded, state.is_prep_complete),
        StageId::Pocket => (state.is_prep_complete, state.selected_pocket.is_some()),
        StageId::Screen => (state.selected_pocket.is_some(), !state.hits.is_empty()),
        StageId::Hits => (state.is_screening_active || !state.hits.is_empty(), state.selected_hit.is_some()),
        // etapa terminal: sin noción de completitud
        StageId::Interactions => (state.selected_hit.is_some(), false),
    };
    SectionStatus { unlocked, complete }
}

pub fn gating(state: &WorkflowState) -> Gating {
    StageId::ALL.iter().map(|s| (*s, section_status(state, *s))).collect()
}

pub fn is_unlocked(state: &WorkflowState, stage: StageId) -> bool {
    section_status(state, stage).unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomera_domain::Pocket;

    fn pocket() -> Pocket {
        Pocket { id: "pocket-1".into(),
                 rank: 1,
                 score: 0.9,
                 volume: 420.0,
                 residues: vec![] }
    }

    #[test]
    fn initial_state_only_unlocks_target() {
        let g = gating(&WorkflowState::default());
        assert_eq!(g.len(), 6);
        assert_eq!(g.keys().copied().collect::<Vec<_>>(), StageId::ALL.to_vec());
        for (stage, status) in &g {
            assert_eq!(status.unlocked, *stage == StageId::Target, "{stage}");
            assert!(!status.complete);
        }
    }

    #[test]
    fn screen_unlock_tracks_selected_pocket() {
        let mut state = WorkflowState { is_target_loaded: true,
                                        is_prep_complete: true,
                                        ..Default::default() };
        assert!(!is_unlocked(&state, StageId::Screen));
        state.selected_pocket = Some(pocket());
        assert!(is_unlocked(&state, StageId::Screen));
        assert!(section_status(&state, StageId::Pocket).complete);
    }

    #[test]
    fn hits_unlock_while_screening_is_active() {
        let state = WorkflowState { is_screening_active: true,
                                    ..Default::default() };
        assert!(is_unlocked(&state, StageId::Hits));
        assert!(!section_status(&state, StageId::Screen).complete);
    }

    #[test]
    fn interactions_never_complete() {
        let state = WorkflowState { selected_hit: Some("hit-1".into()),
                                    ..Default::default() };
        let s = section_status(&state, StageId::Interactions);
        assert!(s.unlocked && !s.complete);
    }
}
