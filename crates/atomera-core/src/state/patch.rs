//! `WorkflowPatch`: escritura parcial (merge superficial) sobre el estado.
//!
//! Cada campo del estado tiene su contraparte `Option<T>` en el parche;
//! `None` significa "no tocar". Para campos anulables `T` ya es `Option<_>`,
//! de modo que `Some(None)` limpia el campo.
use atomera_domain::{Hit, Interactions, Pocket, StageId, TargetInfo};

use super::{ScreeningProgress, WorkflowState};

macro_rules! workflow_patch {
    ($( $(#[$doc:meta])* $field:ident : $ty:ty ),* $(,)?) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct WorkflowPatch {
            $( $(#[$doc])* pub $field: Option<$ty>, )*
        }

        impl WorkflowPatch {
            $(
                #[inline]
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = Some(value);
                    self
                }
            )*

            /// `true` si el parche no modifica ningún campo.
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }

            /// Nombres de los campos presentes (logs).
            pub fn fields(&self) -> Vec<&'static str> {
                let mut out = Vec::new();
                $( if self.$field.is_some() { out.push(stringify!($field)); } )*
                out
            }

            /// Merge superficial: último escritor gana por campo.
            pub fn apply_to(self, state: &mut WorkflowState) {
                $( if let Some(v) = self.$field { state.$field = v; } )*
            }
        }
    };
}

workflow_patch! {
    target: Option<TargetInfo>,
    is_target_loaded: bool,
    is_prep_complete: bool,
    selected_pocket: Option<Pocket>,
    pockets: Vec<Pocket>,
    is_screening_active: bool,
    screening_progress: ScreeningProgress,
    hits: Vec<Hit>,
    selected_hit: Option<String>,
    interactions: Option<Interactions>,
    active_section: StageId,
    /// Mensaje libre; último escritor gana.
    status_message: String,
}

impl WorkflowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atajo para `status_message`.
    pub fn status(self, message: impl Into<String>) -> Self {
        self.status_message(message.into())
    }

    /// Limpia todo lo que depende del target (prep, pockets, cribado, hits).
    pub fn clear_after_target(self) -> Self {
        self.is_prep_complete(false).clear_after_prep()
    }

    /// Limpia bolsillos y todo lo posterior.
    pub fn clear_after_prep(self) -> Self {
        self.pockets(Vec::new()).selected_pocket(None).clear_after_pocket()
    }

    /// Limpia cribado, hits y selección.
    pub fn clear_after_pocket(self) -> Self {
        self.is_screening_active(false)
            .screening_progress(ScreeningProgress::default())
            .hits(Vec::new())
            .selected_hit(None)
            .interactions(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_merges_only_present_fields() {
        let mut state = WorkflowState::default();
        WorkflowPatch::new().is_target_loaded(true).status("loaded").apply_to(&mut state);
        assert!(state.is_target_loaded);
        assert!(!state.is_prep_complete);
        assert_eq!(state.status_message, "loaded");
        assert_eq!(state.active_section, StageId::Target);
    }

    #[test]
    fn empty_patch_and_field_names() {
        assert!(WorkflowPatch::new().is_empty());
        let p = WorkflowPatch::new().hits(vec![]).selected_hit(None);
        assert!(!p.is_empty());
        assert_eq!(p.fields(), vec!["hits", "selected_hit"]);
    }

    #[test]
    fn clear_after_target_resets_downstream() {
        let mut state = WorkflowState { is_prep_complete: true,
                                        is_screening_active: true,
                                        selected_hit: Some("h1".into()),
                                        ..Default::default() };
        WorkflowPatch::new().clear_after_target().apply_to(&mut state);
        assert!(!state.is_prep_complete);
        assert!(!state.is_screening_active);
        assert!(state.selected_hit.is_none());
    }
}
