//! Etapa Interactions: vista del hit seleccionado y sus contactos.
//!
//! La visibilidad de los marcadores es estado local: alternarla sólo habla
//! con el visor y nunca escribe en el estado compartido.

use atomera_domain::{Hit, Interactions, StageId};
use std::sync::atomic::{AtomicBool, Ordering};

use super::context::StageContext;
use crate::error::StageError;

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionsView {
    pub hit: Hit,
    pub interactions: Interactions,
    pub markers_visible: bool,
}

pub struct InteractionsController {
    ctx: StageContext,
    markers_visible: AtomicBool,
}

impl InteractionsController {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx,
               markers_visible: AtomicBool::new(true) }
    }

    pub fn markers_visible(&self) -> bool {
        self.markers_visible.load(Ordering::SeqCst)
    }

    /// `None` mientras no haya un hit seleccionado con interacciones.
    pub fn view(&self) -> Option<InteractionsView> {
        let markers_visible = self.markers_visible();
        self.ctx.store.read(|s| {
                          let hit = s.selected_hit()?.clone();
                          let interactions = s.interactions.clone()?;
                          Some(InteractionsView { hit,
                                                  interactions,
                                                  markers_visible })
                      })
    }

    pub fn set_markers_visible(&self, visible: bool) -> Result<(), StageError> {
        self.ctx.ensure_unlocked(StageId::Interactions)?;
        let interactions = self.ctx.store.read(|s| s.interactions.clone()).unwrap_or_default();
        let previous = self.markers_visible.swap(visible, Ordering::SeqCst);
        if let Err(e) = self.ctx.viewer.show_interactions(&interactions, visible) {
            self.markers_visible.store(previous, Ordering::SeqCst);
            return Err(e.into());
        }
        Ok(())
    }

    /// Alterna los marcadores y devuelve el nuevo valor.
    pub fn toggle_markers(&self) -> Result<bool, StageError> {
        let visible = !self.markers_visible();
        self.set_markers_visible(visible)?;
        Ok(visible)
    }
}

impl std::fmt::Debug for InteractionsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionsController")
         .field("markers_visible", &self.markers_visible())
         .finish()
    }
}
