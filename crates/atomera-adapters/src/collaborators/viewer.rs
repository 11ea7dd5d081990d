//! Contrato del visor molecular.
//!
//! Las etapas sólo le hablan al visor; el visor no escribe en el estado
//! compartido. La única señal de vuelta son los átomos seleccionados en modo
//! picking, entregados al `PickHandler` registrado.

use async_trait::async_trait;
use atomera_domain::{Hit, Interactions, Pocket, ResidueRef};
use log::{debug, info};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CollaboratorError;

/// Entrada a cargar en el visor.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureInput {
    /// Archivo PDB/mmCIF subido por el usuario.
    File { name: String, bytes: Vec<u8> },
    /// Estructura predicha a partir de una secuencia.
    Predicted { name: String, sequence: String },
}

impl StructureInput {
    pub fn name(&self) -> &str {
        match self {
            StructureInput::File { name, .. } | StructureInput::Predicted { name, .. } => name,
        }
    }
}

/// Conteos informados por el visor. Ceros = desconocido.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StructureSummary {
    pub residue_count: u32,
    pub chain_count: u32,
    pub atom_count: u32,
    pub resolution: Option<f64>,
}

impl StructureSummary {
    pub fn is_known(&self) -> bool {
        self.residue_count > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickedAtom {
    pub residue: ResidueRef,
    pub atom_name: String,
    pub serial: u32,
}

pub type PickHandler = Arc<dyn Fn(PickedAtom) + Send + Sync>;

#[async_trait]
pub trait Viewer: Send + Sync {
    async fn load_structure(&self, input: &StructureInput) -> Result<StructureSummary, CollaboratorError>;
    fn highlight_pocket(&self, pocket: &Pocket) -> Result<(), CollaboratorError>;
    fn display_ligand(&self, hit: &Hit) -> Result<(), CollaboratorError>;
    fn show_interactions(&self, interactions: &Interactions, visible: bool) -> Result<(), CollaboratorError>;
    fn clear_viewer(&self) -> Result<(), CollaboratorError>;
    /// Registra (o retira con `None`) el receptor de eventos de picking.
    fn set_pick_handler(&self, handler: Option<PickHandler>);
}

/// Llamada registrada por `HeadlessViewer`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    Load(String),
    HighlightPocket(String),
    DisplayLigand(String),
    ShowInteractions { count: usize, visible: bool },
    Clear,
}

#[derive(Default)]
struct HeadlessInner {
    calls: Vec<ViewerCall>,
    fail_next_load: Option<String>,
    pick_handler: Option<PickHandler>,
}

/// Visor sin render: registra las llamadas y las escribe al log.
///
/// Lo usan el binario y los tests. `fail_next_load` inyecta un error de carga.
#[derive(Default)]
pub struct HeadlessViewer {
    inner: Mutex<HeadlessInner>,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut HeadlessInner) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn record(&self, call: ViewerCall) {
        debug!("viewer call {:?}", call);
        self.with_inner(|i| i.calls.push(call));
    }

    pub fn calls(&self) -> Vec<ViewerCall> {
        self.with_inner(|i| i.calls.clone())
    }

    pub fn fail_next_load(&self, reason: &str) {
        self.with_inner(|i| i.fail_next_load = Some(reason.to_string()));
    }

    pub fn has_pick_handler(&self) -> bool {
        self.with_inner(|i| i.pick_handler.is_some())
    }

    /// Simula un click sobre un átomo. Devuelve `false` si no hay receptor.
    pub fn emit_pick(&self, atom: PickedAtom) -> bool {
        // el handler se invoca fuera del lock
        match self.with_inner(|i| i.pick_handler.clone()) {
            Some(handler) => {
                handler(atom);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Viewer for HeadlessViewer {
    async fn load_structure(&self, input: &StructureInput) -> Result<StructureSummary, CollaboratorError> {
        if let Some(reason) = self.with_inner(|i| i.fail_next_load.take()) {
            return Err(CollaboratorError::Load(reason));
        }
        if let StructureInput::File { bytes, .. } = input {
            if bytes.is_empty() {
                return Err(CollaboratorError::Load("structure file has no content".into()));
            }
        }
        self.record(ViewerCall::Load(input.name().to_string()));
        info!("viewer loaded {}", input.name());
        Ok(StructureSummary::default())
    }

    fn highlight_pocket(&self, pocket: &Pocket) -> Result<(), CollaboratorError> {
        self.record(ViewerCall::HighlightPocket(pocket.id.clone()));
        Ok(())
    }

    fn display_ligand(&self, hit: &Hit) -> Result<(), CollaboratorError> {
        self.record(ViewerCall::DisplayLigand(hit.id.clone()));
        Ok(())
    }

    fn show_interactions(&self, interactions: &Interactions, visible: bool) -> Result<(), CollaboratorError> {
        self.record(ViewerCall::ShowInteractions { count: interactions.len(),
                                                   visible });
        Ok(())
    }

    fn clear_viewer(&self) -> Result<(), CollaboratorError> {
        self.record(ViewerCall::Clear);
        Ok(())
    }

    fn set_pick_handler(&self, handler: Option<PickHandler>) {
        self.with_inner(|i| i.pick_handler = handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn injected_load_failure_is_consumed_once() {
        let viewer = HeadlessViewer::new();
        viewer.fail_next_load("corrupt header");
        let input = StructureInput::File { name: "1abc.pdb".into(),
                                           bytes: b"ATOM".to_vec() };
        let err = viewer.load_structure(&input).await.unwrap_err();
        assert_eq!(err, CollaboratorError::Load("corrupt header".into()));
        assert!(viewer.load_structure(&input).await.is_ok());
        assert_eq!(viewer.calls(), vec![ViewerCall::Load("1abc.pdb".into())]);
    }

    #[test]
    fn pick_events_reach_registered_handler() {
        let viewer = HeadlessViewer::new();
        let atom = PickedAtom { residue: ResidueRef::new(112, "A", "asp"),
                                atom_name: "CA".into(),
                                serial: 901 };
        assert!(!viewer.emit_pick(atom.clone()));

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        viewer.set_pick_handler(Some(Arc::new(move |_| {
                                    seen2.fetch_add(1, Ordering::SeqCst);
                                })));
        assert!(viewer.emit_pick(atom));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
