//! atomera-adapters: capa asíncrona sobre el core.
//!
//! Este crate provee:
//! - Contratos de colaboradores externos: `Viewer` (visor 3D) y
//!   `ScreeningApi` (backend HTTP), con una implementación `reqwest`.
//! - `JobRun`: conduce un job del core a través de un `CheckpointPlan`
//!   con esperas, deadline y cancelación cooperativa.
//! - Los seis controladores de etapa y el `Workbench` que los conecta a un
//!   único `WorkflowStore`.
//!
//! Los resultados (estructura, bolsillos, hits, interacciones) son
//! sintéticos; ver `synth`.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod runner;
pub mod stages;
pub mod synth;
pub mod workbench;

pub use collaborators::{HeadlessViewer, HttpScreeningApi, ScreeningApi, Viewer};
pub use config::WorkbenchConfig;
pub use error::{CollaboratorError, StageError};
pub use runner::{JobRun, Pacing};
pub use stages::{HitsController, InputMode, InteractionsController, LibrarySize, PocketController, PrepController,
                 ScreenController, StageContext, TargetController, UploadedFile};
pub use workbench::{StageController, Workbench};
