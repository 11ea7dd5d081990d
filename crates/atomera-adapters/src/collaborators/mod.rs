//! Colaboradores externos: visor 3D y backend de cribado.
pub mod api;
pub mod http;
pub mod viewer;

pub use api::{JobRequest, LigandDetails, LigandUpload, ProteinUpload, RankedLigand, RemoteInteraction, RemoteJob,
              RemotePocket, RemoteStage, ResultSummary, ScreeningApi};
pub use http::HttpScreeningApi;
pub use viewer::{HeadlessViewer, PickHandler, PickedAtom, StructureInput, StructureSummary, Viewer, ViewerCall};
