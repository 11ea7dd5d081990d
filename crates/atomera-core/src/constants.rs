//! Constantes del core.

/// Versión lógica del formato de exportación de sesión. Va junto al
/// snapshot exportado; el fingerprint cubre sólo `state`.
pub const WORKBENCH_VERSION: &str = "A1.0";

/// Progreso máximo de un job.
pub const MAX_PROGRESS: u8 = 100;

/// Mensaje de estado inicial del workflow.
pub const INITIAL_STATUS: &str = "Load a protein target to begin";
