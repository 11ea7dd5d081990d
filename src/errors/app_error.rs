use atomera_adapters::StageError;
use thiserror::Error;

/// Errores de la aplicación (binario y sesión guionada).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de etapa: {0}")]
    Stage(#[from] StageError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Uso inválido: {0}")]
    Usage(String),
}
