use thiserror::Error;

/// Errores del dominio (entradas mal formadas, referencias inválidas).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
    #[error("cannot parse {what}: {input}")]
    ParseError { what: &'static str, input: String },
}
