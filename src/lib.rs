//! Atomera Workbench
//!
//! Este crate es la aplicación sobre los crates del workspace:
//! - `config`: configuración global (`CONFIG`) y logging.
//! - `presentation`: navegación y barra de estado en texto.
//! - `session`: recorrido guionado de las seis etapas.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod presentation;
pub mod session;

pub use errors::AppError;
