//! Ciclo de vida de jobs.
//!
//! Un job es una unidad de trabajo asíncrona propiedad de un único
//! controlador de etapa. Este módulo define:
//! - `Job` y su máquina de estados (`JobStatus`).
//! - `JobManager`: create/start/update/complete/fail/cancel/retry sobre el
//!   job actual de una etapa, con registro de eventos.
//! - `CheckpointPlan`: secuencia discreta de `(progress, message, delay)`
//!   que el llamador recorre entre puntos de suspensión.

mod checkpoint;
mod kind;
mod manager;
mod model;
mod status;

pub use checkpoint::{Checkpoint, CheckpointPlan};
pub use kind::JobKind;
pub use manager::JobManager;
pub use model::{Job, JobUpdate};
pub use status::JobStatus;
