//! atomera-core: estado compartido del workflow y ciclo de vida de jobs.
//!
//! El core es síncrono y neutral respecto a la ejecución: no conoce el visor
//! ni la API remota. Los controladores de etapa (crate `atomera-adapters`)
//! conducen los jobs y publican resultados a través de `WorkflowStore`.
pub mod constants;
pub mod errors;
pub mod event;
pub mod gating;
pub mod hashing;
pub mod job;
pub mod state;
pub mod store;

pub use errors::{JobError, WorkflowError};
pub use event::{InMemoryJobEventStore, JobEvent, JobEventKind, JobEventStore};
pub use gating::{gating, is_unlocked, section_status, Gating, SectionStatus};
pub use job::{Checkpoint, CheckpointPlan, Job, JobKind, JobManager, JobStatus, JobUpdate};
pub use state::{ScreeningProgress, WorkflowPatch, WorkflowState};
pub use store::{Subscriber, SubscriptionId, WorkflowStore};
