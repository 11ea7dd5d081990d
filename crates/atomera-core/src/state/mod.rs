//! Estado compartido del workflow y parches parciales.

mod patch;
mod workflow_state;

pub use patch::WorkflowPatch;
pub use workflow_state::{ScreeningProgress, WorkflowState};
