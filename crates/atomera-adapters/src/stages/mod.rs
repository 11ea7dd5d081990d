//! Controladores de las seis etapas del flujo.
//!
//! Cada controlador posee su `JobManager`, su estado local (inputs, flags de
//! visualización) y un handle al `WorkflowStore` compartido. Lee el estado
//! compartido para decidir y lo escribe sólo al completar o al fallar.

mod context;
mod hits;
mod interactions;
mod pocket;
mod prep;
mod screen;
mod target;

pub use context::StageContext;
pub use hits::{HitsController, HitsView};
pub use interactions::{InteractionsController, InteractionsView};
pub use pocket::PocketController;
pub use prep::{PrepCheck, PrepController, PrepReport};
pub use screen::{LibrarySize, ScreenController};
pub use target::{InputMode, ModeSwitch, TargetController, UploadedFile};
