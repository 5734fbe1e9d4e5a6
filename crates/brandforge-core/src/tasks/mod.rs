//! Generation task manager
//!
//! One task is one unit of background generation work with an observable
//! status. The registry is the shared source of truth; the manager schedules
//! units of work and is the only component that writes task state.

mod registry;
mod runner;
mod types;

pub use registry::TaskRegistry;
pub use runner::{GenerationConfig, TaskManager};
pub use types::{GenerationResult, GenerationTask, TaskStatus};
