//! Task lifecycle: status vocabulary, the task entity store, and the
//! approval chain engine that drives tasks between states.

pub mod engine;
pub mod states;
pub mod tasks;

pub use engine::{AdvancePolicy, ApprovalEngine, ApprovalOutcome};
pub use states::{ApprovalStatus, TaskStatus};
pub use tasks::TaskStore;
