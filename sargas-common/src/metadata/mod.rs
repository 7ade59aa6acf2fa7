mod tasks;
mod workflow;

pub use tasks::{RetryLogic, TaskDef, TaskType, TimeoutPolicy};
pub use workflow::{SubWorkflowParams, WorkflowDef, WorkflowTask};
