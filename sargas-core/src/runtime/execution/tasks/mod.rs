mod decision;
mod join;
mod system_task_registry;
mod wait;
mod workflow_system_task;

pub use system_task_registry::SystemTaskRegistry;
pub use workflow_system_task::WorkflowSystemTask;
