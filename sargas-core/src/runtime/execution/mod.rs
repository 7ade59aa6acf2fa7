mod channels;
mod mapper;
mod tasks;

mod decider_service;
mod start_workflow_input;
pub(crate) mod terminate_workflow_exception;
mod workflow_executor;

pub use channels::{Channel, CREATE_EVENT_CHANNEL, EVAL_EVENT_CHANNEL};
pub use decider_service::{DeciderOutcome, DeciderService};
pub use mapper::{TaskMapper, TaskMapperContext, TaskMapperRegistry};
pub use start_workflow_input::StartWorkflowInput;
pub use tasks::{SystemTaskRegistry, WorkflowSystemTask};
pub use workflow_executor::WorkflowExecutor;
