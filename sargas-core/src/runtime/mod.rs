pub(crate) mod dal;
mod event;
pub(crate) mod execution;
mod workflow_sweeper;

pub use dal::ExecutionDaoFacade;
pub use event::{WorkflowCreationEvent, WorkflowEvaluationEvent};
pub use execution::{
    Channel, DeciderOutcome, DeciderService, StartWorkflowInput, WorkflowExecutor,
};
pub use workflow_sweeper::WorkflowSweeper;
