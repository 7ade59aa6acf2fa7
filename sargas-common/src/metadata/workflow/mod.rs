mod sub_workflow_params;
mod workflow_def;
mod workflow_task;

pub use sub_workflow_params::SubWorkflowParams;
pub use workflow_def::WorkflowDef;
pub use workflow_task::WorkflowTask;
