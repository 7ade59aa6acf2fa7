mod workflow_creation_event;
mod workflow_evaluation_event;

pub use workflow_creation_event::WorkflowCreationEvent;
pub use workflow_evaluation_event::WorkflowEvaluationEvent;
