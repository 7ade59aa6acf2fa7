use sargas_common::TaskType;

use super::workflow_system_task::WorkflowSystemTask;

/// Holds its position in the workflow until an external update completes it.
/// No work happens inside the engine.
pub struct Wait;

impl WorkflowSystemTask for Wait {
    fn get_task_type(&self) -> &str {
        TaskType::Wait.as_ref()
    }
}
