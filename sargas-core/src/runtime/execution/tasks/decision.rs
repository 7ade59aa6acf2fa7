use sargas_common::TaskType;

use super::workflow_system_task::WorkflowSystemTask;
use crate::model::{TaskModel, TaskStatus, WorkflowModel};

/// The branch was already chosen when the task was mapped, so the decision
/// itself completes immediately.
pub struct Decision;

impl WorkflowSystemTask for Decision {
    fn get_task_type(&self) -> &str {
        TaskType::Decision.as_ref()
    }

    fn start(&self, _workflow: &WorkflowModel, task: &mut TaskModel) {
        task.status = TaskStatus::Completed;
    }

    fn execute(&self, _workflow: &WorkflowModel, task: &mut TaskModel) -> bool {
        if !task.status.is_terminal() {
            task.status = TaskStatus::Completed;
            return true;
        }
        false
    }
}
