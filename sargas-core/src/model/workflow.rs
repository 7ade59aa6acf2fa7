use strum_macros::{AsRefStr, EnumString};

use super::WorkflowModel;

/// API view of a workflow execution.
pub struct Workflow {
    pub status: WorkflowStatus,
    pub workflow: Option<WorkflowModel>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
    TimedOut,
    Terminated,
    Paused,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowStatus::Running | WorkflowStatus::Paused)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, WorkflowStatus::Completed)
    }
}
