use super::task_exec_log::TaskExecLog;
use crate::prelude::*;

/// Result of the task execution, reported by a worker.
#[derive(Debug)]
pub struct TaskResult {
    pub workflow_instance_id: InlineStr,
    pub task_id: InlineStr,
    pub reason_for_incompletion: InlineStr,
    pub callback_after_seconds: i64,
    pub worker_id: InlineStr,
    pub status: TaskResultStatus,
    pub output_data: HashMap<InlineStr, Object>,
    pub logs: Vec<TaskExecLog>,
    pub external_output_payload_storage_path: InlineStr,
    pub sub_workflow_id: InlineStr,
}

impl TaskResult {
    pub fn new(workflow_instance_id: InlineStr, task_id: InlineStr) -> Self {
        Self {
            workflow_instance_id,
            task_id,
            reason_for_incompletion: InlineStr::new(),
            callback_after_seconds: 0,
            worker_id: InlineStr::new(),
            status: TaskResultStatus::InProgress,
            output_data: HashMap::default(),
            logs: Vec::default(),
            external_output_payload_storage_path: InlineStr::new(),
            sub_workflow_id: InlineStr::new(),
        }
    }

    pub fn complete(workflow_instance_id: InlineStr, task_id: InlineStr) -> Self {
        let mut result = Self::new(workflow_instance_id, task_id);
        result.status = TaskResultStatus::Completed;
        result
    }

    pub fn failed(workflow_instance_id: InlineStr, task_id: InlineStr, reason: &str) -> Self {
        let mut result = Self::new(workflow_instance_id, task_id);
        result.status = TaskResultStatus::Failed;
        result.reason_for_incompletion = reason.into();
        result
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskResultStatus {
    InProgress,
    Canceled,
    Failed,
    Completed,
}
