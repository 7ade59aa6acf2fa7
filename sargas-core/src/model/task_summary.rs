use sargas_common::prelude::*;

use super::{TaskModel, TaskStatus};

/// Indexed projection of a task execution.
#[derive(Clone, Debug)]
pub struct TaskSummary {
    pub task_id: InlineStr,
    pub task_type: InlineStr,
    pub task_def_name: InlineStr,
    pub reference_task_name: InlineStr,
    pub status: TaskStatus,
    pub workflow_id: InlineStr,
    pub workflow_type: InlineStr,
    pub correlation_id: InlineStr,
    pub scheduled_time: i64,
    pub start_time: i64,
    pub update_time: i64,
    pub end_time: i64,
    pub queue_wait_time: i64,
    pub reason_for_incompletion: InlineStr,
}

impl TaskSummary {
    pub fn new(task: &TaskModel) -> Self {
        Self {
            task_id: task.task_id.clone(),
            task_type: task.task_type.clone(),
            task_def_name: task.task_def_name.clone(),
            reference_task_name: task.reference_task_name.clone(),
            status: task.status,
            workflow_id: task.workflow_instance_id.clone(),
            workflow_type: task.workflow_type.clone(),
            correlation_id: task.correlation_id.clone(),
            scheduled_time: task.scheduled_time,
            start_time: task.start_time,
            update_time: task.update_time,
            end_time: task.end_time,
            queue_wait_time: task.get_queue_wait_time(),
            reason_for_incompletion: task.reason_for_incompletion.clone(),
        }
    }
}
