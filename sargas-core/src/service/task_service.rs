use sargas_common::prelude::*;
use sargas_common::TaskResult;

use super::ExecutionService;
use crate::metrics::Monitors;
use crate::model::Task;

/// Thin validation layer over `ExecutionService` for the worker API.
pub struct TaskService;

impl TaskService {
    /// Poll for a single task of a certain type.
    pub fn poll(task_type: &str, worker_id: &str, domain: &str) -> SgResult<Option<Task>> {
        if task_type.trim().is_empty() {
            return str_err!(InvalidInput, "TaskType cannot be null or empty.");
        }
        ExecutionService::poll(task_type, worker_id, domain)
    }

    /// Batch poll for tasks of a certain type.
    pub fn batch_poll(
        task_type: &str,
        worker_id: &str,
        domain: &str,
        count: i32,
        timeout_ms: i32,
    ) -> SgResult<Vec<Task>> {
        if task_type.trim().is_empty() {
            return str_err!(InvalidInput, "TaskType cannot be null or empty.");
        }
        let polled_tasks =
            ExecutionService::batch_poll(task_type, worker_id, domain, count, timeout_ms)?;
        debug!(
            "The Tasks {:?} being returned for /tasks/poll/{}?{}&{}",
            polled_tasks
                .iter()
                .map(|x| x.inner.task_id.clone())
                .collect::<Vec<_>>(),
            task_type,
            worker_id,
            domain
        );
        Monitors::record_task_poll_count(task_type, domain, polled_tasks.len() as i32);
        Ok(polled_tasks)
    }

    /// Updates a task.
    /// return the task id of the updated task
    pub fn update_task(task_result: TaskResult) -> SgResult<InlineStr> {
        if task_result.task_id.trim().is_empty() {
            return str_err!(InvalidInput, "TaskResult must have a valid taskId.");
        }
        if task_result.workflow_instance_id.trim().is_empty() {
            return str_err!(InvalidInput, "TaskResult must have a valid workflowInstanceId.");
        }
        debug!(
            "Update Task: {} with callback time: {}",
            task_result.task_id, task_result.callback_after_seconds
        );
        let task_id = task_result.task_id.clone();
        ExecutionService::update_task(task_result)?;
        Ok(task_id)
    }

    /// Acknowledges that the task was received by the worker.
    pub fn ack_task_received(task_id: &str) -> SgResult<bool> {
        if task_id.trim().is_empty() {
            return str_err!(InvalidInput, "TaskId cannot be null or empty.");
        }
        Ok(ExecutionService::ack_task_received(task_id))
    }

    pub fn get_task(task_id: &str) -> SgResult<Task> {
        ExecutionService::get_task(task_id)
            .ok_or_else(|| ErrorCode::NotFound(format!("No such task found by taskId: {}", task_id)))
    }

    pub fn get_pending_task_for_workflow(
        task_reference_name: &str,
        workflow_id: &InlineStr,
    ) -> Option<Task> {
        ExecutionService::get_pending_task_for_workflow(task_reference_name, workflow_id)
    }

    pub fn log(task_id: &str, log: &str) -> SgResult<()> {
        if task_id.trim().is_empty() {
            return str_err!(InvalidInput, "TaskId cannot be null or empty.");
        }
        ExecutionService::log(task_id, log);
        Ok(())
    }

    pub fn requeue_pending_tasks(task_type: &str) -> SgResult<i32> {
        if task_type.trim().is_empty() {
            return str_err!(InvalidInput, "TaskType cannot be null or empty.");
        }
        ExecutionService::requeue_pending_tasks_for_task_type(task_type)
    }
}
