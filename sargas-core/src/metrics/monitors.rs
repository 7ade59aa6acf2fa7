#![allow(unused_variables)]

use crate::model::TaskStatus;
use crate::WorkflowStatus;

/// Seam for the metrics backend. The backend itself is provided by the
/// installation; the engine only names the observations.
pub struct Monitors;

impl Monitors {
    pub fn error(class_name: &str, method_name: &str) {}

    pub fn record_workflow_decision_time(duration: i64) {}

    pub fn record_workflow_completion(workflow_type: &str, duration: i64) {}

    pub fn record_workflow_termination(workflow_type: &str, status: WorkflowStatus) {}

    pub fn record_update_conflict(task_type: &str, workflow_type: &str, status: TaskStatus) {}

    pub fn record_task_poll(queue_name: &str) {}

    pub fn record_task_poll_count(task_type: &str, domain: &str, count: i32) {}

    pub fn record_queue_wait_time(task_def_name: &str, wait_time_ms: i64) {}

    pub fn record_task_timeout(task_def_name: &str) {}

    pub fn record_task_response_timeout(task_def_name: &str) {}

    pub fn record_task_requeue(task_type: &str) {}

    pub fn record_task_execution_time(
        task_type: &str,
        duration: i64,
        includes_retries: bool,
        status: TaskStatus,
    ) {
    }

    pub fn record_external_payload_storage_usage(name: &str, operation: &str, payload_type: &str) {}
}
