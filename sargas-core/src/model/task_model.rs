use chrono::Utc;
use numtoa::NumToA;
use sargas_common::prelude::*;
use sargas_common::{TaskDef, WorkflowTask};
use strum_macros::{AsRefStr, EnumString};

use super::Task;

#[derive(Clone, Debug)]
pub struct TaskModel {
    pub task_type: InlineStr,
    pub status: TaskStatus,
    /// Correlates this attempt back to a template in the workflow definition.
    pub reference_task_name: InlineStr,
    pub retry_count: i32,
    pub seq: i32,
    pub correlation_id: InlineStr,
    pub poll_count: i32,
    pub task_def_name: InlineStr,
    /// Time when the task was scheduled
    pub scheduled_time: i64,
    /// Time when the task was first polled
    pub start_time: i64,
    /// Time when the task completed executing
    pub end_time: i64,
    /// Time when the task was last updated
    pub update_time: i64,
    pub start_delay_in_seconds: i32,
    /// Predecessor in the retry chain, stored as an id to keep the in-memory
    /// model acyclic.
    pub retried_task_id: InlineStr,
    pub retried: bool,
    pub executed: bool,
    pub response_timeout_seconds: i64,
    pub workflow_instance_id: InlineStr,
    pub workflow_type: InlineStr,
    pub task_id: InlineStr,
    pub reason_for_incompletion: InlineStr,
    pub callback_after_seconds: i64,
    pub worker_id: InlineStr,
    pub workflow_task: Option<WorkflowTask>,
    pub domain: InlineStr,
    pub external_input_payload_storage_path: InlineStr,
    pub external_output_payload_storage_path: InlineStr,
    pub sub_workflow_id: InlineStr,
    pub input_data: HashMap<InlineStr, Object>,
    pub output_data: HashMap<InlineStr, Object>,
}

impl TaskModel {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            task_type: InlineStr::new(),
            status,
            reference_task_name: InlineStr::new(),
            retry_count: 0,
            seq: 0,
            correlation_id: InlineStr::new(),
            poll_count: 0,
            task_def_name: InlineStr::new(),
            scheduled_time: 0,
            start_time: 0,
            end_time: 0,
            update_time: 0,
            start_delay_in_seconds: 0,
            retried_task_id: InlineStr::new(),
            retried: false,
            executed: false,
            response_timeout_seconds: 0,
            workflow_instance_id: InlineStr::new(),
            workflow_type: InlineStr::new(),
            task_id: InlineStr::new(),
            reason_for_incompletion: InlineStr::new(),
            callback_after_seconds: 0,
            worker_id: InlineStr::new(),
            workflow_task: None,
            domain: InlineStr::new(),
            external_input_payload_storage_path: InlineStr::new(),
            external_output_payload_storage_path: InlineStr::new(),
            sub_workflow_id: InlineStr::new(),
            input_data: HashMap::new(),
            output_data: HashMap::new(),
        }
    }

    pub fn get_task_definition(&self) -> Option<&TaskDef> {
        self.workflow_task
            .as_ref()
            .and_then(|x| x.task_definition.as_ref())
    }

    /// Reference name plus attempt number. Deduplication key for the task
    /// within its workflow.
    pub fn get_task_key(&self) -> InlineStr {
        let mut task_name = self.reference_task_name.clone();
        task_name.push_str("_");
        task_name.push_str(self.retry_count.numtoa_str(10, &mut [0u8; 16]));
        task_name
    }

    pub fn get_queue_wait_time(&self) -> i64 {
        if self.start_time > 0 && self.scheduled_time > 0 {
            if self.update_time > 0 && self.callback_after_seconds > 0 {
                let wait_time = Utc::now().timestamp_millis()
                    - (self.update_time + self.callback_after_seconds * 1000);
                wait_time.max(0)
            } else {
                self.start_time - self.scheduled_time
            }
        } else {
            0
        }
    }

    pub fn to_task(self) -> Task {
        Task { inner: self }
    }
}

#[derive(Clone, Copy, Debug, EnumString, AsRefStr, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
    CompletedWithErrors,
    Failed,
    Canceled,
    TimedOut,
    Skipped,
    ReadyForRerun,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            TaskStatus::Scheduled | TaskStatus::InProgress | TaskStatus::ReadyForRerun
        )
    }

    pub fn is_successful(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::CompletedWithErrors | TaskStatus::Skipped
        )
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::TimedOut)
    }
}
