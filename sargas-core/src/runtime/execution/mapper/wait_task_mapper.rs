use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};

/// Maps a `WorkflowTask` of type `WAIT` to a `TaskModel` of type `WAIT` with
/// status `IN_PROGRESS`. The task stays in progress until an external update
/// completes it.
pub struct WaitTaskMapper;

impl TaskMapper for WaitTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::Wait.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in WaitTaskMapper",
            task_mapper_context
        );

        let task_input = std::mem::take(&mut task_mapper_context.task_input);

        let mut wait_task = task_mapper_context.create_task_model(TaskStatus::InProgress);
        wait_task.task_type = TaskType::Wait.as_ref().into();
        wait_task.task_def_name = TaskType::Wait.as_ref().into();
        wait_task.start_time = Utc::now().timestamp_millis();
        wait_task.input_data = task_input;

        Ok(vec![wait_task])
    }
}
