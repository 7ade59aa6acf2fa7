use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};

/// Maps a `WorkflowTask` of type `JOIN` to a `TaskModel` of type `JOIN` with
/// status `IN_PROGRESS`. The join completes once every reference it waits on
/// is terminal.
pub struct JoinTaskMapper;

impl TaskMapper for JoinTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::Join.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in JoinTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;

        let mut join_input = HashMap::new();
        join_input.insert(
            "joinOn".into(),
            workflow_task
                .join_on
                .iter()
                .map(|x| x.into())
                .collect::<Vec<Object>>()
                .into(),
        );

        let mut join_task = task_mapper_context.create_task_model(TaskStatus::InProgress);
        join_task.task_type = TaskType::Join.as_ref().into();
        join_task.task_def_name = TaskType::Join.as_ref().into();
        join_task.start_time = Utc::now().timestamp_millis();
        join_task.input_data = join_input;

        Ok(vec![join_task])
    }
}
