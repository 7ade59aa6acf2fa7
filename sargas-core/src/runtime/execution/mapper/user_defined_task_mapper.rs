use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};
use crate::utils::ParametersUtils;

/// Maps a `WorkflowTask` of type `USER_DEFINED` to a single `TaskModel` with
/// status `SCHEDULED`, to be picked up by a remote worker.
pub struct UserDefinedTaskMapper;

impl TaskMapper for UserDefinedTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::UserDefined.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in UserDefinedTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let task_def = task_mapper_context.task_definition;

        // re-resolve so that the task-id system parameter and the definition's
        // input template are applied
        let input = ParametersUtils::get_task_input(
            &workflow_task.input_parameters,
            task_mapper_context.workflow_model,
            task_def,
            Some(&task_mapper_context.task_id),
        )?;

        let mut user_defined_task = task_mapper_context.create_task_model(TaskStatus::Scheduled);
        // the worker queue for a user-defined task is named by the task
        // definition it targets
        user_defined_task.task_type = workflow_task.name.clone();
        user_defined_task.start_delay_in_seconds = workflow_task.start_delay;
        user_defined_task.input_data = input;
        user_defined_task.retry_count = task_mapper_context.retry_count;
        user_defined_task.callback_after_seconds = workflow_task.start_delay as i64;
        user_defined_task.retried_task_id = task_mapper_context.retry_task_id.clone();
        if let Some(task_def) = task_def {
            user_defined_task.response_timeout_seconds =
                task_def.get_response_timeout_seconds() as i64;
        }

        Ok(vec![user_defined_task])
    }
}
