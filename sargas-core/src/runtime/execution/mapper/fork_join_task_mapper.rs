use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};
use crate::runtime::execution::DeciderService;

/// Maps a `WorkflowTask` of type `FORK_JOIN` to a list of `TaskModel`
/// beginning with a completed `FORK` marker, followed by the head task of
/// each branch and the `JOIN` that collects them.
pub struct ForkJoinTaskMapper;

impl TaskMapper for ForkJoinTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::ForkJoin.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in ForkJoinTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let workflow_model = task_mapper_context.workflow_model;
        let task_input = std::mem::take(&mut task_mapper_context.task_input);

        let mut tasks_to_be_scheduled = Vec::default();
        let mut fork_task = task_mapper_context.create_task_model(TaskStatus::Completed);
        fork_task.task_type = TaskType::TASK_TYPE_FORK.into();
        fork_task.task_def_name = TaskType::TASK_TYPE_FORK.into();
        let epoch_millis = Utc::now().timestamp_millis();
        fork_task.start_time = epoch_millis;
        fork_task.end_time = epoch_millis;
        fork_task.input_data = task_input;

        tasks_to_be_scheduled.push(fork_task);
        for tasks in &workflow_task.fork_tasks {
            let task = &tasks[0];
            let branch_tasks = DeciderService::get_tasks_to_be_scheduled(
                task_mapper_context.workflow_def,
                workflow_model,
                task,
                task_mapper_context.retry_count,
            )?;
            tasks_to_be_scheduled.extend(branch_tasks);
        }

        if let Some(join_workflow_task) = task_mapper_context
            .workflow_def
            .get_next_task(&workflow_task.task_reference_name)
        {
            if join_workflow_task.type_.eq(TaskType::Join.as_ref()) {
                let join_task = DeciderService::get_tasks_to_be_scheduled(
                    task_mapper_context.workflow_def,
                    workflow_model,
                    join_workflow_task,
                    task_mapper_context.retry_count,
                )?;
                tasks_to_be_scheduled.extend(join_task);
                return Ok(tasks_to_be_scheduled);
            }
        }
        str_err!(
            TerminateWorkflow,
            "Fork task definition is not followed by a join task. Check the blueprint"
        )
    }
}
