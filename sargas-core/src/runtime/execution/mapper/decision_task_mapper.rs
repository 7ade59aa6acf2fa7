use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};
use crate::runtime::execution::DeciderService;

/// Maps a `WorkflowTask` of type `DECISION` to a list of `TaskModel` starting
/// with the decision task itself, followed by the tasks of the chosen branch.
/// When a branch is chosen the decision task input is marked with
/// `hasChildren` so the children drive control flow from there on.
pub struct DecisionTaskMapper;

impl TaskMapper for DecisionTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::Decision.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in DecisionTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let task_input = std::mem::take(&mut task_mapper_context.task_input);

        // the branch is chosen by the value of the case parameter in the
        // resolved input
        let case_value = task_input
            .get(&workflow_task.case_value_param)
            .map(|x| x.to_string())
            .unwrap_or_default();

        let mut tasks_to_be_scheduled = Vec::default();
        let mut decision_task = task_mapper_context.create_task_model(TaskStatus::InProgress);
        decision_task.task_type = TaskType::Decision.as_ref().into();
        decision_task.task_def_name = TaskType::Decision.as_ref().into();
        decision_task.start_time = Utc::now().timestamp_millis();
        decision_task.input_data = task_input;
        decision_task
            .input_data
            .insert("case".into(), (&case_value).into());
        tasks_to_be_scheduled.push(decision_task);

        let selected_tasks = match workflow_task.decision_cases.get(&case_value) {
            Some(selected_tasks) if !selected_tasks.is_empty() => selected_tasks,
            _ => &workflow_task.default_case,
        };

        if !selected_tasks.is_empty() {
            // schedule the first task of the chosen branch; its own completion
            // walks the rest of the branch
            let selected_task = &selected_tasks[0];
            let case_tasks = DeciderService::get_tasks_to_be_scheduled_with_retry(
                task_mapper_context.workflow_def,
                task_mapper_context.workflow_model,
                selected_task,
                task_mapper_context.retry_count,
                &task_mapper_context.retry_task_id,
            )?;
            tasks_to_be_scheduled.extend(case_tasks);
            tasks_to_be_scheduled[0]
                .input_data
                .insert("hasChildren".into(), "true".into());
        }

        Ok(tasks_to_be_scheduled)
    }
}
