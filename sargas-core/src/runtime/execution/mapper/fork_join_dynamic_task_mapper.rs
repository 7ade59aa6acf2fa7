use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::{TaskType, WorkflowTask};

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};
use crate::runtime::execution::DeciderService;
use crate::utils::IdGenerator;

/// Maps a `WorkflowTask` of type `FORK_JOIN_DYNAMIC` to a list of `TaskModel`
/// beginning with a completed `FORK` marker, followed by the tasks of the
/// runtime-resolved branches and a `JOIN` waiting on all of them. Unlike a
/// static fork, the fan-out is read from the resolved task input.
pub struct ForkJoinDynamicTaskMapper;

impl TaskMapper for ForkJoinDynamicTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::ForkJoinDynamic.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in ForkJoinDynamicTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let task_input = std::mem::take(&mut task_mapper_context.task_input);

        let dynamic_tasks = Self::get_dynamic_tasks(workflow_task, &task_input)?;
        let dynamic_tasks_input = task_input
            .get(&workflow_task.dynamic_fork_tasks_input_param_name)
            .and_then(|x| x.as_map())
            .cloned()
            .unwrap_or_default();

        let dynamic_ref_names = dynamic_tasks
            .iter()
            .map(|x| x.task_reference_name.clone())
            .collect::<Vec<_>>();

        let mut tasks_to_be_scheduled = Vec::default();
        let mut fork_task = task_mapper_context.create_task_model(TaskStatus::Completed);
        fork_task.task_type = TaskType::TASK_TYPE_FORK.into();
        fork_task.task_def_name = TaskType::TASK_TYPE_FORK.into();
        let epoch_millis = Utc::now().timestamp_millis();
        fork_task.start_time = epoch_millis;
        fork_task.end_time = epoch_millis;
        fork_task.input_data.insert(
            "forkedTasks".into(),
            dynamic_ref_names
                .iter()
                .map(|x| x.into())
                .collect::<Vec<Object>>()
                .into(),
        );
        tasks_to_be_scheduled.push(fork_task);

        for dynamic_task in &dynamic_tasks {
            let mut branch_tasks = DeciderService::get_tasks_to_be_scheduled(
                task_mapper_context.workflow_def,
                task_mapper_context.workflow_model,
                dynamic_task,
                task_mapper_context.retry_count,
            )?;
            // the per-branch input from the fan-out map overrides whatever
            // the template resolved to
            if let Some(branch_head) = branch_tasks.first_mut() {
                if let Some(Object::Map(branch_input)) =
                    dynamic_tasks_input.get(&dynamic_task.task_reference_name)
                {
                    branch_head.input_data.extend(branch_input.clone());
                }
            }
            tasks_to_be_scheduled.extend(branch_tasks);
        }

        let join_workflow_task = task_mapper_context
            .workflow_def
            .get_next_task(&workflow_task.task_reference_name)
            .filter(|x| x.type_.eq(TaskType::Join.as_ref()))
            .ok_or_else(|| {
                ErrorCode::TerminateWorkflow(
                    "Dynamic fork task definition is not followed by a join task. Check the blueprint",
                )
            })?;

        // the join waits on the runtime fan-out, not on the template's joinOn
        let mut join_input = HashMap::new();
        join_input.insert(
            "joinOn".into(),
            dynamic_ref_names
                .iter()
                .map(|x| x.into())
                .collect::<Vec<Object>>()
                .into(),
        );

        let mut join_task = TaskModel::new(TaskStatus::InProgress);
        join_task.task_type = TaskType::Join.as_ref().into();
        join_task.task_def_name = TaskType::Join.as_ref().into();
        join_task.reference_task_name = join_workflow_task.task_reference_name.clone();
        join_task.workflow_instance_id = task_mapper_context.workflow_model.workflow_id.clone();
        join_task.workflow_type = task_mapper_context.workflow_model.workflow_type.clone();
        join_task.correlation_id = task_mapper_context.workflow_model.correlation_id.clone();
        join_task.scheduled_time = epoch_millis;
        join_task.start_time = epoch_millis;
        join_task.task_id = IdGenerator::generate();
        join_task.workflow_task = Some(join_workflow_task.clone());
        join_task.input_data = join_input;
        tasks_to_be_scheduled.push(join_task);

        Ok(tasks_to_be_scheduled)
    }
}

impl ForkJoinDynamicTaskMapper {
    fn get_dynamic_tasks(
        workflow_task: &WorkflowTask,
        task_input: &HashMap<InlineStr, Object>,
    ) -> SgResult<Vec<WorkflowTask>> {
        let dynamic_tasks = task_input
            .get(&workflow_task.dynamic_fork_tasks_param)
            .and_then(|x| x.as_list())
            .ok_or_else(|| {
                ErrorCode::TerminateWorkflow(format!(
                    "Dynamic tasks could not be resolved from the input parameter {} of task: {}",
                    workflow_task.dynamic_fork_tasks_param, workflow_task.task_reference_name
                ))
            })?;

        let mut tasks = Vec::with_capacity(dynamic_tasks.len());
        for dynamic_task in dynamic_tasks {
            let json = dynamic_task.to_json();
            tasks.push(WorkflowTask::try_from(&json).map_err(|e| {
                ErrorCode::TerminateWorkflow(format!(
                    "Invalid dynamic task in {}: {}",
                    workflow_task.task_reference_name,
                    e.message()
                ))
            })?);
        }
        Ok(tasks)
    }
}
