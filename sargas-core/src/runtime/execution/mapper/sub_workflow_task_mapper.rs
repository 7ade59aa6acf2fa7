use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};
use crate::utils::ParametersUtils;

/// Maps a `WorkflowTask` of type `SUB_WORKFLOW` to a `TaskModel` of type
/// `SUB_WORKFLOW` with status `SCHEDULED`. The task input records the child
/// workflow to start along with its input.
pub struct SubWorkflowTaskMapper;

impl TaskMapper for SubWorkflowTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::SubWorkflow.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in SubWorkflowTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let task_input = std::mem::take(&mut task_mapper_context.task_input);

        // a sub-workflow cannot start without knowing which workflow to run
        let sub_workflow_params = workflow_task.sub_workflow_param.as_ref().ok_or_else(|| {
            ErrorCode::TerminateWorkflow(format!(
                "Task {} is defined as SUB_WORKFLOW and is missing subWorkflowParam. \
                 Please check the blueprint",
                workflow_task.name
            ))
        })?;

        // the name may itself be an expression over the workflow state
        let sub_workflow_name = Self::resolve_name(
            &sub_workflow_params.name,
            &task_mapper_context,
        )?;

        let mut sub_workflow_task = task_mapper_context.create_task_model(TaskStatus::Scheduled);
        sub_workflow_task.task_type = TaskType::SubWorkflow.as_ref().into();
        sub_workflow_task
            .input_data
            .insert("subWorkflowName".into(), (&sub_workflow_name).into());
        if let Some(version) = sub_workflow_params.version {
            sub_workflow_task
                .input_data
                .insert("subWorkflowVersion".into(), version.into());
        }
        sub_workflow_task
            .input_data
            .insert("workflowInput".into(), task_input.into());
        sub_workflow_task.retry_count = task_mapper_context.retry_count;
        sub_workflow_task.retried_task_id = task_mapper_context.retry_task_id.clone();

        debug!("SubWorkflowTaskMapper mapped task: {:?}", sub_workflow_task);
        Ok(vec![sub_workflow_task])
    }
}

impl SubWorkflowTaskMapper {
    fn resolve_name(name: &InlineStr, ctx: &TaskMapperContext) -> SgResult<InlineStr> {
        if !name.contains("${") {
            return Ok(name.clone());
        }
        let params = HashMap::from([(InlineStr::from("subWorkflowName"), Object::from(name))]);
        let resolved =
            ParametersUtils::get_task_input(&params, ctx.workflow_model, None, None)?;
        Ok(resolved
            .get("subWorkflowName")
            .map(|x| x.to_string())
            .unwrap_or_else(|| name.clone()))
    }
}
