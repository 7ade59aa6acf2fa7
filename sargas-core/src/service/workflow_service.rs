use sargas_common::prelude::*;
use sargas_common::{SkipTaskRequest, StartWorkflowRequest};

use super::ExecutionService;
use crate::model::Workflow;
use crate::runtime::execution::CREATE_EVENT_CHANNEL;
use crate::runtime::{
    ExecutionDaoFacade, StartWorkflowInput, WorkflowCreationEvent, WorkflowExecutor,
};
use crate::utils::IdGenerator;
use crate::WorkflowStatus;

pub struct WorkflowService;

impl WorkflowService {
    /// Starts a new workflow instance. The first evaluation is queued on the
    /// evaluation channel.
    /// return the id of the workflow instance that can be used for tracking
    pub fn start_workflow(start_workflow_request: StartWorkflowRequest) -> SgResult<InlineStr> {
        WorkflowExecutor::start_workflow(start_workflow_request.into())
    }

    /// Hands the whole start over to the creation channel and returns the
    /// pre-allocated workflow id right away.
    pub fn start_workflow_async(
        start_workflow_request: StartWorkflowRequest,
    ) -> SgResult<InlineStr> {
        let mut input: StartWorkflowInput = start_workflow_request.into();
        input.workflow_id = IdGenerator::generate();
        let workflow_id = input.workflow_id.clone();
        CREATE_EVENT_CHANNEL
            .0
            .send(WorkflowCreationEvent::new(input))?;
        Ok(workflow_id)
    }

    /// Gets the workflow by workflow id.
    pub fn get_execution_status(workflow_id: &str, include_tasks: bool) -> SgResult<Workflow> {
        ExecutionService::get_execution_status(workflow_id, include_tasks)
    }

    /// Retrieves ids of all the running workflows of a given type.
    pub fn get_running_workflows(workflow_name: &str) -> Vec<InlineStr> {
        ExecutionService::get_running_workflows(workflow_name)
    }

    /// Re-evaluates the workflow once, outside its periodic sweep.
    pub fn decide_workflow(workflow_id: &InlineStr) -> SgResult<()> {
        WorkflowExecutor::decide_workflow(workflow_id)
    }

    /// Pauses the workflow: the decider produces no further transitions until
    /// it is resumed.
    pub fn pause_workflow(workflow_id: &InlineStr) -> SgResult<()> {
        let mut workflow = ExecutionDaoFacade::get_workflow_model(workflow_id, true)?;
        if workflow.status.is_terminal() {
            return fmt_err!(
                Conflict,
                "Workflow id {} has ended, status cannot be updated.",
                workflow_id
            );
        }
        if workflow.status == WorkflowStatus::Paused {
            return Ok(());
        }
        workflow.status = WorkflowStatus::Paused;
        ExecutionDaoFacade::update_workflow(&mut workflow);
        Ok(())
    }

    /// Resumes a paused workflow and re-evaluates it immediately.
    pub fn resume_workflow(workflow_id: &InlineStr) -> SgResult<()> {
        let mut workflow = ExecutionDaoFacade::get_workflow_model(workflow_id, true)?;
        if workflow.status != WorkflowStatus::Paused {
            return fmt_err!(
                Conflict,
                "The workflow {} is not PAUSED so cannot be resumed. Current status is {}",
                workflow_id,
                workflow.status.as_ref()
            );
        }
        workflow.status = WorkflowStatus::Running;
        ExecutionDaoFacade::update_workflow(&mut workflow);
        WorkflowExecutor::decide_workflow(workflow_id)
    }

    /// Terminates the workflow execution with the given reason.
    pub fn terminate_workflow(workflow_id: &InlineStr, reason: &str) -> SgResult<()> {
        WorkflowExecutor::terminate_workflow(workflow_id, reason.into())
    }

    /// Skips a given task from a currently running workflow.
    pub fn skip_task_from_workflow(
        workflow_id: &InlineStr,
        task_reference_name: &str,
        skip_task_request: Option<SkipTaskRequest>,
    ) -> SgResult<()> {
        WorkflowExecutor::skip_task_from_workflow(
            workflow_id,
            task_reference_name,
            skip_task_request,
        )
    }

    /// Removes the workflow from the system.
    pub fn delete_workflow(workflow_id: &InlineStr) {
        ExecutionDaoFacade::remove_workflow(workflow_id);
    }
}
