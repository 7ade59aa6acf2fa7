use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::TaskExecLog;

use crate::config::Properties;
use crate::dao::{ExecutionDao, IndexDao, QueueDao};
use crate::model::{TaskModel, TaskSummary, Workflow, WorkflowModel, WorkflowSummary};
use crate::utils::{ExternalPayloadStorageUtils, PayloadType};
use crate::WorkflowStatus;

/// Facade over the execution, queue and index stores. Bookkeeping that has to
/// happen around every read/write - timestamps, indexing, the decider-queue
/// membership - lives here, not in the DAOs.
pub struct ExecutionDaoFacade;

impl ExecutionDaoFacade {
    /// ******************************************
    /// *************** Workflow *****************
    /// ******************************************

    pub fn get_workflow_model(
        workflow_id: &InlineStr,
        include_tasks: bool,
    ) -> SgResult<WorkflowModel> {
        ExecutionDao::get_workflow_include_tasks(workflow_id, include_tasks).ok_or_else(|| {
            ErrorCode::NotFound(format!("No such workflow found by id: {}", workflow_id))
        })
    }

    pub fn get_workflow(workflow_id: &InlineStr, include_tasks: bool) -> SgResult<Workflow> {
        Ok(Self::get_workflow_model(workflow_id, include_tasks)?.to_workflow())
    }

    pub fn get_workflow_status(workflow_id: &InlineStr) -> Option<WorkflowStatus> {
        ExecutionDao::get_workflow_status(workflow_id)
    }

    /// Creates a new workflow in the data store and registers it for the
    /// periodic evaluation sweep.
    pub fn create_workflow(workflow: &mut WorkflowModel) -> SgResult<()> {
        ExternalPayloadStorageUtils::verify_and_upload_workflow(
            workflow,
            PayloadType::WorkflowInput,
        )?;
        ExecutionDao::create_workflow(workflow);

        QueueDao::push(
            QueueDao::DECIDER_QUEUE,
            &workflow.workflow_id,
            Properties::get().workflow_offset_timeout_sec,
        );
        IndexDao::index_workflow(WorkflowSummary::new(workflow));
        Ok(())
    }

    pub fn update_workflow(workflow: &mut WorkflowModel) {
        workflow.updated_time = Utc::now().timestamp_millis();
        if workflow.status.is_terminal() {
            workflow.end_time = Utc::now().timestamp_millis();
        }
        ExecutionDao::update_workflow(workflow);
        IndexDao::index_workflow(WorkflowSummary::new(workflow));
    }

    pub fn remove_from_pending_workflow(workflow_type: &InlineStr, workflow_id: &InlineStr) {
        ExecutionDao::remove_from_pending_workflow(workflow_type, workflow_id);
    }

    pub fn get_running_workflow_ids(workflow_type: &str) -> Vec<InlineStr> {
        ExecutionDao::get_running_workflow_ids(workflow_type)
    }

    pub fn remove_workflow(workflow_id: &InlineStr) {
        ExecutionDao::remove_workflow(workflow_id);
        IndexDao::remove_workflow(workflow_id);
    }

    /// ******************************************
    /// *************** Task *********************
    /// ******************************************

    pub fn get_task(task_id: &str) -> Option<TaskModel> {
        ExecutionDao::get_task(task_id)
    }

    pub fn create_task(task: &mut TaskModel) -> SgResult<bool> {
        let created = ExecutionDao::create_task(task)?;
        if created {
            IndexDao::index_task(TaskSummary::new(task));
        }
        Ok(created)
    }

    pub fn update_task(task: &mut TaskModel) {
        task.update_time = Utc::now().timestamp_millis();
        if task.status.is_terminal() && task.end_time == 0 {
            task.end_time = Utc::now().timestamp_millis();
        }
        ExecutionDao::update_task(task);
        IndexDao::index_task(TaskSummary::new(task));
    }

    pub fn get_pending_tasks_for_task_type(task_type: &str) -> Vec<TaskModel> {
        ExecutionDao::get_pending_tasks_for_task_type(task_type)
    }

    pub fn exceeds_in_progress_limit(task: &TaskModel) -> bool {
        ExecutionDao::exceeds_in_progress_limit(task)
    }

    pub fn add_task_exec_logs(logs: Vec<TaskExecLog>) {
        if logs.is_empty() {
            return;
        }
        IndexDao::add_task_execution_logs(logs);
    }

    pub fn get_task_exec_logs(task_id: &str) -> Vec<TaskExecLog> {
        IndexDao::get_task_execution_logs(task_id)
    }
}
