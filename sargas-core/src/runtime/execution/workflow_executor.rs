use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::{SkipTaskRequest, TaskResult, TaskResultStatus, WorkflowDef};

use super::tasks::SystemTaskRegistry;
use super::{terminate_workflow_exception, DeciderService, StartWorkflowInput, EVAL_EVENT_CHANNEL};
use crate::dao::{MetadataDao, QueueDao};
use crate::metrics::Monitors;
use crate::model::{TaskModel, TaskStatus, WorkflowModel, WorkflowStatus};
use crate::runtime::dal::ExecutionDaoFacade;
use crate::runtime::event::WorkflowEvaluationEvent;
use crate::utils::{
    ExternalPayloadStorageUtils, IdGenerator, ParametersUtils, PayloadType, QueueUtils,
};

/// Drives workflow executions: starts them, applies worker updates, runs the
/// decider and persists its outcome. This is the single writer of terminal
/// transitions; callers must serialize invocations per workflow id.
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    pub fn start_workflow(input: StartWorkflowInput) -> SgResult<InlineStr> {
        let workflow_def = Self::resolve_start_definition(&input)?;

        let workflow_id = if input.workflow_id.is_empty() {
            IdGenerator::generate()
        } else {
            input.workflow_id.clone()
        };
        let mut workflow = WorkflowModel::new(workflow_id.clone(), &workflow_def, &input);

        if input.external_input_payload_storage_path.trim().is_empty() {
            let mut workflow_input = input.workflow_input;
            ParametersUtils::get_workflow_input(&workflow_def, &mut workflow_input);
            workflow.input = workflow_input;
            ExternalPayloadStorageUtils::verify_and_upload_workflow(
                &mut workflow,
                PayloadType::WorkflowInput,
            )?;
        } else {
            workflow.external_input_payload_storage_path =
                input.external_input_payload_storage_path;
        }

        ExecutionDaoFacade::create_workflow(&mut workflow)?;
        info!("Started workflow: {}", workflow.to_short_string());

        EVAL_EVENT_CHANNEL
            .0
            .send(WorkflowEvaluationEvent::new(workflow_id.clone()))?;
        Ok(workflow_id)
    }

    fn resolve_start_definition(input: &StartWorkflowInput) -> SgResult<WorkflowDef> {
        if let Some(workflow_def) = input.workflow_definition.clone() {
            // adhoc definition: register it so later lookups resolve
            MetadataDao::update_workflow_def(workflow_def.clone());
            return Ok(workflow_def);
        }
        match input.version {
            Some(version) => {
                MetadataDao::get_workflow_def(&input.name, version).ok_or_else(|| {
                    ErrorCode::NotFound(format!(
                        "No such workflow definition found by name: {}, version: {}",
                        input.name, version
                    ))
                })
            }
            None => MetadataDao::get_latest_workflow_def(&input.name).ok_or_else(|| {
                ErrorCode::NotFound(format!(
                    "No such workflow definition found by name: {}",
                    input.name
                ))
            }),
        }
    }

    pub fn decide_workflow(workflow_id: &InlineStr) -> SgResult<()> {
        let workflow = ExecutionDaoFacade::get_workflow_model(workflow_id, true)?;
        Self::decide(workflow)
    }

    /// Evaluates the workflow once and persists the outcome. Re-enters itself
    /// while inline system tasks keep changing the state.
    ///
    /// Note: this method does not acquire the per-workflow lock and should
    /// only be called where evaluations on this workflow id are serialized.
    pub fn decide(mut workflow: WorkflowModel) -> SgResult<()> {
        if workflow.status.is_terminal() {
            if !workflow.status.is_successful() {
                Self::cancel_non_terminal_tasks(&mut workflow)?;
            }
            return Ok(());
        }

        let workflow_def = Self::resolve_workflow_def(&workflow)?;
        let start = Utc::now().timestamp_millis();
        match DeciderService::decide(&mut workflow, &workflow_def) {
            Ok(outcome) => {
                Monitors::record_workflow_decision_time(Utc::now().timestamp_millis() - start);
                if outcome.is_complete {
                    Self::complete_workflow(&mut workflow)?;
                    return Ok(());
                }

                let mut tasks_to_be_scheduled = outcome.tasks_to_be_scheduled;
                Self::set_task_domains(&workflow, &mut tasks_to_be_scheduled);

                let (created_task_idx, outcome_task_idx) =
                    Self::dedup_and_add_tasks(&mut workflow, tasks_to_be_scheduled);

                let mut state_changed = Self::schedule_tasks(&mut workflow, &created_task_idx)?;

                // inline system tasks already in the workflow are evaluated on
                // every pass until they reach a terminal state
                for &idx in &outcome_task_idx {
                    if created_task_idx.contains(&idx) {
                        continue;
                    }
                    let mut task = workflow.tasks[idx].clone();
                    if !task.status.is_terminal()
                        && SystemTaskRegistry::is_system_task(&task.task_type)
                    {
                        let system_task = SystemTaskRegistry::get(&task.task_type)?;
                        if !system_task.is_async() && system_task.execute(&workflow, &mut task) {
                            workflow.tasks[idx] = task;
                            ExecutionDaoFacade::update_task(&mut workflow.tasks[idx]);
                            state_changed = true;
                        }
                    }
                }

                let has_updates = !outcome.tasks_to_be_updated.is_empty();
                for updated in &outcome.tasks_to_be_updated {
                    if let Some(idx) = workflow
                        .tasks
                        .iter()
                        .position(|x| x.task_id == updated.task_id)
                    {
                        ExecutionDaoFacade::update_task(&mut workflow.tasks[idx]);
                    }
                }
                for requeued in &outcome.tasks_to_be_requeued {
                    Self::add_task_to_queue(requeued)?;
                }

                if state_changed {
                    return Self::decide(workflow);
                }

                if has_updates || !created_task_idx.is_empty() {
                    ExecutionDaoFacade::update_workflow(&mut workflow);
                }

                Ok(())
            }
            Err(e) if e.code() == ErrorCode::TERMINATE_WORKFLOW_CODE => {
                info!(
                    "Execution terminated of workflow: {}, reason: {}",
                    workflow.workflow_id,
                    e.message()
                );
                let status = terminate_workflow_exception::STATUS
                    .with(|x| x.take())
                    .unwrap_or(WorkflowStatus::Failed);
                let task = terminate_workflow_exception::TASK.with(|x| x.take());
                Self::terminate(&mut workflow, status, task, e.message().into())?;
                Ok(())
            }
            Err(e) => {
                error!(
                    "Error deciding workflow: {}, error: {}",
                    workflow.workflow_id, e
                );
                Err(e)
            }
        }
    }

    fn resolve_workflow_def(workflow: &WorkflowModel) -> SgResult<WorkflowDef> {
        MetadataDao::get_workflow_def(&workflow.workflow_type, workflow.version).ok_or_else(|| {
            ErrorCode::NotFound(format!(
                "No such workflow definition found by name: {}, version: {}",
                workflow.workflow_type, workflow.version
            ))
        })
    }

    pub fn complete_workflow(workflow: &mut WorkflowModel) -> SgResult<()> {
        debug!("Completing workflow execution for {}", workflow.workflow_id);

        if workflow.status == WorkflowStatus::Completed {
            // remove from the sweep queue
            QueueDao::remove(QueueDao::DECIDER_QUEUE, &workflow.workflow_id)?;
            ExecutionDaoFacade::remove_from_pending_workflow(
                &workflow.workflow_type,
                &workflow.workflow_id,
            );
            debug!(
                "Workflow: {} has already been completed.",
                workflow.workflow_id
            );
            return Ok(());
        }

        if workflow.status.is_terminal() {
            return fmt_err!(
                Conflict,
                "Workflow is already in terminal state. Current status: {}",
                workflow.status.as_ref()
            );
        }

        DeciderService::update_workflow_output(workflow, None)?;

        workflow.status = WorkflowStatus::Completed;
        Self::collect_failed_task_names(workflow);
        ExecutionDaoFacade::update_workflow(workflow);
        Monitors::record_workflow_completion(
            &workflow.workflow_type,
            workflow.end_time - workflow.create_time,
        );
        debug!("Completed workflow execution for {}", workflow.workflow_id);

        Self::cancel_non_terminal_tasks(workflow)?;
        Ok(())
    }

    pub fn terminate_workflow(workflow_id: &InlineStr, reason: InlineStr) -> SgResult<()> {
        let mut workflow = ExecutionDaoFacade::get_workflow_model(workflow_id, true)?;
        if workflow.status == WorkflowStatus::Completed {
            str_err!(Conflict, "Cannot terminate a COMPLETED workflow.")
        } else {
            Self::terminate(&mut workflow, WorkflowStatus::Terminated, None, reason)
        }
    }

    fn terminate(
        workflow: &mut WorkflowModel,
        status: WorkflowStatus,
        task: Option<TaskModel>,
        reason: InlineStr,
    ) -> SgResult<()> {
        if !workflow.status.is_terminal() {
            workflow.status = status;
        }

        if let Some(task) = &task {
            if workflow.failed_task_id.is_empty() {
                workflow.failed_task_id = task.task_id.clone();
            }
        }

        if let Err(e) = DeciderService::update_workflow_output(workflow, task.as_ref()) {
            // the workflow terminates regardless of a failed output update
            error!(
                "Failed to update output data for workflow: {}, error: {}",
                workflow.workflow_id,
                e.message()
            );
            Monitors::error("WorkflowExecutor", "terminate");
        }

        workflow.reason_for_incompletion = reason.clone();
        Self::collect_failed_task_names(workflow);

        // persist the offending task exactly as the decider left it
        if let Some(mut task) = task {
            if let Some(idx) = workflow
                .tasks
                .iter()
                .position(|x| x.task_id == task.task_id)
            {
                workflow.tasks[idx] = task;
                ExecutionDaoFacade::update_task(&mut workflow.tasks[idx]);
            } else {
                ExecutionDaoFacade::update_task(&mut task);
            }
        }

        ExecutionDaoFacade::update_workflow(workflow);
        Monitors::record_workflow_termination(&workflow.workflow_type, workflow.status);
        info!(
            "Workflow {} is terminated because of {}",
            workflow.workflow_id, workflow.reason_for_incompletion
        );

        // Remove the tasks from the task queues if they were there
        for task in &workflow.tasks {
            if let Err(e) = QueueDao::remove(
                QueueUtils::get_queue_name_by_task_model(task).as_str(),
                &task.task_id,
            ) {
                warn!(
                    "Error removing task(s) from queue during workflow termination: {}, error: {}",
                    workflow.workflow_id, e
                );
            }
        }

        ExecutionDaoFacade::remove_from_pending_workflow(
            &workflow.workflow_type,
            &workflow.workflow_id,
        );
        Self::cancel_non_terminal_tasks(workflow)?;
        Ok(())
    }

    fn cancel_non_terminal_tasks(workflow: &mut WorkflowModel) -> SgResult<()> {
        for task in workflow.tasks.iter_mut() {
            if !task.status.is_terminal() {
                // Cancel the ones which are not completed yet....
                task.status = TaskStatus::Canceled;
                ExecutionDaoFacade::update_task(task);
            }
        }
        if let Err(e) = QueueDao::remove(QueueDao::DECIDER_QUEUE, &workflow.workflow_id) {
            error!(
                "Error removing workflow: {} from decider queue, error: {}",
                workflow.workflow_id, e
            );
        }
        Ok(())
    }

    fn collect_failed_task_names(workflow: &mut WorkflowModel) {
        let failed_ref_names = workflow
            .tasks
            .iter()
            .filter(|x| x.status == TaskStatus::Failed)
            .map(|x| x.reference_task_name.clone())
            .collect::<HashSet<_>>();
        workflow.failed_reference_task_names.extend(failed_ref_names);
    }

    /// Applies a worker-reported result to its task and re-evaluates the
    /// workflow. Terminal transitions happen only here.
    pub fn update_task(task_result: TaskResult) -> SgResult<()> {
        let workflow_id = task_result.workflow_instance_id.clone();
        let workflow_status = ExecutionDaoFacade::get_workflow_status(&workflow_id)
            .ok_or_else(|| {
                ErrorCode::NotFound(format!("No such workflow found by id: {}", workflow_id))
            })?;
        let mut task = ExecutionDaoFacade::get_task(&task_result.task_id).ok_or_else(|| {
            ErrorCode::NotFound(format!("No such task found by id: {}", task_result.task_id))
        })?;
        let queue_name = QueueUtils::get_queue_name_by_task_model(&task);

        if workflow_status.is_terminal() {
            // the workflow has been finished; release the queue slot and keep
            // the logs, the task state is left as-is
            warn!(
                "Workflow: {} is in terminal state {:?}, task: {} update dropped",
                workflow_id,
                workflow_status.as_ref(),
                task.task_id
            );
            QueueDao::remove(&queue_name, &task.task_id)?;
            ExecutionDaoFacade::add_task_exec_logs(task_result.logs);
            return Ok(());
        }

        if task.status.is_terminal() {
            // the task has already reached a terminal state, e.g. a belated
            // worker responding after a timeout
            info!(
                "Task: {} has already finished with status: {}, update dropped",
                task.task_id,
                task.status.as_ref()
            );
            Monitors::record_update_conflict(&task.task_type, &task.workflow_type, task.status);
            QueueDao::remove(&queue_name, &task.task_id)?;
            return Ok(());
        }

        task.status = match task_result.status {
            TaskResultStatus::InProgress => TaskStatus::InProgress,
            TaskResultStatus::Canceled => TaskStatus::Canceled,
            TaskResultStatus::Failed => TaskStatus::Failed,
            TaskResultStatus::Completed => TaskStatus::Completed,
        };
        task.worker_id = task_result.worker_id;
        task.reason_for_incompletion = task_result.reason_for_incompletion;
        task.callback_after_seconds = task_result.callback_after_seconds;
        if !task_result.sub_workflow_id.is_empty() {
            task.sub_workflow_id = task_result.sub_workflow_id;
        }

        if !task_result
            .external_output_payload_storage_path
            .trim()
            .is_empty()
        {
            task.external_output_payload_storage_path =
                task_result.external_output_payload_storage_path;
            task.output_data = HashMap::default();
        } else {
            task.output_data = task_result.output_data;
            ExternalPayloadStorageUtils::verify_and_upload_task(
                &mut task,
                PayloadType::TaskOutput,
            )?;
        }

        if task.status.is_terminal() {
            task.end_time = Utc::now().timestamp_millis();
            QueueDao::remove(&queue_name, &task.task_id)?;
            Monitors::record_task_execution_time(
                &task.task_def_name,
                task.end_time - task.start_time,
                false,
                task.status,
            );
        } else {
            // the reservation is pushed back so the task is redelivered after
            // the callback; while it sits in the queue the response timeout
            // stays silent
            QueueDao::postpone(&queue_name, &task.task_id, task.callback_after_seconds.max(0))?;
        }

        ExecutionDaoFacade::update_task(&mut task);
        ExecutionDaoFacade::add_task_exec_logs(task_result.logs);

        Self::decide_workflow(&workflow_id)
    }

    /// Records a task of a running workflow as SKIPPED before it is reached,
    /// so the decider walks past it.
    pub fn skip_task_from_workflow(
        workflow_id: &InlineStr,
        task_reference_name: &str,
        skip_task_request: Option<SkipTaskRequest>,
    ) -> SgResult<()> {
        let mut workflow = ExecutionDaoFacade::get_workflow_model(workflow_id, true)?;
        if workflow.status.is_terminal() {
            return fmt_err!(
                Conflict,
                "Workflow is in terminal state. Status = {}",
                workflow.status.as_ref()
            );
        }

        let workflow_def = Self::resolve_workflow_def(&workflow)?;
        let workflow_task = workflow_def
            .get_task_by_ref_name(task_reference_name)
            .ok_or_else(|| {
                ErrorCode::InvalidInput(format!(
                    "The task referenced by {} does not exist in the workflow definition {}",
                    task_reference_name, workflow.workflow_type
                ))
            })?;
        if workflow
            .get_task_by_ref_name(task_reference_name)?
            .is_some()
        {
            return fmt_err!(
                Conflict,
                "The task referenced {} has already been processed, cannot be skipped",
                task_reference_name
            );
        }

        let mut task = TaskModel::new(TaskStatus::Skipped);
        task.task_id = IdGenerator::generate();
        task.reference_task_name = task_reference_name.into();
        task.task_type = workflow_task.type_.clone();
        task.task_def_name = workflow_task.name.clone();
        task.workflow_instance_id = workflow.workflow_id.clone();
        task.workflow_type = workflow.workflow_type.clone();
        task.correlation_id = workflow.correlation_id.clone();
        task.workflow_task = Some(workflow_task.clone());
        if let Some(skip_task_request) = skip_task_request {
            task.input_data = skip_task_request.task_input;
            task.output_data = skip_task_request.task_output;
        }

        ExecutionDaoFacade::create_task(&mut task)?;
        workflow.tasks.push(task);

        Self::decide(workflow)
    }

    fn dedup_and_add_tasks(
        workflow: &mut WorkflowModel,
        tasks: Vec<TaskModel>,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut created_task_idx = Vec::with_capacity(tasks.len());
        let mut outcome_task_idx = Vec::with_capacity(tasks.len());
        for task in tasks {
            if let Some(idx) = workflow
                .tasks
                .iter()
                .position(|x| x.get_task_key().eq(&task.get_task_key()))
            {
                outcome_task_idx.push(idx);
            } else {
                workflow.tasks.push(task);
                let idx = workflow.tasks.len() - 1;
                created_task_idx.push(idx);
                outcome_task_idx.push(idx);
            }
        }
        (created_task_idx, outcome_task_idx)
    }

    fn schedule_tasks(workflow: &mut WorkflowModel, created_task_idx: &[usize]) -> SgResult<bool> {
        if created_task_idx.is_empty() {
            return Ok(false);
        }

        // continue the sequence numbering from the highest seen
        let mut count = workflow.tasks.iter().map(|x| x.seq).max().unwrap_or(0);
        for &idx in created_task_idx {
            if workflow.tasks[idx].seq == 0 {
                count += 1;
                workflow.tasks[idx].seq = count;
            }
        }

        let mut started_system_tasks = false;
        for &idx in created_task_idx {
            ExecutionDaoFacade::create_task(&mut workflow.tasks[idx])?;
        }

        for &idx in created_task_idx {
            let mut task = workflow.tasks[idx].clone();
            if task.status.is_terminal() {
                // terminal at creation, e.g. the FORK marker; nothing to run
                continue;
            }

            if SystemTaskRegistry::is_system_task(&task.task_type) {
                let system_task = SystemTaskRegistry::get(&task.task_type)?;
                if task.start_time == 0 {
                    task.start_time = Utc::now().timestamp_millis();
                }
                if !system_task.is_async() {
                    system_task.start(&workflow, &mut task);
                    started_system_tasks = true;
                    workflow.tasks[idx] = task;
                    ExecutionDaoFacade::update_task(&mut workflow.tasks[idx]);
                } else {
                    workflow.tasks[idx] = task;
                    Self::add_task_to_queue(&workflow.tasks[idx])?;
                }
            } else {
                // On queue push failures the sweep re-publishes the message,
                // so the error is only logged
                if let Err(e) = Self::add_task_to_queue(&task) {
                    warn!(
                        "Error pushing task: {} to the queue for workflow: {}, error: {}",
                        task.task_id, workflow.workflow_id, e
                    );
                    Monitors::error("WorkflowExecutor", "scheduleTasks");
                }
            }
        }

        Ok(started_system_tasks)
    }

    pub fn add_task_to_queue(task: &TaskModel) -> SgResult<()> {
        let task_queue_name = QueueUtils::get_queue_name_by_task_model(task);
        QueueDao::push(
            &task_queue_name,
            &task.task_id,
            task.callback_after_seconds.max(0),
        );
        debug!(
            "Added task {} to queue {} with call back seconds {}",
            task.task_id, task_queue_name, task.callback_after_seconds
        );
        Ok(())
    }

    fn set_task_domains(workflow: &WorkflowModel, tasks: &mut [TaskModel]) {
        let task_to_domain = &workflow.task_to_domain;
        if task_to_domain.is_empty() {
            return;
        }
        for task in tasks.iter_mut() {
            if SystemTaskRegistry::is_system_task(&task.task_type) {
                continue;
            }
            let domain = task_to_domain
                .get(&task.task_type)
                .or_else(|| task_to_domain.get(&InlineStr::from("*")));
            if let Some(domain) = domain {
                // the first domain of the ordered list is used; per-domain
                // worker liveness is not tracked here
                task.domain = domain
                    .split(',')
                    .next()
                    .map(|x| x.trim())
                    .unwrap_or_default()
                    .into();
            }
        }
    }
}
