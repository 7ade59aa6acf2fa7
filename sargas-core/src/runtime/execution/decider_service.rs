use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::{RetryLogic, TaskDef, TaskType, TimeoutPolicy, WorkflowDef, WorkflowTask};

use super::terminate_workflow_exception;
use crate::dao::{MetadataDao, QueueDao};
use crate::metrics::Monitors;
use crate::model::{TaskModel, TaskStatus, WorkflowModel, WorkflowStatus};
use crate::runtime::execution::mapper::{TaskMapperContext, TaskMapperRegistry};
use crate::utils::{
    ExternalPayloadStorageUtils, IdGenerator, ParametersUtils, PayloadOperation, PayloadType,
    QueueUtils,
};

/// Evaluates the state of the workflow by inspecting the current state along
/// with the blueprint. The result of the evaluation is either to schedule
/// further tasks, complete/fail the workflow or do nothing. The evaluation is
/// side-effect free: everything to persist is returned in the outcome, and
/// the caller serializes evaluations per workflow id.
pub struct DeciderService;

impl DeciderService {
    pub fn decide(
        workflow: &mut WorkflowModel,
        workflow_def: &WorkflowDef,
    ) -> SgResult<DeciderOutcome> {
        workflow.schema_version = workflow_def.schema_version;

        // In case of a new workflow the list of tasks will be empty.
        // Filter the list of tasks and include only tasks that are not
        // executed, not marked to be skipped and not ready for rerun.
        let has_unprocessed_tasks = workflow.tasks.iter().any(|t| {
            t.status != TaskStatus::Skipped && t.status != TaskStatus::ReadyForRerun && !t.executed
        });

        let mut pre_scheduled_tasks = Vec::default();
        if !has_unprocessed_tasks {
            // this is the flow that a new workflow (or a re-run) goes through
            pre_scheduled_tasks = Self::start_workflow(workflow, workflow_def)?;
        }
        Self::decide_with(workflow, workflow_def, pre_scheduled_tasks)
    }

    fn decide_with(
        workflow: &mut WorkflowModel,
        workflow_def: &WorkflowDef,
        pre_scheduled_tasks: Vec<TaskModel>,
    ) -> SgResult<DeciderOutcome> {
        let mut outcome = DeciderOutcome::new();

        if workflow.status == WorkflowStatus::Paused {
            debug!("Workflow {} is paused", workflow.workflow_id);
            return Ok(outcome);
        }

        if workflow.status.is_terminal() {
            // you cannot evaluate a terminal workflow
            warn!(
                "Workflow {} is already finished. status={}, reason={}",
                workflow.workflow_id,
                workflow.status.as_ref(),
                workflow.reason_for_incompletion
            );
            return Ok(outcome);
        }

        // Tasks that have not yet completed their lifecycle: not retried, not
        // skipped, not executed - and every built-in DECISION/FORK/JOIN task
        // regardless, so the control-flow nodes are re-evaluated each pass.
        // Both lists are empty for a new workflow being started.
        let mut pending_task_idx = Vec::default();
        let mut executed_task_ref_names = HashSet::new();
        for (idx, task) in workflow.tasks.iter().enumerate() {
            if (!task.retried && task.status != TaskStatus::Skipped && !task.executed)
                || TaskType::is_builtin(&task.task_type)
            {
                pending_task_idx.push(idx);
            }
            if task.executed {
                executed_task_ref_names.insert(task.reference_task_name.clone());
            }
        }

        // Insertion order of this list defines the order tasks are emitted in;
        // on a reference-name collision the first insert wins.
        let mut tasks_to_be_scheduled: Vec<TaskModel> = Vec::default();
        for pre_scheduled_task in pre_scheduled_tasks {
            Self::put_if_absent(&mut tasks_to_be_scheduled, pre_scheduled_task);
        }

        // A new workflow does not enter this loop
        for idx in pending_task_idx {
            let mut pending_task = workflow.tasks[idx].clone();
            let evaluated = Self::evaluate_pending_task(
                workflow,
                workflow_def,
                &mut pending_task,
                &mut tasks_to_be_scheduled,
                &mut executed_task_ref_names,
                &mut outcome,
            );
            // write the mutations back before an error can propagate, so the
            // executor persists the task exactly as the decider left it
            workflow.tasks[idx] = pending_task;
            evaluated?;
        }

        let un_scheduled_tasks = tasks_to_be_scheduled
            .into_iter()
            .filter(|x| !executed_task_ref_names.contains(&x.reference_task_name))
            .collect::<Vec<_>>();
        if !un_scheduled_tasks.is_empty() {
            debug!(
                "Scheduling Tasks: {:?} for workflow: {}",
                un_scheduled_tasks
                    .iter()
                    .map(|x| &x.task_def_name)
                    .collect::<Vec<_>>(),
                workflow.workflow_id
            );
            outcome.tasks_to_be_scheduled.extend(un_scheduled_tasks);
        }

        if outcome.tasks_to_be_scheduled.is_empty()
            && Self::check_for_workflow_completion(workflow, workflow_def)?
        {
            debug!("Marking workflow: {} as complete.", workflow.workflow_id);
            outcome.is_complete = true;
        }

        Ok(outcome)
    }

    fn evaluate_pending_task(
        workflow: &mut WorkflowModel,
        workflow_def: &WorkflowDef,
        pending_task: &mut TaskModel,
        tasks_to_be_scheduled: &mut Vec<TaskModel>,
        executed_task_ref_names: &mut HashSet<InlineStr>,
        outcome: &mut DeciderOutcome,
    ) -> SgResult<()> {
        if TaskType::is_builtin(&pending_task.task_type) && !pending_task.status.is_terminal() {
            Self::put_if_absent(tasks_to_be_scheduled, pending_task.clone());
            executed_task_ref_names.remove(&pending_task.reference_task_name);
        }

        let task_definition = Self::resolve_task_definition(pending_task);
        match task_definition.as_ref() {
            Some(task_definition) => {
                Self::check_for_timeout(task_definition, pending_task)?;
                // If the task has not been updated for responseTimeoutSeconds
                // then mark it as TIMED_OUT
                if Self::is_response_timed_out(task_definition, pending_task) {
                    Self::timeout_task(task_definition, pending_task);
                }
            }
            None => {
                warn!(
                    "missing task definition: {}, workflowId={}",
                    pending_task.task_def_name, pending_task.workflow_instance_id
                );
            }
        }

        // only a task that finished unsuccessfully is repaired here; anything
        // still running is left alone
        if pending_task.status.is_terminal() && !pending_task.status.is_successful() {
            let workflow_task = pending_task.workflow_task.clone().or_else(|| {
                workflow_def
                    .get_task_by_ref_name(&pending_task.reference_task_name)
                    .cloned()
            });
            if workflow_task.as_ref().map(|x| x.optional).unwrap_or(false) {
                pending_task.status = TaskStatus::CompletedWithErrors;
            } else {
                let retry_task = Self::retry(
                    task_definition.as_ref(),
                    workflow_task.as_ref(),
                    pending_task,
                    workflow,
                )?;
                executed_task_ref_names.remove(&retry_task.reference_task_name);
                Self::put(tasks_to_be_scheduled, retry_task);
                outcome.tasks_to_be_updated.push(pending_task.clone());
            }
        }

        if !pending_task.executed && !pending_task.retried && pending_task.status.is_terminal() {
            pending_task.executed = true;
            let next_tasks = Self::get_next_task(workflow_def, workflow, pending_task)?;
            debug!(
                "Scheduling Tasks from {}, next = {:?} for workflowId: {}",
                pending_task.task_def_name,
                next_tasks
                    .iter()
                    .map(|x| &x.task_def_name)
                    .collect::<Vec<_>>(),
                workflow.workflow_id
            );
            for next_task in next_tasks {
                Self::put_if_absent(tasks_to_be_scheduled, next_task);
            }
            outcome.tasks_to_be_updated.push(pending_task.clone());
        }

        Ok(())
    }

    fn start_workflow(
        workflow: &mut WorkflowModel,
        workflow_def: &WorkflowDef,
    ) -> SgResult<Vec<TaskModel>> {
        debug!("Starting workflow: {}", workflow.to_short_string());

        // Check if the workflow is a re-run case or a new workflow execution
        if workflow.re_run_from_workflow_id.is_empty() || workflow.tasks.is_empty() {
            if workflow_def.tasks.is_empty() {
                terminate_workflow_exception::STATUS
                    .with(|x| x.replace(Some(WorkflowStatus::Completed)));
                return fmt_err!(TerminateWorkflow, "No tasks found to be executed");
            }

            // Nothing is running yet - so schedule the first task.
            // Loop until a non-skipped task is found.
            let mut task_to_schedule = workflow_def.tasks.first();
            while Self::is_task_skipped(task_to_schedule, workflow)? {
                task_to_schedule = workflow_def.get_next_task(
                    &task_to_schedule
                        .expect("not skipped means not none")
                        .task_reference_name,
                );
            }

            let task_to_schedule = match task_to_schedule {
                Some(task_to_schedule) => task_to_schedule,
                None => return Ok(Vec::default()),
            };
            return Self::get_tasks_to_be_scheduled(workflow_def, workflow, task_to_schedule, 0);
        }

        // re-run: resume from the task that was marked ready
        if let Some(rerun_from_task) = workflow
            .tasks
            .iter_mut()
            .find(|x| x.status == TaskStatus::ReadyForRerun)
        {
            rerun_from_task.status = TaskStatus::Scheduled;
            rerun_from_task.retried = true;
            rerun_from_task.retry_count = 0;
            Ok(vec![rerun_from_task.clone()])
        } else {
            terminate_workflow_exception::STATUS.with(|x| x.take());
            terminate_workflow_exception::TASK.with(|x| x.take());
            fmt_err!(
                TerminateWorkflow,
                "The workflow {} is marked for re-run from {} but could not find the starting task",
                workflow.workflow_id,
                workflow.re_run_from_workflow_id
            )
        }
    }

    /// Updates the workflow output. When the definition declares output
    /// parameters they are resolved against a payload-populated copy;
    /// otherwise the output of `task` (or the last task) is carried over.
    pub fn update_workflow_output(
        workflow: &mut WorkflowModel,
        task: Option<&TaskModel>,
    ) -> SgResult<()> {
        if workflow.tasks.is_empty() {
            return Ok(());
        }

        let last = task
            .or_else(|| workflow.tasks.last())
            .expect("tasks not empty")
            .clone();
        let workflow_def = MetadataDao::get_workflow_def(&workflow.workflow_type, workflow.version);

        let output = match workflow_def {
            Some(workflow_def) if !workflow_def.output_parameters.is_empty() => {
                let workflow_instance = Self::populate_workflow_and_task_data(workflow)?;
                ParametersUtils::get_task_input_v2(
                    &workflow_def.output_parameters,
                    &workflow_instance,
                    None,
                    None,
                )?
            }
            _ => {
                if !last.external_output_payload_storage_path.trim().is_empty() {
                    let output = ExternalPayloadStorageUtils::download_payload(
                        &last.external_output_payload_storage_path,
                    )?;
                    Monitors::record_external_payload_storage_usage(
                        &last.task_def_name,
                        PayloadOperation::Read.as_ref(),
                        PayloadType::TaskOutput.as_ref(),
                    );
                    output
                } else {
                    last.output_data.clone()
                }
            }
        };

        workflow.output = output;
        ExternalPayloadStorageUtils::verify_and_upload_workflow(
            workflow,
            PayloadType::WorkflowOutput,
        )
    }

    fn check_for_workflow_completion(
        workflow: &WorkflowModel,
        workflow_def: &WorkflowDef,
    ) -> SgResult<bool> {
        if workflow.tasks.is_empty() {
            return Ok(false);
        }

        let mut task_status_map = HashMap::new();
        for task in &workflow.tasks {
            task_status_map.insert(task.reference_task_name.clone(), task.status);
        }

        // no recorded task may still be running
        if !task_status_map.values().all(|x| x.is_terminal()) {
            return Ok(false);
        }

        // every task of the blueprint must have run to a successful end
        let all_completed_successfully = workflow_def.tasks.iter().all(|workflow_task| {
            task_status_map
                .get(&workflow_task.task_reference_name)
                .map(|status| status.is_terminal() && status.is_successful())
                .unwrap_or(false)
        });
        if !all_completed_successfully {
            return Ok(false);
        }

        // and no recorded task may still have an unscheduled successor
        for task in &workflow.tasks {
            if let Some(next_ref_name) =
                Self::get_next_task_ref_name(workflow_def, workflow, task)?
            {
                if !task_status_map.contains_key(&next_ref_name) {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    fn get_next_task(
        workflow_def: &WorkflowDef,
        workflow: &WorkflowModel,
        task: &TaskModel,
    ) -> SgResult<Vec<TaskModel>> {
        // A decision whose branch was chosen at mapping time has children
        // driving the control flow; it contributes no successor of its own.
        if TaskType::Decision.as_ref().eq(task.task_type.as_str())
            && task.input_data.contains_key(&InlineStr::from("hasChildren"))
        {
            return Ok(Vec::default());
        }

        let mut task_to_schedule = workflow_def.get_next_task(&task.reference_task_name);
        while Self::is_task_skipped(task_to_schedule, workflow)? {
            task_to_schedule = workflow_def.get_next_task(
                &task_to_schedule
                    .expect("not skipped means not none")
                    .task_reference_name,
            );
        }

        if let Some(task_to_schedule) = task_to_schedule {
            Self::get_tasks_to_be_scheduled(workflow_def, workflow, task_to_schedule, 0)
        } else {
            Ok(Vec::default())
        }
    }

    fn get_next_task_ref_name(
        workflow_def: &WorkflowDef,
        workflow: &WorkflowModel,
        task: &TaskModel,
    ) -> SgResult<Option<InlineStr>> {
        let mut task_to_schedule = workflow_def.get_next_task(&task.reference_task_name);
        while Self::is_task_skipped(task_to_schedule, workflow)? {
            task_to_schedule = workflow_def.get_next_task(
                &task_to_schedule
                    .expect("not skipped means not none")
                    .task_reference_name,
            );
        }
        Ok(task_to_schedule.map(|x| x.task_reference_name.clone()))
    }

    fn retry(
        task_def: Option<&TaskDef>,
        workflow_task: Option<&WorkflowTask>,
        task: &mut TaskModel,
        workflow: &mut WorkflowModel,
    ) -> SgResult<TaskModel> {
        let retry_count = task.retry_count;
        let expected_retry_count = task_def.map(|x| x.retry_count).unwrap_or(0);

        if !task.status.is_retriable()
            || TaskType::is_builtin(&task.task_type)
            || expected_retry_count <= retry_count
        {
            let status = match task.status {
                TaskStatus::TimedOut => WorkflowStatus::TimedOut,
                _ => WorkflowStatus::Failed,
            };
            Self::update_workflow_output(workflow, Some(task))?;
            terminate_workflow_exception::STATUS.with(|x| x.replace(Some(status)));
            terminate_workflow_exception::TASK.with(|x| x.replace(Some(task.clone())));
            return str_err!(TerminateWorkflow, task.reason_for_incompletion);
        }

        // retry... - but not immediately - put a delay...
        let task_def = task_def.expect("retries left implies a definition");
        let start_delay = match task_def.retry_logic {
            RetryLogic::Fixed => task_def.retry_delay_seconds,
            RetryLogic::ExponentialBackoff => {
                task_def.retry_delay_seconds * (1 + task.retry_count)
            }
        };
        task.retried = true;

        let mut rescheduled = task.clone();
        rescheduled.start_delay_in_seconds = start_delay;
        rescheduled.callback_after_seconds = start_delay as i64;
        rescheduled.retry_count = task.retry_count + 1;
        rescheduled.retried = false;
        rescheduled.task_id = IdGenerator::generate();
        rescheduled.retried_task_id = task.task_id.clone();
        rescheduled.status = TaskStatus::Scheduled;
        rescheduled.poll_count = 0;
        rescheduled.reason_for_incompletion = InlineStr::new();
        rescheduled.worker_id = InlineStr::new();
        rescheduled.sub_workflow_id = InlineStr::new();
        rescheduled.seq = 0;
        rescheduled.scheduled_time = 0;
        rescheduled.start_time = 0;
        rescheduled.end_time = 0;
        rescheduled.update_time = 0;

        rescheduled.input_data = HashMap::default();
        if !task.external_input_payload_storage_path.trim().is_empty() {
            rescheduled.external_input_payload_storage_path =
                task.external_input_payload_storage_path.clone();
        } else {
            rescheduled.input_data.extend(task.input_data.clone());
        }
        if let Some(workflow_task) = workflow_task {
            if workflow.schema_version > 1 {
                let workflow_instance = Self::populate_workflow_and_task_data(workflow)?;
                let task_input = ParametersUtils::get_task_input_v2(
                    &workflow_task.input_parameters,
                    &workflow_instance,
                    Some(task_def),
                    Some(&rescheduled.task_id),
                )?;
                rescheduled.input_data.extend(task_input);
            }
            // for schema version 1, the inputs are not recomputed
        }
        ExternalPayloadStorageUtils::verify_and_upload_task(
            &mut rescheduled,
            PayloadType::TaskInput,
        )?;
        Ok(rescheduled)
    }

    /// Populates the workflow input and the tasks' input/output stored in
    /// external payload storage into a deep copy of the workflow instance.
    pub fn populate_workflow_and_task_data(workflow: &WorkflowModel) -> SgResult<WorkflowModel> {
        let mut workflow_instance = workflow.clone();

        if !workflow.external_input_payload_storage_path.trim().is_empty() {
            let workflow_input = ExternalPayloadStorageUtils::download_payload(
                &workflow.external_input_payload_storage_path,
            )?;
            Monitors::record_external_payload_storage_usage(
                &workflow.workflow_type,
                PayloadOperation::Read.as_ref(),
                PayloadType::WorkflowInput.as_ref(),
            );
            workflow_instance.input = workflow_input;
            workflow_instance.external_input_payload_storage_path = InlineStr::new();
        }

        for task in workflow_instance.tasks.iter_mut() {
            if !task.external_output_payload_storage_path.trim().is_empty() {
                task.output_data = ExternalPayloadStorageUtils::download_payload(
                    &task.external_output_payload_storage_path,
                )?;
                Monitors::record_external_payload_storage_usage(
                    &task.task_def_name,
                    PayloadOperation::Read.as_ref(),
                    PayloadType::TaskOutput.as_ref(),
                );
                task.external_output_payload_storage_path = InlineStr::new();
            }
            if !task.external_input_payload_storage_path.trim().is_empty() {
                task.input_data = ExternalPayloadStorageUtils::download_payload(
                    &task.external_input_payload_storage_path,
                )?;
                Monitors::record_external_payload_storage_usage(
                    &task.task_def_name,
                    PayloadOperation::Read.as_ref(),
                    PayloadType::TaskInput.as_ref(),
                );
                task.external_input_payload_storage_path = InlineStr::new();
            }
        }
        Ok(workflow_instance)
    }

    fn check_for_timeout(task_def: &TaskDef, task: &mut TaskModel) -> SgResult<()> {
        if task.status.is_terminal()
            || task_def.timeout_seconds <= 0
            || task.status != TaskStatus::InProgress
        {
            return Ok(());
        }

        let timeout = 1000 * task_def.timeout_seconds as i64;
        let now = Utc::now().timestamp_millis();
        let elapsed_time = now - (task.start_time + (task.start_delay_in_seconds as i64) * 1000);

        if elapsed_time < timeout {
            return Ok(());
        }

        let reason = format!(
            "Task timed out after {} seconds. Timeout configured as {} seconds. Timeout policy configured to {}",
            elapsed_time / 1000,
            task_def.timeout_seconds,
            task_def.timeout_policy.as_ref()
        );
        Monitors::record_task_timeout(&task.task_def_name);

        match task_def.timeout_policy {
            TimeoutPolicy::AlertOnly => Ok(()),
            TimeoutPolicy::Retry => {
                task.status = TaskStatus::TimedOut;
                task.reason_for_incompletion = reason.into();
                Ok(())
            }
            TimeoutPolicy::TimeOutWf => {
                task.status = TaskStatus::TimedOut;
                task.reason_for_incompletion = reason.as_str().into();
                terminate_workflow_exception::STATUS
                    .with(|x| x.replace(Some(WorkflowStatus::TimedOut)));
                terminate_workflow_exception::TASK.with(|x| x.replace(Some(task.clone())));
                str_err!(TerminateWorkflow, reason)
            }
        }
    }

    fn is_response_timed_out(task_def: &TaskDef, task: &TaskModel) -> bool {
        if task.status != TaskStatus::InProgress || task_def.response_timeout_seconds == 0 {
            return false;
        }

        if QueueDao::exists(
            &QueueUtils::get_queue_name_by_task_model(task),
            &task.task_id,
        ) {
            // the task is present in its queue: it was updated with a
            // callback and no worker is actively holding it
            return false;
        }

        debug!(
            "Evaluating responseTimeOut for Task: {:?}, with Task Definition: {:?}",
            task, task_def
        );
        let response_timeout = 1000 * task_def.response_timeout_seconds as i64;
        let now = Utc::now().timestamp_millis();
        let no_response_time = now - task.update_time;

        if no_response_time < response_timeout {
            debug!(
                "Current responseTime: {} has not exceeded the configured responseTimeout of {} for the Task: {:?}",
                no_response_time, response_timeout, task
            );
            return false;
        }

        Monitors::record_task_response_timeout(&task.task_def_name);
        true
    }

    fn timeout_task(task_def: &TaskDef, task: &mut TaskModel) {
        let reason = format!(
            "responseTimeout: {} exceeded for the taskId: {} with Task Definition: {}",
            task_def.response_timeout_seconds, task.task_id, task.task_def_name
        );
        debug!("{}", reason);
        task.status = TaskStatus::TimedOut;
        task.reason_for_incompletion = reason.into();
    }

    pub fn get_tasks_to_be_scheduled(
        workflow_def: &WorkflowDef,
        workflow: &WorkflowModel,
        task_to_schedule: &WorkflowTask,
        retry_count: i32,
    ) -> SgResult<Vec<TaskModel>> {
        Self::get_tasks_to_be_scheduled_with_retry(
            workflow_def,
            workflow,
            task_to_schedule,
            retry_count,
            "",
        )
    }

    pub fn get_tasks_to_be_scheduled_with_retry(
        workflow_def: &WorkflowDef,
        workflow: &WorkflowModel,
        task_to_schedule: &WorkflowTask,
        retry_count: i32,
        retried_task_id: &str,
    ) -> SgResult<Vec<TaskModel>> {
        let workflow_instance = Self::populate_workflow_and_task_data(workflow)?;
        let input = ParametersUtils::get_task_input(
            &task_to_schedule.input_parameters,
            &workflow_instance,
            None,
            None,
        )?;

        // tasks with the same reference name that are already in progress
        // must not be scheduled again
        let in_progress_tasks = workflow_instance
            .tasks
            .iter()
            .filter(|x| x.status == TaskStatus::InProgress)
            .map(|x| x.reference_task_name.clone())
            .collect::<Vec<_>>();

        let task_definition = task_to_schedule
            .task_definition
            .clone()
            .or_else(|| MetadataDao::get_task_def(&task_to_schedule.name));

        let task_id = IdGenerator::generate();
        let task_mapper_context = TaskMapperContext::new(
            workflow_def,
            &workflow_instance,
            task_definition.as_ref(),
            task_to_schedule,
            input,
            retry_count,
            retried_task_id.into(),
            task_id,
        );

        // For static forks, each branch of the fork creates a join task upon
        // completion; for dynamic forks, a join task is created with the fork
        // and also with each branch of the fork.
        let mut tasks = TaskMapperRegistry::get_task_mapper(&task_to_schedule.type_)
            .get_mapped_tasks(task_mapper_context)?
            .into_iter()
            .filter(|x| !in_progress_tasks.contains(&x.reference_task_name))
            .collect::<Vec<_>>();
        for task in tasks.iter_mut() {
            ExternalPayloadStorageUtils::verify_and_upload_task(task, PayloadType::TaskInput)?;
        }
        Ok(tasks)
    }

    fn is_task_skipped(
        task_to_schedule: Option<&WorkflowTask>,
        workflow: &WorkflowModel,
    ) -> SgResult<bool> {
        if let Some(task_to_schedule) = task_to_schedule {
            match workflow.get_task_by_ref_name(&task_to_schedule.task_reference_name) {
                Ok(Some(task)) => Ok(task.status == TaskStatus::Skipped),
                Ok(None) => Ok(false),
                Err(e) => str_err!(TerminateWorkflow, e.message()),
            }
        } else {
            Ok(false)
        }
    }

    fn resolve_task_definition(task: &TaskModel) -> Option<TaskDef> {
        task.get_task_definition()
            .cloned()
            .or_else(|| MetadataDao::get_task_def(&task.task_def_name))
    }

    /// first-insert-wins on reference-name collisions
    fn put_if_absent(tasks: &mut Vec<TaskModel>, task: TaskModel) {
        if !tasks
            .iter()
            .any(|x| x.reference_task_name == task.reference_task_name)
        {
            tasks.push(task);
        }
    }

    /// replaces an earlier insert with the same reference name
    fn put(tasks: &mut Vec<TaskModel>, task: TaskModel) {
        if let Some(existing) = tasks
            .iter_mut()
            .find(|x| x.reference_task_name == task.reference_task_name)
        {
            *existing = task;
        } else {
            tasks.push(task);
        }
    }
}

#[derive(Debug)]
pub struct DeciderOutcome {
    pub tasks_to_be_scheduled: Vec<TaskModel>,
    pub tasks_to_be_updated: Vec<TaskModel>,
    pub tasks_to_be_requeued: Vec<TaskModel>,
    pub is_complete: bool,
}

impl DeciderOutcome {
    pub fn new() -> Self {
        Self {
            tasks_to_be_scheduled: Vec::default(),
            tasks_to_be_updated: Vec::default(),
            tasks_to_be_requeued: Vec::default(),
            is_complete: false,
        }
    }
}

impl Default for DeciderOutcome {
    fn default() -> Self {
        Self::new()
    }
}
