use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::{TaskExecLog, TaskResult, TaskType};

use crate::config::Properties;
use crate::dao::{IndexDao, MetadataDao, PollData, PollDataDao, QueueDao};
use crate::metrics::Monitors;
use crate::model::{
    SearchResult, Task, TaskModel, TaskStatus, TaskSummary, Workflow, WorkflowSummary,
};
use crate::runtime::execution::SystemTaskRegistry;
use crate::runtime::{ExecutionDaoFacade, WorkflowExecutor};
use crate::utils::QueueUtils;

/// Worker-facing execution API: task polling, acknowledgement, requeueing and
/// the read paths over the execution and index stores.
pub struct ExecutionService;

const MAX_POLL_TIMEOUT_MS: i32 = 5000;
const POLL_COUNT_ONE: i32 = 1;
const POLLING_TIMEOUT_IN_MS: i32 = 100;

impl ExecutionService {
    pub fn poll(task_type: &str, worker_id: &str, domain: &str) -> SgResult<Option<Task>> {
        let mut tasks = Self::batch_poll(
            task_type,
            worker_id,
            domain,
            POLL_COUNT_ONE,
            POLLING_TIMEOUT_IN_MS,
        )?;
        if tasks.is_empty() {
            Ok(None)
        } else {
            Ok(Some(tasks.remove(0)))
        }
    }

    pub fn batch_poll(
        task_type: &str,
        worker_id: &str,
        domain: &str,
        count: i32,
        timeout_ms: i32,
    ) -> SgResult<Vec<Task>> {
        if timeout_ms > MAX_POLL_TIMEOUT_MS {
            return str_err!(
                InvalidInput,
                "Long Poll Timeout value cannot be more than 5 seconds"
            );
        }
        let queue_name = QueueUtils::get_queue_name(task_type, domain);

        let task_ids = QueueDao::pop(&queue_name, count, timeout_ms)?;
        let mut tasks = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            let mut task = match ExecutionDaoFacade::get_task(&task_id) {
                Some(task) => task,
                None => continue,
            };

            if ExecutionDaoFacade::exceeds_in_progress_limit(&task) {
                // back-pressure: the id stays acked and the worker simply
                // sees fewer tasks than it asked for
                continue;
            }

            task.status = TaskStatus::InProgress;
            if task.start_time == 0 {
                task.start_time = Utc::now().timestamp_millis();
                Monitors::record_queue_wait_time(&task.task_def_name, task.get_queue_wait_time());
            }
            task.worker_id = worker_id.into();
            task.poll_count += 1;
            ExecutionDaoFacade::update_task(&mut task);
            tasks.push(task.to_task());
        }
        PollDataDao::update_last_poll_data(task_type, domain, worker_id);
        Monitors::record_task_poll(&queue_name);
        Ok(tasks)
    }

    pub fn get_task(task_id: &str) -> Option<Task> {
        ExecutionDaoFacade::get_task(task_id).map(|x| x.to_task())
    }

    pub fn update_task(task_result: TaskResult) -> SgResult<()> {
        WorkflowExecutor::update_task(task_result)
    }

    /// Removes the task from the unacked area of its queue.
    /// return true in case of successful removal of the taskId
    pub fn ack_task_received(task_id: &str) -> bool {
        ExecutionDaoFacade::get_task(task_id)
            .map(|task| {
                QueueDao::ack(
                    &QueueUtils::get_queue_name_by_task_model(&task),
                    &task.task_id,
                )
            })
            .unwrap_or(false)
    }

    pub fn get_task_queue_sizes(task_def_names: &[InlineStr]) -> HashMap<InlineStr, i32> {
        let mut sizes = HashMap::with_capacity(task_def_names.len());
        for task_def_name in task_def_names {
            sizes.insert(task_def_name.clone(), QueueDao::get_size(task_def_name));
        }
        sizes
    }

    pub fn remove_task_from_queue(task_id: &str) -> SgResult<()> {
        let task = ExecutionDaoFacade::get_task(task_id).ok_or_else(|| {
            ErrorCode::NotFound(format!("No such task found by taskId: {}", task_id))
        })?;
        QueueDao::remove(
            &QueueUtils::get_queue_name_by_task_model(&task),
            &task.task_id,
        )
    }

    /// Pushes every pending task whose last update is older than the requeue
    /// timeout back into its queue.
    pub fn requeue_pending_tasks() -> SgResult<i32> {
        let threshold = Utc::now().timestamp_millis() - Properties::get().task_requeue_timeout_ms;
        let mut count = 0;
        for workflow_def_name in MetadataDao::get_workflow_def_names() {
            for workflow_id in ExecutionDaoFacade::get_running_workflow_ids(&workflow_def_name) {
                let workflow = match ExecutionDaoFacade::get_workflow_model(&workflow_id, true) {
                    Ok(workflow) => workflow,
                    Err(e) => {
                        // elide the broken record, the sweep catches up later
                        error!("{}", e.message());
                        continue;
                    }
                };
                for pending in &workflow.tasks {
                    if Self::is_system_task(pending) || pending.status.is_terminal() {
                        continue;
                    }
                    if pending.update_time < threshold {
                        info!(
                            "Requeuing Task: workflowId={}, taskType={}, taskId={}",
                            workflow.workflow_id, pending.task_type, pending.task_id
                        );
                        let pushed = QueueDao::push_if_not_exists(
                            &QueueUtils::get_queue_name_by_task_model(pending),
                            &pending.task_id,
                            pending.callback_after_seconds.max(0),
                        );
                        if pushed {
                            count += 1;
                        }
                    }
                }
            }
        }
        Ok(count)
    }

    /// Bumps the stale reservations of one task type back to visible, with
    /// the callback shrunk by the time already served.
    pub fn requeue_pending_tasks_for_task_type(task_type: &str) -> SgResult<i32> {
        let mut count = 0;
        for pending in ExecutionDaoFacade::get_pending_tasks_for_task_type(task_type) {
            if Self::is_system_task(&pending) || pending.status.is_terminal() {
                continue;
            }
            info!(
                "Requeuing Task: workflowId={}, taskType={}, taskId={}",
                pending.workflow_instance_id, pending.task_type, pending.task_id
            );
            if Self::requeue(&pending)? {
                count += 1;
                Monitors::record_task_requeue(&pending.task_type);
            }
        }
        Ok(count)
    }

    fn requeue(pending: &TaskModel) -> SgResult<bool> {
        let callback = pending.callback_after_seconds.max(0);
        let queue_name = QueueUtils::get_queue_name_by_task_model(pending);
        QueueDao::remove(&queue_name, &pending.task_id)?;
        let now = Utc::now().timestamp_millis();
        let callback = (callback - (now - pending.update_time) / 1000).max(0);
        Ok(QueueDao::push_if_not_exists(
            &queue_name,
            &pending.task_id,
            callback,
        ))
    }

    fn is_system_task(task: &TaskModel) -> bool {
        SystemTaskRegistry::is_system_task(&task.task_type)
            || TaskType::is_builtin(&task.task_type)
    }

    pub fn get_pending_task_for_workflow(
        task_reference_name: &str,
        workflow_id: &InlineStr,
    ) -> Option<Task> {
        ExecutionDaoFacade::get_workflow_model(workflow_id, true)
            .ok()
            .and_then(|workflow| {
                workflow
                    .tasks
                    .iter()
                    .find(|x| {
                        !x.status.is_terminal() && x.reference_task_name.eq(task_reference_name)
                    })
                    .cloned()
            })
            .map(|x| x.to_task())
    }

    pub fn get_running_workflows(workflow_name: &str) -> Vec<InlineStr> {
        ExecutionDaoFacade::get_running_workflow_ids(workflow_name)
    }

    pub fn get_execution_status(workflow_id: &str, include_tasks: bool) -> SgResult<Workflow> {
        ExecutionDaoFacade::get_workflow(&InlineStr::from(workflow_id), include_tasks)
    }

    /// Search over the workflow index. Individual records that fail to load
    /// are elided and the total is adjusted.
    pub fn search(
        query: &str,
        free_text: &str,
        start: usize,
        size: usize,
    ) -> SgResult<SearchResult<WorkflowSummary>> {
        if size > Properties::get().max_search_size as usize {
            return fmt_err!(
                InvalidInput,
                "Cannot return more than {} workflows. Please use pagination.",
                Properties::get().max_search_size
            );
        }
        let result = IndexDao::search_workflows(query, free_text, start, size);
        let mut summaries = Vec::with_capacity(result.results.len());
        for workflow_id in &result.results {
            match ExecutionDaoFacade::get_workflow_model(workflow_id, false) {
                Ok(workflow) => summaries.push(WorkflowSummary::new(&workflow)),
                Err(e) => error!("{}", e.message()),
            }
        }
        let missing = (result.results.len() - summaries.len()) as i64;
        Ok(SearchResult::new(result.total_hits - missing, summaries))
    }

    pub fn search_tasks(
        query: &str,
        free_text: &str,
        start: usize,
        size: usize,
    ) -> SgResult<SearchResult<TaskSummary>> {
        if size > Properties::get().max_search_size as usize {
            return fmt_err!(
                InvalidInput,
                "Cannot return more than {} tasks. Please use pagination.",
                Properties::get().max_search_size
            );
        }
        let result = IndexDao::search_tasks(query, free_text, start, size);
        let mut summaries = Vec::with_capacity(result.results.len());
        for task_id in &result.results {
            match ExecutionDaoFacade::get_task(task_id) {
                Some(task) => summaries.push(TaskSummary::new(&task)),
                None => error!("No such task found by id: {}", task_id),
            }
        }
        let missing = (result.results.len() - summaries.len()) as i64;
        Ok(SearchResult::new(result.total_hits - missing, summaries))
    }

    /// Adds a worker log line against the task execution.
    pub fn log(task_id: &str, log: &str) {
        let execution_log = TaskExecLog {
            log: log.into(),
            task_id: task_id.into(),
            created_time: Utc::now().timestamp_millis(),
        };
        ExecutionDaoFacade::add_task_exec_logs(vec![execution_log]);
    }

    pub fn get_task_logs(task_id: &str) -> Vec<TaskExecLog> {
        ExecutionDaoFacade::get_task_exec_logs(task_id)
    }

    pub fn get_poll_data(task_type: &str) -> Vec<PollData> {
        PollDataDao::get_poll_data(task_type)
    }

    pub fn get_all_poll_data() -> Vec<PollData> {
        PollDataDao::get_all_poll_data()
    }
}
