use chrono::Utc;
use dashmap::DashMap;
use sargas_common::prelude::*;

use super::MetadataDao;
use crate::model::{TaskModel, TaskStatus, WorkflowModel};
use crate::WorkflowStatus;

/// Data access layer for storing workflow executions. Backed by in-process
/// maps; a persistence module swaps these for its own store.
pub struct ExecutionDao;

/// ******************************************
/// *************** Task *********************
/// ******************************************

static TASK: Lazy<DashMap<InlineStr, TaskModel>> = Lazy::new(DashMap::new);

/// Non-terminal task ids per task definition name.
static PENDING_TASKS: Lazy<DashMap<InlineStr, Vec<InlineStr>>> = Lazy::new(DashMap::new);

/// Task ids currently in IN_PROGRESS status per task definition name, used
/// for the poll-time concurrency limit.
static TASKS_IN_PROGRESS_STATUS: Lazy<DashMap<InlineStr, Vec<InlineStr>>> =
    Lazy::new(DashMap::new);

static WORKFLOW_TO_TASKS: Lazy<DashMap<InlineStr, Vec<InlineStr>>> = Lazy::new(DashMap::new);

/// Dedup of scheduled task keys (refName + retryCount) per workflow.
static SCHEDULED_TASKS: Lazy<DashMap<InlineStr, HashMap<InlineStr, InlineStr>>> =
    Lazy::new(DashMap::new);

/// ******************************************
/// *************** Workflow *****************
/// ******************************************

static WORKFLOW: Lazy<DashMap<InlineStr, WorkflowModel>> = Lazy::new(DashMap::new);

static PENDING_WORKFLOWS: Lazy<DashMap<InlineStr, Vec<InlineStr>>> = Lazy::new(DashMap::new);

impl ExecutionDao {
    /// ******************************************
    /// *************** Task *********************
    /// ******************************************

    /// return false when a task with the same key was already scheduled for
    /// this workflow and the insert was skipped
    pub fn create_task(task: &mut TaskModel) -> SgResult<bool> {
        Self::validate(task)?;

        let task_key = task.get_task_key();
        let added = SCHEDULED_TASKS
            .entry(task.workflow_instance_id.clone())
            .or_default()
            .insert(task_key.clone(), task.task_id.clone())
            .is_none();
        if !added {
            debug!(
                "Task already scheduled, skipping the run {}, ref={}, key={}",
                task.task_id, task.reference_task_name, task_key
            );
            return Ok(false);
        }

        if !task.status.is_terminal() && task.scheduled_time == 0 {
            task.scheduled_time = Utc::now().timestamp_millis();
        }

        WORKFLOW_TO_TASKS
            .entry(task.workflow_instance_id.clone())
            .or_default()
            .push(task.task_id.clone());
        PENDING_TASKS
            .entry(task.task_def_name.clone())
            .or_default()
            .push(task.task_id.clone());

        Self::update_task(task);
        Ok(true)
    }

    pub fn update_task(task: &mut TaskModel) {
        let task_id = task.task_id.clone();
        let concurrency_limit = task
            .get_task_definition()
            .cloned()
            .or_else(|| MetadataDao::get_task_def(&task.task_def_name))
            .map(|x| x.concurrency_limit())
            .unwrap_or(0);

        if concurrency_limit > 0 {
            if task.status == TaskStatus::InProgress {
                let mut in_progress = TASKS_IN_PROGRESS_STATUS
                    .entry(task.task_def_name.clone())
                    .or_default();
                if !in_progress.contains(&task_id) {
                    in_progress.push(task_id.clone());
                }
            } else {
                TASKS_IN_PROGRESS_STATUS
                    .entry(task.task_def_name.clone())
                    .or_default()
                    .retain(|x| !x.eq(&task_id));
            }
        }

        if task.status.is_terminal() {
            PENDING_TASKS
                .entry(task.task_def_name.clone())
                .or_default()
                .retain(|x| !x.eq(&task_id));
        }

        TASK.insert(task_id, task.clone());
    }

    pub fn get_task(task_id: &str) -> Option<TaskModel> {
        TASK.get(&InlineStr::from(task_id)).map(|x| x.clone())
    }

    pub fn get_tasks_for_workflow(workflow_id: &InlineStr) -> Vec<TaskModel> {
        let mut tasks = WORKFLOW_TO_TASKS
            .get(workflow_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| TASK.get(id).map(|x| x.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        tasks.sort_by_key(|x| x.seq);
        tasks
    }

    pub fn get_pending_tasks_for_task_type(task_def_name: &str) -> Vec<TaskModel> {
        PENDING_TASKS
            .get(&InlineStr::from(task_def_name))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| TASK.get(id).map(|x| x.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks if the number of IN_PROGRESS tasks for this task's definition
    /// has reached the configured concurrency limit. Polls that would breach
    /// the limit are dropped by the caller.
    pub fn exceeds_in_progress_limit(task: &TaskModel) -> bool {
        let limit = task
            .get_task_definition()
            .cloned()
            .or_else(|| MetadataDao::get_task_def(&task.task_def_name))
            .map(|x| x.concurrency_limit())
            .unwrap_or(0);
        if limit <= 0 {
            return false;
        }

        let current = TASKS_IN_PROGRESS_STATUS
            .get(&task.task_def_name)
            .map(|x| x.len() as i32)
            .unwrap_or(0);
        if current >= limit {
            info!(
                "Task execution count limited. task - {}:{}, limit: {}, current: {}",
                task.task_id, task.task_def_name, limit, current
            );
            return true;
        }
        false
    }

    fn validate(task: &TaskModel) -> SgResult<()> {
        if task.task_id.is_empty() || task.workflow_instance_id.is_empty() {
            return str_err!(
                InvalidInput,
                "Task object cannot be persisted without taskId or workflowInstanceId"
            );
        }
        Ok(())
    }

    /// ******************************************
    /// *************** Workflow *****************
    /// ******************************************

    pub fn create_workflow(workflow: &WorkflowModel) {
        Self::store_workflow(workflow);
        PENDING_WORKFLOWS
            .entry(workflow.workflow_type.clone())
            .or_default()
            .push(workflow.workflow_id.clone());
    }

    pub fn update_workflow(workflow: &WorkflowModel) {
        Self::store_workflow(workflow);
        if workflow.status.is_terminal() {
            Self::remove_from_pending_workflow(&workflow.workflow_type, &workflow.workflow_id);
        }
    }

    fn store_workflow(workflow: &WorkflowModel) {
        // tasks are stored under their own keys
        let mut stored = workflow.clone();
        let mut tasks = std::mem::take(&mut stored.tasks);
        for task in tasks.iter_mut() {
            Self::update_task(task);
        }
        WORKFLOW.insert(stored.workflow_id.clone(), stored);
    }

    pub fn get_workflow_include_tasks(
        workflow_id: &InlineStr,
        include_tasks: bool,
    ) -> Option<WorkflowModel> {
        WORKFLOW.get(workflow_id).map(|x| x.clone()).map(|mut workflow| {
            if include_tasks {
                workflow.tasks = Self::get_tasks_for_workflow(workflow_id);
            }
            workflow
        })
    }

    pub fn get_workflow_status(workflow_id: &InlineStr) -> Option<WorkflowStatus> {
        WORKFLOW.get(workflow_id).map(|x| x.status)
    }

    pub fn get_running_workflow_ids(workflow_type: &str) -> Vec<InlineStr> {
        PENDING_WORKFLOWS
            .get(&InlineStr::from(workflow_type))
            .map(|x| x.clone())
            .unwrap_or_default()
    }

    pub fn remove_from_pending_workflow(workflow_type: &InlineStr, workflow_id: &InlineStr) {
        PENDING_WORKFLOWS
            .entry(workflow_type.clone())
            .or_default()
            .retain(|x| !x.eq(workflow_id));
    }

    pub fn remove_workflow(workflow_id: &InlineStr) {
        if let Some((_, workflow)) = WORKFLOW.remove(workflow_id) {
            Self::remove_from_pending_workflow(&workflow.workflow_type, workflow_id);
        }
        if let Some((_, task_ids)) = WORKFLOW_TO_TASKS.remove(workflow_id) {
            for task_id in task_ids {
                if let Some((_, task)) = TASK.remove(&task_id) {
                    PENDING_TASKS
                        .entry(task.task_def_name.clone())
                        .or_default()
                        .retain(|x| !x.eq(&task_id));
                    TASKS_IN_PROGRESS_STATUS
                        .entry(task.task_def_name.clone())
                        .or_default()
                        .retain(|x| !x.eq(&task_id));
                }
            }
        }
        SCHEDULED_TASKS.remove(workflow_id);
    }
}
