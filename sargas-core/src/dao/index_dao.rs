use dashmap::DashMap;
use sargas_common::prelude::*;
use sargas_common::TaskExecLog;

use crate::model::{SearchResult, TaskSummary, WorkflowSummary};

/// In-process stand-in for the search index. A production deployment plugs a
/// real indexer behind the same calls.
pub struct IndexDao;

static WORKFLOW_INDEX: Lazy<DashMap<InlineStr, WorkflowSummary>> = Lazy::new(DashMap::new);

static TASK_INDEX: Lazy<DashMap<InlineStr, TaskSummary>> = Lazy::new(DashMap::new);

static TASK_EXEC_LOGS: Lazy<DashMap<InlineStr, Vec<TaskExecLog>>> = Lazy::new(DashMap::new);

impl IndexDao {
    pub fn index_workflow(workflow: WorkflowSummary) {
        WORKFLOW_INDEX.insert(workflow.workflow_id.clone(), workflow);
    }

    pub fn index_task(task: TaskSummary) {
        TASK_INDEX.insert(task.task_id.clone(), task);
    }

    /// Matches the workflow type against `query` and the free text against
    /// workflow id and correlation id. Empty terms match everything.
    pub fn search_workflows(
        query: &str,
        free_text: &str,
        start: usize,
        size: usize,
    ) -> SearchResult<InlineStr> {
        let mut matches = WORKFLOW_INDEX
            .iter()
            .filter(|entry| {
                let summary = entry.value();
                (query.is_empty() || summary.workflow_type.contains(query))
                    && (free_text.is_empty()
                        || summary.workflow_id.contains(free_text)
                        || summary.correlation_id.contains(free_text))
            })
            .map(|entry| (entry.value().start_time, entry.key().clone()))
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.0.cmp(&a.0));

        let total_hits = matches.len() as i64;
        let results = matches
            .into_iter()
            .skip(start)
            .take(size)
            .map(|(_, id)| id)
            .collect();
        SearchResult::new(total_hits, results)
    }

    pub fn search_tasks(
        query: &str,
        free_text: &str,
        start: usize,
        size: usize,
    ) -> SearchResult<InlineStr> {
        let mut matches = TASK_INDEX
            .iter()
            .filter(|entry| {
                let summary = entry.value();
                (query.is_empty()
                    || summary.task_type.contains(query)
                    || summary.task_def_name.contains(query))
                    && (free_text.is_empty()
                        || summary.task_id.contains(free_text)
                        || summary.workflow_id.contains(free_text))
            })
            .map(|entry| (entry.value().scheduled_time, entry.key().clone()))
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.0.cmp(&a.0));

        let total_hits = matches.len() as i64;
        let results = matches
            .into_iter()
            .skip(start)
            .take(size)
            .map(|(_, id)| id)
            .collect();
        SearchResult::new(total_hits, results)
    }

    pub fn add_task_execution_logs(logs: Vec<TaskExecLog>) {
        for log in logs {
            TASK_EXEC_LOGS
                .entry(log.task_id.clone())
                .or_default()
                .push(log);
        }
    }

    pub fn get_task_execution_logs(task_id: &str) -> Vec<TaskExecLog> {
        TASK_EXEC_LOGS
            .get(&InlineStr::from(task_id))
            .map(|x| x.clone())
            .unwrap_or_default()
    }

    pub fn remove_workflow(workflow_id: &InlineStr) {
        WORKFLOW_INDEX.remove(workflow_id);
    }
}
