mod task;
mod task_model;
mod task_summary;
mod workflow;
mod workflow_model;
mod workflow_summary;

pub use task::Task;
pub use task_model::{TaskModel, TaskStatus};
pub use task_summary::TaskSummary;
pub use workflow::{Workflow, WorkflowStatus};
pub use workflow_model::WorkflowModel;
pub use workflow_summary::WorkflowSummary;

/// Page of results returned by the index store.
pub struct SearchResult<T> {
    pub total_hits: i64,
    pub results: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn new(total_hits: i64, results: Vec<T>) -> Self {
        Self {
            total_hits,
            results,
        }
    }
}
