use sargas_common::prelude::*;

use super::task_mapper_context::TaskMapperContext;
use crate::model::TaskModel;

/// Materializes one or more concrete task instances from a workflow-task
/// template. A mapper must be deterministic given its context and must not
/// mutate the workflow.
pub trait TaskMapper: Send + Sync {
    fn get_task_type(&self) -> &str;

    fn get_mapped_tasks(&self, task_mapper_context: TaskMapperContext)
        -> SgResult<Vec<TaskModel>>;
}
