use crate::prelude::*;

/// Input/output to record against a task that is skipped over in a running
/// workflow.
#[derive(Clone, Debug, Default)]
pub struct SkipTaskRequest {
    pub task_input: HashMap<InlineStr, Object>,
    pub task_output: HashMap<InlineStr, Object>,
}
