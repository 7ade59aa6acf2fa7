use crate::prelude::*;

/// Log entry recorded by a worker against a task execution.
#[derive(Clone, Debug)]
pub struct TaskExecLog {
    pub log: InlineStr,
    pub task_id: InlineStr,
    pub created_time: i64,
}
