use std::collections::HashSet;
use std::str::FromStr;

use once_cell::sync::Lazy;
use strum_macros::{AsRefStr, EnumString};

#[derive(Clone, Copy, Debug, EnumString, AsRefStr, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    UserDefined,
    Decision,
    ForkJoin,
    ForkJoinDynamic,
    Join,
    SubWorkflow,
    Wait,
    Event,
}

static BUILT_IN_TASKS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from_iter([
        TaskType::Decision.as_ref(),
        TaskType::TASK_TYPE_FORK,
        TaskType::Join.as_ref(),
    ])
});

impl TaskType {
    /// Marker task emitted at the head of a fork. Terminal the moment it is
    /// created, it only records that the fan-out happened.
    pub const TASK_TYPE_FORK: &'static str = "FORK";

    /// Converts a task type string to `TaskType`. For an unknown string, the
    /// value is defaulted to `TaskType::UserDefined`.
    pub fn of(task_type: &str) -> TaskType {
        TaskType::from_str(task_type).unwrap_or(TaskType::UserDefined)
    }

    pub fn is_builtin(task_type: &str) -> bool {
        BUILT_IN_TASKS.contains(task_type)
    }
}
