mod common;
mod exception;
mod metadata;
mod run;
mod utils;

pub use metadata::{
    RetryLogic, SubWorkflowParams, TaskDef, TaskType, TimeoutPolicy, WorkflowDef, WorkflowTask,
};
pub use run::{SkipTaskRequest, StartWorkflowRequest, TaskExecLog, TaskResult, TaskResultStatus};
pub use utils::EnvUtils;

pub mod prelude;

#[macro_use]
pub(crate) mod macros;
