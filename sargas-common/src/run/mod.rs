mod skip_task_request;
mod start_workflow_request;
mod task_exec_log;
mod task_result;

pub use skip_task_request::SkipTaskRequest;
pub use start_workflow_request::StartWorkflowRequest;
pub use task_exec_log::TaskExecLog;
pub use task_result::{TaskResult, TaskResultStatus};
