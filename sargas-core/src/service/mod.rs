mod execution_service;
mod task_service;
mod workflow_service;

pub use execution_service::ExecutionService;
pub use task_service::TaskService;
pub use workflow_service::WorkflowService;
