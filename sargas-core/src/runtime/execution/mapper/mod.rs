mod decision_task_mapper;
mod event_task_mapper;
mod fork_join_dynamic_task_mapper;
mod fork_join_task_mapper;
mod join_task_mapper;
mod sub_workflow_task_mapper;
mod task_mapper;
mod task_mapper_context;
mod task_mapper_registry;
mod user_defined_task_mapper;
mod wait_task_mapper;

pub use task_mapper::TaskMapper;
pub use task_mapper_context::TaskMapperContext;
pub use task_mapper_registry::TaskMapperRegistry;
