use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::decision_task_mapper::DecisionTaskMapper;
use super::event_task_mapper::EventTaskMapper;
use super::fork_join_dynamic_task_mapper::ForkJoinDynamicTaskMapper;
use super::fork_join_task_mapper::ForkJoinTaskMapper;
use super::join_task_mapper::JoinTaskMapper;
use super::sub_workflow_task_mapper::SubWorkflowTaskMapper;
use super::user_defined_task_mapper::UserDefinedTaskMapper;
use super::wait_task_mapper::WaitTaskMapper;
use super::TaskMapper;

static REGISTRY: Lazy<DashMap<InlineStr, Box<dyn TaskMapper>>> = Lazy::new(|| {
    let map = DashMap::new();
    map.insert(
        InlineStr::from(TaskType::UserDefined.as_ref()),
        Box::new(UserDefinedTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::Decision.as_ref()),
        Box::new(DecisionTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::ForkJoin.as_ref()),
        Box::new(ForkJoinTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::ForkJoinDynamic.as_ref()),
        Box::new(ForkJoinDynamicTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::Join.as_ref()),
        Box::new(JoinTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::SubWorkflow.as_ref()),
        Box::new(SubWorkflowTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::Wait.as_ref()),
        Box::new(WaitTaskMapper) as Box<dyn TaskMapper>,
    );
    map.insert(
        InlineStr::from(TaskType::Event.as_ref()),
        Box::new(EventTaskMapper) as Box<dyn TaskMapper>,
    );
    map
});

static CUSTOM_REGISTRY: Lazy<DashMap<InlineStr, Box<dyn TaskMapper>>> = Lazy::new(DashMap::new);

/// Registry keyed by the task-type tag. Closed over the built-in mappers;
/// installations add their own through `register`. Unknown tags map through
/// the USER_DEFINED mapper.
pub struct TaskMapperRegistry;

impl TaskMapperRegistry {
    pub fn get_task_mapper(type_: &InlineStr) -> Ref<'static, InlineStr, Box<dyn TaskMapper>> {
        REGISTRY
            .get(type_)
            .or_else(|| CUSTOM_REGISTRY.get(type_))
            .unwrap_or_else(|| {
                REGISTRY
                    .get(&InlineStr::from(TaskType::UserDefined.as_ref()))
                    .expect("USER_DEFINED mapper is always registered")
            })
    }

    pub fn register(type_: &str, task_mapper: Box<dyn TaskMapper>) {
        CUSTOM_REGISTRY.insert(InlineStr::from(type_), task_mapper);
    }

    pub fn unregister(type_: &str) {
        CUSTOM_REGISTRY.remove(&InlineStr::from(type_));
    }
}
