use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::decision::Decision;
use super::join::Join;
use super::wait::Wait;
use super::workflow_system_task::WorkflowSystemTask;

/// Holds the mapping of system task types to their `WorkflowSystemTask`
/// behaviors. The FORK marker has no behavior: it is terminal at creation.
pub struct SystemTaskRegistry;

static REGISTRY: Lazy<DashMap<InlineStr, Box<dyn WorkflowSystemTask>>> = Lazy::new(|| {
    let map = DashMap::new();
    map.insert(
        TaskType::Decision.as_ref().into(),
        Box::new(Decision) as Box<dyn WorkflowSystemTask>,
    );
    map.insert(
        TaskType::Join.as_ref().into(),
        Box::new(Join) as Box<dyn WorkflowSystemTask>,
    );
    map.insert(
        TaskType::Wait.as_ref().into(),
        Box::new(Wait) as Box<dyn WorkflowSystemTask>,
    );
    map
});

impl SystemTaskRegistry {
    pub fn get(task_type: &str) -> SgResult<Ref<'static, InlineStr, Box<dyn WorkflowSystemTask>>> {
        REGISTRY
            .get(&InlineStr::from(task_type))
            .ok_or(ErrorCode::NotFound(format!(
                "{} not found in SystemTaskRegistry",
                task_type
            )))
    }

    pub fn is_system_task(task_type: &str) -> bool {
        REGISTRY.contains_key(&InlineStr::from(task_type))
            || TaskType::TASK_TYPE_FORK.eq(task_type)
    }
}
