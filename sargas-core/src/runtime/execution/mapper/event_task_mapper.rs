use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::{TaskMapper, TaskMapperContext};
use crate::model::{TaskModel, TaskStatus};

/// Maps a `WorkflowTask` of type `EVENT` to a `TaskModel` of type `EVENT`
/// with status `SCHEDULED`. The sink the event is published to travels in the
/// task input; the publishing integration is external to the engine.
pub struct EventTaskMapper;

impl TaskMapper for EventTaskMapper {
    fn get_task_type(&self) -> &str {
        TaskType::Event.as_ref()
    }

    fn get_mapped_tasks(
        &self,
        mut task_mapper_context: TaskMapperContext,
    ) -> SgResult<Vec<TaskModel>> {
        debug!(
            "TaskMapperContext {:?} in EventTaskMapper",
            task_mapper_context
        );

        let workflow_task = task_mapper_context.workflow_task;
        let mut task_input = std::mem::take(&mut task_mapper_context.task_input);
        task_input.insert("sink".into(), workflow_task.sink.clone().into());

        let mut event_task = task_mapper_context.create_task_model(TaskStatus::Scheduled);
        event_task.task_type = TaskType::Event.as_ref().into();
        event_task.input_data = task_input;
        event_task.retry_count = task_mapper_context.retry_count;
        event_task.retried_task_id = task_mapper_context.retry_task_id.clone();

        Ok(vec![event_task])
    }
}
