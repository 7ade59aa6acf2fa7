use sargas_common::prelude::*;

pub struct WorkflowEvaluationEvent {
    pub workflow_id: InlineStr,
}

impl WorkflowEvaluationEvent {
    pub fn new(workflow_id: InlineStr) -> Self {
        Self { workflow_id }
    }
}
