use sargas_common::prelude::*;

use super::{WorkflowModel, WorkflowStatus};

/// Indexed projection of a workflow execution.
#[derive(Clone, Debug)]
pub struct WorkflowSummary {
    pub workflow_id: InlineStr,
    pub workflow_type: InlineStr,
    pub version: i32,
    pub correlation_id: InlineStr,
    pub status: WorkflowStatus,
    pub start_time: i64,
    pub update_time: i64,
    pub end_time: i64,
    pub reason_for_incompletion: InlineStr,
}

impl WorkflowSummary {
    pub fn new(workflow: &WorkflowModel) -> Self {
        Self {
            workflow_id: workflow.workflow_id.clone(),
            workflow_type: workflow.workflow_type.clone(),
            version: workflow.version,
            correlation_id: workflow.correlation_id.clone(),
            status: workflow.status,
            start_time: workflow.create_time,
            update_time: workflow.updated_time,
            end_time: workflow.end_time,
            reason_for_incompletion: workflow.reason_for_incompletion.clone(),
        }
    }
}
