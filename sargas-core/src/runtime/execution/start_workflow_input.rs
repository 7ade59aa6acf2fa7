use sargas_common::prelude::*;
use sargas_common::{StartWorkflowRequest, WorkflowDef};

pub struct StartWorkflowInput {
    pub name: InlineStr,
    pub version: Option<i32>,
    /// Adhoc definition carried with the request; registered on start.
    pub workflow_definition: Option<WorkflowDef>,
    pub workflow_input: HashMap<InlineStr, Object>,
    pub external_input_payload_storage_path: InlineStr,
    pub correlation_id: InlineStr,
    pub task_to_domain: HashMap<InlineStr, InlineStr>,
    /// Pre-allocated workflow id, generated when empty.
    pub workflow_id: InlineStr,
}

impl From<StartWorkflowRequest> for StartWorkflowInput {
    fn from(request: StartWorkflowRequest) -> Self {
        Self {
            name: request.name,
            version: request.version,
            workflow_definition: request.workflow_def,
            workflow_input: request.input,
            external_input_payload_storage_path: request.external_input_payload_storage_path,
            correlation_id: request.correlation_id,
            task_to_domain: request.task_to_domain,
            workflow_id: InlineStr::new(),
        }
    }
}
