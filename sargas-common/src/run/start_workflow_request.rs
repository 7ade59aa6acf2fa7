use crate::prelude::*;
use crate::WorkflowDef;

#[derive(Debug)]
pub struct StartWorkflowRequest {
    /// Name of the workflow definition to execute
    pub name: InlineStr,
    /// Version of the workflow definition, the latest registered version is
    /// used when absent
    pub version: Option<i32>,
    pub correlation_id: InlineStr,
    pub input: HashMap<InlineStr, Object>,
    pub task_to_domain: HashMap<InlineStr, InlineStr>,
    /// An adhoc definition may be carried inline instead of referring to a
    /// registered one.
    pub workflow_def: Option<WorkflowDef>,
    pub external_input_payload_storage_path: InlineStr,
}

impl TryFrom<serde_json::Value> for StartWorkflowRequest {
    type Error = ErrorCode;
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let input = if let Some(json) = value.get("input") {
            Object::convert_jsonmap_to_hashmap(
                json.as_object()
                    .ok_or(ErrorCode::InvalidInput("input invalid"))?,
            )
        } else {
            HashMap::default()
        };

        let task_to_domain = if let Some(json) = value.get("taskToDomain") {
            let mut task_to_domain = HashMap::default();
            for (k, v) in json
                .as_object()
                .ok_or(ErrorCode::InvalidInput("taskToDomain invalid"))?
            {
                task_to_domain.insert(
                    InlineStr::from(k),
                    v.as_str()
                        .ok_or(ErrorCode::InvalidInput("taskToDomain invalid"))?
                        .into(),
                );
            }
            task_to_domain
        } else {
            HashMap::default()
        };

        let workflow_def = if let Some(json) = value.get("workflowDef") {
            Some(WorkflowDef::try_from(json)?)
        } else {
            None
        };

        Ok(Self {
            name: value
                .get("name")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("name not found"))?
                .trim()
                .into(),
            version: value.get("version").and_then(|x| x.as_i64()).map(|x| x as i32),
            correlation_id: value
                .get("correlationId")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
            input,
            task_to_domain,
            workflow_def,
            external_input_payload_storage_path: value
                .get("externalInputPayloadStoragePath")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
        })
    }
}
