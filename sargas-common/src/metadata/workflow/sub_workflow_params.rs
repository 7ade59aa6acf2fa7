use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct SubWorkflowParams {
    /// Name of the workflow to execute
    pub name: InlineStr,
    /// Version of the workflow, the latest registered version is used when
    /// absent
    pub version: Option<i32>,
}

impl TryFrom<&serde_json::Value> for SubWorkflowParams {
    type Error = ErrorCode;
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value
                .get("name")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("subWorkflowParam.name not found"))?
                .trim()
                .into(),
            version: value.get("version").and_then(|x| x.as_i64()).map(|x| x as i32),
        })
    }
}
