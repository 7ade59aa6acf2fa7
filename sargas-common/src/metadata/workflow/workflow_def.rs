use std::collections::VecDeque;

use crate::prelude::*;
use crate::WorkflowTask;

#[derive(Clone, Debug)]
pub struct WorkflowDef {
    /// Name of the workflow
    pub name: InlineStr,
    /// Description of the workflow
    pub description: InlineStr,
    /// Numeric field used to identify the version of the definition. Use
    /// incrementing numbers.
    pub version: i32,
    /// An array of task configurations.
    pub tasks: Vec<WorkflowTask>,
    /// List of input parameters. Used for documenting the required inputs to
    /// workflow
    pub input_parameters: Vec<InlineStr>,
    /// Expression template used to generate the output of the workflow
    pub output_parameters: HashMap<InlineStr, Object>,
    /// Default input values.
    pub input_template: HashMap<InlineStr, Object>,
    /// Version of the input-parameter resolution rules. Version 1 performs
    /// shallow substitution, version 2 adds nested path traversal.
    pub schema_version: i32,
    /// Flag to allow workflow restarts
    pub restartable: bool,
}

impl WorkflowDef {
    pub fn get_next_task(&self, task_reference_name: &str) -> Option<&WorkflowTask> {
        let mut iterator = self.tasks.iter();
        while let Some(task) = iterator.next() {
            if task.task_reference_name.eq(task_reference_name) {
                // If taskReferenceName matches, break out
                break;
            }
            if let Some(next_task) = task.next(task_reference_name, None) {
                return Some(next_task);
            }

            if task.has(task_reference_name) {
                break;
            }
        }

        iterator.next()
    }

    pub fn get_task_by_ref_name(&self, task_reference_name: &str) -> Option<&WorkflowTask> {
        self.collect_tasks()
            .into_iter()
            .filter(|&x| x.task_reference_name.eq(task_reference_name))
            .collect::<VecDeque<_>>()
            .pop_front()
    }

    pub fn collect_tasks(&self) -> Vec<&WorkflowTask> {
        let mut tasks = Vec::default();
        for workflow_task in &self.tasks {
            tasks.extend(workflow_task.collect_tasks())
        }
        tasks
    }
}

impl TryFrom<&serde_json::Value> for WorkflowDef {
    type Error = ErrorCode;
    fn try_from(value: &serde_json::Value) -> Result<Self, ErrorCode> {
        // Optional
        let input_parameters: Vec<InlineStr> = if value.get("inputParameters").is_none() {
            Vec::default()
        } else {
            let mut input_parameters: Vec<InlineStr> = Vec::default();
            for input_param in value
                .get("inputParameters")
                .and_then(|x| x.as_array())
                .ok_or_else(|| ErrorCode::InvalidInput("inputParameters invalid, not an array"))?
            {
                if let Some(input_p) = input_param.as_str() {
                    input_parameters.push(input_p.trim().into());
                } else {
                    return str_err!(InvalidInput, "inputParameters invalid, not a string in array");
                }
            }
            input_parameters
        };

        // Optional
        let output_parameters: HashMap<InlineStr, Object> =
            if value.get("outputParameters").is_none() {
                HashMap::default()
            } else {
                Object::convert_jsonmap_to_hashmap(
                    value
                        .get("outputParameters")
                        .and_then(|x| x.as_object())
                        .ok_or_else(|| ErrorCode::InvalidInput("outputParameters invalid"))?,
                )
            };

        // Optional
        let input_template: HashMap<InlineStr, Object> = if value.get("inputTemplate").is_none() {
            HashMap::default()
        } else {
            Object::convert_jsonmap_to_hashmap(
                value
                    .get("inputTemplate")
                    .and_then(|x| x.as_object())
                    .ok_or_else(|| ErrorCode::InvalidInput("inputTemplate invalid"))?,
            )
        };

        let tasks = WorkflowTask::try_from_jsonlist(
            value
                .get("tasks")
                .and_then(|x| x.as_array())
                .ok_or_else(|| ErrorCode::InvalidInput("tasks invalid"))?,
        )?;

        Ok(Self {
            name: value
                .get("name")
                .and_then(|x| x.as_str())
                .ok_or_else(|| ErrorCode::InvalidInput("name not found"))?
                .trim()
                .into(),
            description: value
                .get("description")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
            version: value
                .get("version")
                .unwrap_or(&serde_json::json!(1))
                .as_i64()
                .ok_or_else(|| ErrorCode::InvalidInput("version invalid"))? as i32,
            tasks,
            input_parameters,
            output_parameters,
            input_template,
            schema_version: value
                .get("schemaVersion")
                .unwrap_or(&serde_json::json!(2))
                .as_i64()
                .ok_or_else(|| ErrorCode::InvalidInput("schemaVersion invalid"))?
                as i32,
            restartable: value
                .get("restartable")
                .unwrap_or(&serde_json::json!(true))
                .as_bool()
                .ok_or_else(|| ErrorCode::InvalidInput("restartable invalid"))?,
        })
    }
}
