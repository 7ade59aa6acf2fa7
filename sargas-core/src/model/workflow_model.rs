use chrono::Utc;
use sargas_common::prelude::*;
use sargas_common::WorkflowDef;

use super::task_model::TaskModel;
use super::{Workflow, WorkflowStatus};
use crate::runtime::StartWorkflowInput;

#[derive(Clone, Debug)]
pub struct WorkflowModel {
    pub workflow_id: InlineStr,
    pub correlation_id: InlineStr,
    pub workflow_type: InlineStr,
    pub version: i32,
    /// Mirrors the definition's schema version, stamped by the decider on
    /// every evaluation.
    pub schema_version: i32,
    pub tasks: Vec<TaskModel>,
    pub task_to_domain: HashMap<InlineStr, InlineStr>,

    pub input: HashMap<InlineStr, Object>,
    pub output: HashMap<InlineStr, Object>,
    pub external_input_payload_storage_path: InlineStr,
    pub external_output_payload_storage_path: InlineStr,

    pub status: WorkflowStatus,
    pub reason_for_incompletion: InlineStr,
    /// Captures the failed taskId if the workflow execution failed because of
    /// a task failure
    pub failed_task_id: InlineStr,
    pub failed_reference_task_names: HashSet<InlineStr>,
    pub re_run_from_workflow_id: InlineStr,

    pub create_time: i64,
    pub updated_time: i64,
    pub end_time: i64,
}

impl WorkflowModel {
    pub fn new(
        workflow_id: InlineStr,
        workflow_definition: &WorkflowDef,
        input: &StartWorkflowInput,
    ) -> Self {
        Self {
            workflow_id,
            correlation_id: input.correlation_id.clone(),
            workflow_type: workflow_definition.name.clone(),
            version: workflow_definition.version,
            schema_version: workflow_definition.schema_version,
            tasks: Vec::default(),
            task_to_domain: input.task_to_domain.clone(),

            input: HashMap::default(),
            output: HashMap::default(),
            external_input_payload_storage_path: InlineStr::new(),
            external_output_payload_storage_path: InlineStr::new(),

            status: WorkflowStatus::Running,
            reason_for_incompletion: InlineStr::new(),
            failed_task_id: InlineStr::new(),
            failed_reference_task_names: HashSet::default(),
            re_run_from_workflow_id: InlineStr::new(),

            create_time: Utc::now().timestamp_millis(),
            updated_time: 0,
            end_time: 0,
        }
    }

    pub fn to_short_string(&self) -> String {
        format!(
            "{}.{}/{}",
            self.workflow_type, self.version, self.workflow_id
        )
    }

    pub fn get_task_by_ref_name(&self, ref_name: &str) -> SgResult<Option<&TaskModel>> {
        if ref_name.is_empty() {
            return str_err!(
                UnknownException,
                "refName passed is empty. Check the workflow execution. For dynamic tasks, make sure referenceTaskName is set to a not empty value"
            );
        }

        let mut found = Vec::default();
        for task in &self.tasks {
            if task.reference_task_name.eq(ref_name) {
                found.push(task);
            }
        }

        Ok(found.pop())
    }

    pub fn to_workflow(self) -> Workflow {
        Workflow {
            status: self.status,
            workflow: Some(self),
        }
    }
}
