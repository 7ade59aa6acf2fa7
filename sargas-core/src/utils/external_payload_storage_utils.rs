use sargas_common::prelude::*;
use strum_macros::AsRefStr;

use super::IdGenerator;
use crate::config::Properties;
use crate::dao::PayloadStorageDao;
use crate::metrics::Monitors;
use crate::model::{TaskModel, WorkflowModel};

#[derive(Clone, Copy, Debug, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadOperation {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, AsRefStr, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadType {
    WorkflowInput,
    WorkflowOutput,
    TaskInput,
    TaskOutput,
}

/// Moves oversized input/output maps to external payload storage and back.
/// At rest exactly one of the in-memory map and the external path is
/// authoritative: the path whenever it is non-empty.
pub struct ExternalPayloadStorageUtils;

impl ExternalPayloadStorageUtils {
    pub fn download_payload(path: &str) -> SgResult<HashMap<InlineStr, Object>> {
        PayloadStorageDao::download(path)
    }

    /// Uploads the task payload of the given kind when it crosses the
    /// configured threshold, replacing the map with an external path.
    pub fn verify_and_upload_task(task: &mut TaskModel, payload_type: PayloadType) -> SgResult<()> {
        let threshold_kb = match payload_type {
            PayloadType::TaskInput => Properties::get().task_input_payload_threshold_kb,
            PayloadType::TaskOutput => Properties::get().task_output_payload_threshold_kb,
            _ => {
                return fmt_err!(
                    InvalidInput,
                    "Payload type {} does not belong to a task",
                    payload_type.as_ref()
                )
            }
        };

        let payload = match payload_type {
            PayloadType::TaskInput => &task.input_data,
            _ => &task.output_data,
        };
        if Object::estimate_map_memory_used(payload) <= threshold_kb * 1024 {
            return Ok(());
        }

        let path = Self::storage_path("task", &task.task_id, payload_type);
        match payload_type {
            PayloadType::TaskInput => {
                PayloadStorageDao::upload(&path, std::mem::take(&mut task.input_data));
                task.external_input_payload_storage_path = path;
            }
            _ => {
                PayloadStorageDao::upload(&path, std::mem::take(&mut task.output_data));
                task.external_output_payload_storage_path = path;
            }
        }
        Monitors::record_external_payload_storage_usage(
            &task.task_def_name,
            PayloadOperation::Write.as_ref(),
            payload_type.as_ref(),
        );
        Ok(())
    }

    /// Uploads the workflow payload of the given kind when it crosses the
    /// configured threshold, replacing the map with an external path.
    pub fn verify_and_upload_workflow(
        workflow: &mut WorkflowModel,
        payload_type: PayloadType,
    ) -> SgResult<()> {
        let threshold_kb = match payload_type {
            PayloadType::WorkflowInput => Properties::get().workflow_input_payload_threshold_kb,
            PayloadType::WorkflowOutput => Properties::get().workflow_output_payload_threshold_kb,
            _ => {
                return fmt_err!(
                    InvalidInput,
                    "Payload type {} does not belong to a workflow",
                    payload_type.as_ref()
                )
            }
        };

        let payload = match payload_type {
            PayloadType::WorkflowInput => &workflow.input,
            _ => &workflow.output,
        };
        if Object::estimate_map_memory_used(payload) <= threshold_kb * 1024 {
            return Ok(());
        }

        let path = Self::storage_path("workflow", &workflow.workflow_id, payload_type);
        match payload_type {
            PayloadType::WorkflowInput => {
                PayloadStorageDao::upload(&path, std::mem::take(&mut workflow.input));
                workflow.external_input_payload_storage_path = path;
            }
            _ => {
                PayloadStorageDao::upload(&path, std::mem::take(&mut workflow.output));
                workflow.external_output_payload_storage_path = path;
            }
        }
        Monitors::record_external_payload_storage_usage(
            &workflow.workflow_type,
            PayloadOperation::Write.as_ref(),
            payload_type.as_ref(),
        );
        Ok(())
    }

    fn storage_path(entity: &str, id: &InlineStr, payload_type: PayloadType) -> InlineStr {
        let mut path = InlineStr::from(entity);
        path.push_str("/");
        path.push_str(id);
        path.push_str("/");
        path.push_str(payload_type.as_ref());
        path.push_str("/");
        path.push_str(&IdGenerator::generate());
        path
    }
}
