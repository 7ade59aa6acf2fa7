use sargas_common::prelude::*;

use crate::config::Properties;
use crate::dao::{ExecutionDao, QueueDao};
use crate::runtime::execution::WorkflowExecutor;

/// Periodically re-evaluates running workflows off the decider queue. Task
/// timeouts are enforced lazily by the decider, so without this tick a
/// workflow whose workers went away would never time out.
pub struct WorkflowSweeper;

const SWEEP_BATCH_SIZE: i32 = 5;
const SWEEP_POLL_TIMEOUT_MS: i32 = 100;

impl WorkflowSweeper {
    /// return the number of workflows evaluated in this pass
    pub fn sweep_once() -> SgResult<i32> {
        let workflow_ids = QueueDao::pop(
            QueueDao::DECIDER_QUEUE,
            SWEEP_BATCH_SIZE,
            SWEEP_POLL_TIMEOUT_MS,
        )?;
        let count = workflow_ids.len() as i32;
        for workflow_id in workflow_ids {
            Self::sweep(&workflow_id);
        }
        Ok(count)
    }

    pub fn sweep(workflow_id: &InlineStr) {
        debug!("Sweeping workflow: {}", workflow_id);
        if let Err(e) = WorkflowExecutor::decide_workflow(workflow_id) {
            error!("Error sweeping workflow: {}, error: {}", workflow_id, e);
        }

        let still_running = ExecutionDao::get_workflow_status(workflow_id)
            .map(|status| !status.is_terminal())
            .unwrap_or(false);
        QueueDao::ack(QueueDao::DECIDER_QUEUE, workflow_id);
        if still_running {
            // line the workflow up for the next tick
            QueueDao::push_if_not_exists(
                QueueDao::DECIDER_QUEUE,
                workflow_id,
                Properties::get().workflow_offset_timeout_sec,
            );
        }
    }
}
