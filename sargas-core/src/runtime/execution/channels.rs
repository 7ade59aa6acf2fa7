use crossbeam_channel::{Receiver, Sender};
use sargas_common::prelude::*;

use super::WorkflowExecutor;
use crate::runtime::event::{WorkflowCreationEvent, WorkflowEvaluationEvent};

pub static CREATE_EVENT_CHANNEL: Lazy<(
    Sender<WorkflowCreationEvent>,
    Receiver<WorkflowCreationEvent>,
)> = Lazy::new(crossbeam_channel::unbounded);

pub static EVAL_EVENT_CHANNEL: Lazy<(
    Sender<WorkflowEvaluationEvent>,
    Receiver<WorkflowEvaluationEvent>,
)> = Lazy::new(crossbeam_channel::unbounded);

pub struct Channel;

impl Channel {
    pub fn handle_creation_event() {
        if let Ok(wce) = CREATE_EVENT_CHANNEL.1.recv() {
            let _ = WorkflowExecutor::start_workflow(wce.start_workflow_input);
        }
    }

    pub fn handle_evaluation_event() {
        if let Ok(wee) = EVAL_EVENT_CHANNEL.1.recv() {
            let _ = WorkflowExecutor::decide_workflow(&wee.workflow_id);
        }
    }

    pub fn evaluate_once() -> SgResult<()> {
        let wee = EVAL_EVENT_CHANNEL
            .1
            .try_recv()
            .map_err(|_| ErrorCode::NotFound("Evaluation Event not found"))?;
        WorkflowExecutor::decide_workflow(&wee.workflow_id)
    }
}
