mod config;
mod dao;
mod metrics;
mod model;
mod runtime;
mod service;
mod utils;

pub use config::Properties;
pub use dao::{ExecutionDao, MetadataDao, PollData, QueueDao};
pub use model::{
    SearchResult, Task, TaskModel, TaskStatus, TaskSummary, Workflow, WorkflowModel,
    WorkflowStatus, WorkflowSummary,
};
pub use runtime::{
    Channel, DeciderOutcome, DeciderService, StartWorkflowInput, WorkflowExecutor, WorkflowSweeper,
};
pub use service::{ExecutionService, TaskService, WorkflowService};
pub use utils::{ExternalPayloadStorageUtils, PayloadType, QueueUtils};

/// Spawns the background loops draining the workflow creation and evaluation
/// channels, plus the periodic decider sweep.
pub fn spawn_event_loops() {
    std::thread::spawn(|| loop {
        runtime::Channel::handle_creation_event()
    });

    std::thread::spawn(|| loop {
        runtime::Channel::handle_evaluation_event()
    });

    std::thread::spawn(|| loop {
        let _ = runtime::WorkflowSweeper::sweep_once();
    });
}

pub fn evaluate_once() -> sargas_common::prelude::SgResult<()> {
    runtime::Channel::evaluate_once()
}
