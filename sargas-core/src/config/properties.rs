use sargas_common::prelude::*;

pub struct Properties {
    /// The time after which a pending task with no update is pushed back into
    /// its queue. Config key `task.requeue.timeout`.
    pub task_requeue_timeout_ms: i64,
    /// Upper bound on a single search page. Config key
    /// `workflow.max.search.size`.
    pub max_search_size: i32,
    /// The longest a worker may long-poll for in one call.
    pub max_poll_timeout_ms: i32,
    /// How long a popped queue entry stays invisible before it is handed out
    /// again when not acknowledged.
    pub queue_unack_timeout_ms: i64,
    /// The visibility delay used when a workflow is pushed to the decider
    /// queue for its periodic sweep.
    pub workflow_offset_timeout_sec: i64,
    /// Payload size ceilings in kilobytes. Larger payloads are moved to
    /// external storage and replaced by a path.
    pub workflow_input_payload_threshold_kb: i64,
    pub workflow_output_payload_threshold_kb: i64,
    pub task_input_payload_threshold_kb: i64,
    pub task_output_payload_threshold_kb: i64,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            task_requeue_timeout_ms: 60_000,
            max_search_size: 5_000,
            max_poll_timeout_ms: 5_000,
            queue_unack_timeout_ms: 60_000,
            workflow_offset_timeout_sec: 30,
            workflow_input_payload_threshold_kb: 5_120,
            workflow_output_payload_threshold_kb: 5_120,
            task_input_payload_threshold_kb: 3_072,
            task_output_payload_threshold_kb: 3_072,
        }
    }
}

static PROPERTIES: Lazy<Properties> = Lazy::new(Properties::default);

impl Properties {
    pub fn get() -> &'static Properties {
        &PROPERTIES
    }
}
