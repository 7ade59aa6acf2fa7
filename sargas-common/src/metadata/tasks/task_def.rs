use std::str::FromStr;

use strum_macros::{AsRefStr, EnumString};

use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct TaskDef {
    /// Task Name. Unique name of the Task that resonates with its function.
    pub name: InlineStr,
    /// Description of the task
    pub description: InlineStr,
    /// Number of retries to attempt when a Task is marked as failure
    /// Defaults to 3 with maximum allowed capped at 10
    pub retry_count: i32,
    /// Mechanism for the retries
    pub retry_logic: RetryLogic,
    /// Time to wait before retries
    /// Defaults to 60 seconds
    pub retry_delay_seconds: i32,
    /// Task's timeout policy
    /// Defaults to TIME_OUT_WF
    pub timeout_policy: TimeoutPolicy,
    /// Time in seconds, after which the task is marked as TIMED_OUT if not
    /// completed after transitioning to IN_PROGRESS status for the first time
    /// No timeouts if set to 0
    pub timeout_seconds: i32,
    /// If greater than 0, the task is rescheduled if not updated with a status
    /// after this time (heartbeat mechanism). Useful when the worker polls for
    /// the task but fails to complete due to errors/network failure.
    /// Defaults to 3600
    pub response_timeout_seconds: i32,
    /// Define default input values.
    pub input_template: HashMap<InlineStr, Object>,
    /// Number of tasks that can be executed at any given time
    pub concurrent_exec_limit: Option<i32>,
}

impl TaskDef {
    pub const ONE_HOUR_SECS: i32 = 3600;

    pub fn concurrency_limit(&self) -> i32 {
        self.concurrent_exec_limit.unwrap_or(0)
    }

    pub fn get_response_timeout_seconds(&self) -> i32 {
        if self.response_timeout_seconds == 0 {
            if self.timeout_seconds == 0 {
                Self::ONE_HOUR_SECS
            } else {
                self.timeout_seconds
            }
        } else {
            self.response_timeout_seconds
        }
    }
}

impl TaskDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: InlineStr::from(name),
            description: InlineStr::new(),
            retry_count: 3,
            retry_logic: RetryLogic::Fixed,
            retry_delay_seconds: 60,
            timeout_policy: TimeoutPolicy::TimeOutWf,
            timeout_seconds: 0,
            response_timeout_seconds: Self::ONE_HOUR_SECS,
            input_template: HashMap::default(),
            concurrent_exec_limit: None,
        }
    }
}

impl TryFrom<&serde_json::Value> for TaskDef {
    type Error = ErrorCode;
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let input_template = if value.get("inputTemplate").is_none() {
            HashMap::default()
        } else {
            Object::convert_jsonmap_to_hashmap(
                value
                    .get("inputTemplate")
                    .and_then(|x| x.as_object())
                    .ok_or(ErrorCode::InvalidInput("inputTemplate invalid"))?,
            )
        };

        Ok(Self {
            name: value
                .get("name")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("name not found"))?
                .trim()
                .into(),
            description: value
                .get("description")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
            retry_count: value
                .get("retryCount")
                .unwrap_or(&serde_json::json!(3))
                .as_i64()
                .map(|x| x as i32)
                .and_then(|x| if !(0..=10).contains(&x) { None } else { Some(x) })
                .ok_or(ErrorCode::InvalidInput("retryCount must in range [0..=10]"))?,
            retry_logic: RetryLogic::from_str(
                value
                    .get("retryLogic")
                    .and_then(|x| x.as_str())
                    .unwrap_or("FIXED")
                    .trim(),
            )
            .map_err(|_| ErrorCode::InvalidInput("retryLogic invalid"))?,
            retry_delay_seconds: value
                .get("retryDelaySeconds")
                .unwrap_or(&serde_json::json!(60))
                .as_i64()
                .ok_or(ErrorCode::InvalidInput("retryDelaySeconds invalid"))?
                as i32,
            timeout_policy: TimeoutPolicy::from_str(
                value
                    .get("timeoutPolicy")
                    .and_then(|x| x.as_str())
                    .unwrap_or("TIME_OUT_WF")
                    .trim(),
            )
            .map_err(|_| ErrorCode::InvalidInput("timeoutPolicy invalid"))?,
            timeout_seconds: value
                .get("timeoutSeconds")
                .unwrap_or(&serde_json::json!(0))
                .as_i64()
                .ok_or(ErrorCode::InvalidInput("timeoutSeconds invalid"))?
                as i32,
            response_timeout_seconds: value
                .get("responseTimeoutSeconds")
                .unwrap_or(&serde_json::json!(3600))
                .as_i64()
                .ok_or(ErrorCode::InvalidInput("responseTimeoutSeconds invalid"))?
                as i32,
            input_template,
            concurrent_exec_limit: value
                .get("concurrentExecLimit")
                .and_then(|x| x.as_i64())
                .map(|x| x as i32),
        })
    }
}

#[derive(Clone, Copy, Debug, AsRefStr, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeoutPolicy {
    /// Retries the task again
    Retry,
    /// Workflow is marked as TIMED_OUT and terminated. This is the default value.
    TimeOutWf,
    /// Registers a counter (task_timeout)
    AlertOnly,
}

#[derive(Clone, Copy, Debug, AsRefStr, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryLogic {
    /// Reschedule the task after retry_delay_seconds
    Fixed,
    /// Reschedule after retry_delay_seconds * (1 + attempt_number)
    ExponentialBackoff,
}
