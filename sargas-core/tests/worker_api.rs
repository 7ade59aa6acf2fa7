use sargas_common::prelude::*;
use sargas_common::{StartWorkflowRequest, TaskResult};
use sargas_core::{ExecutionService, TaskService, WorkflowService, WorkflowStatus};

fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

fn start_request(json: &str) -> StartWorkflowRequest {
    let json: serde_json::Value = serde_json::from_str(json).expect("parse json failed");
    json.try_into().expect("parse StartWorkflowRequest failed")
}

#[test]
fn poll_rejects_timeouts_over_five_seconds() {
    init_logger();
    let err = ExecutionService::batch_poll("wapi_any_task", "worker_1", "", 1, 6_000)
        .expect_err("poll must be rejected");
    assert_eq!(err.code(), ErrorCode::invalid_input_code());
}

#[test]
fn empty_task_type_is_rejected() {
    init_logger();
    let err = TaskService::batch_poll(" ", "worker_1", "", 1, 100).expect_err("must be rejected");
    assert_eq!(err.code(), ErrorCode::invalid_input_code());
}

/// Full worker round trip: start, poll, ack, complete each task, workflow
/// completes with the last task's output.
#[test]
fn linear_workflow_round_trip() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wapi_linear_wf",
            "input": { "requestId": "r-42" },
            "workflowDef": {
                "name": "wapi_linear_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wapi_task_a",
                        "taskReferenceName": "wapi_task_a_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": { "requestId": "${workflow.input.requestId}" }
                    },
                    {
                        "name": "wapi_task_b",
                        "taskReferenceName": "wapi_task_b_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": { "previous": "${wapi_task_a_ref.output.result}" }
                    }
                ]
            }
        }"#,
    ))
    .expect("start_workflow failed");

    // the first evaluation is queued on the evaluation channel; tests drive
    // it directly to stay independent of the background loops
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    let tasks =
        TaskService::batch_poll("wapi_task_a", "worker_1", "", 1, 500).expect("poll failed");
    assert_eq!(tasks.len(), 1);
    let task_a = &tasks[0].inner;
    assert_eq!(task_a.workflow_instance_id, workflow_id);
    assert_eq!(
        task_a.input_data.get(&InlineStr::from("requestId")),
        Some(&Object::String("r-42".into()))
    );
    assert_eq!(task_a.poll_count, 1);
    assert!(TaskService::ack_task_received(&task_a.task_id).expect("ack failed"));

    let mut result = TaskResult::complete(workflow_id.clone(), task_a.task_id.clone());
    result.worker_id = "worker_1".into();
    result
        .output_data
        .insert("result".into(), Object::String("a-done".into()));
    TaskService::update_task(result).expect("update failed");

    let tasks =
        TaskService::batch_poll("wapi_task_b", "worker_2", "", 1, 500).expect("poll failed");
    assert_eq!(tasks.len(), 1);
    let task_b = &tasks[0].inner;
    // the resolver carried task A's output into task B's input
    assert_eq!(
        task_b.input_data.get(&InlineStr::from("previous")),
        Some(&Object::String("a-done".into()))
    );

    let mut result = TaskResult::complete(workflow_id.clone(), task_b.task_id.clone());
    result
        .output_data
        .insert("final".into(), Object::String("b-done".into()));
    TaskService::update_task(result).expect("update failed");

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    let model = workflow.workflow.expect("workflow model present");
    // no output parameters declared: the last task's output becomes the
    // workflow output
    assert_eq!(
        model.output.get(&InlineStr::from("final")),
        Some(&Object::String("b-done".into()))
    );
}

/// The concurrency limit drops surplus polls: the ids stay consumed but the
/// worker sees fewer tasks than requested.
#[test]
fn poll_respects_concurrency_limit() {
    init_logger();
    let request = r#"{
        "name": "wapi_limit_wf",
        "workflowDef": {
            "name": "wapi_limit_wf",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {
                    "name": "wapi_limited_task",
                    "taskReferenceName": "wapi_limited_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {},
                    "taskDefinition": {
                        "name": "wapi_limited_task",
                        "retryCount": 0,
                        "retryLogic": "FIXED",
                        "retryDelaySeconds": 0,
                        "timeoutPolicy": "TIME_OUT_WF",
                        "timeoutSeconds": 0,
                        "responseTimeoutSeconds": 3600,
                        "concurrentExecLimit": 1
                    }
                }
            ]
        }
    }"#;
    sargas_core::MetadataDao::register_task_def({
        let json: serde_json::Value = serde_json::from_str(
            r#"{
                "name": "wapi_limited_task",
                "retryCount": 0,
                "retryLogic": "FIXED",
                "retryDelaySeconds": 0,
                "timeoutPolicy": "TIME_OUT_WF",
                "timeoutSeconds": 0,
                "responseTimeoutSeconds": 3600,
                "concurrentExecLimit": 1
            }"#,
        )
        .expect("parse json failed");
        sargas_common::TaskDef::try_from(&json).expect("parse TaskDef failed")
    });

    let workflow_1 =
        WorkflowService::start_workflow(start_request(request)).expect("start 1 failed");
    WorkflowService::decide_workflow(&workflow_1).expect("evaluation failed");
    let workflow_2 =
        WorkflowService::start_workflow(start_request(request)).expect("start 2 failed");
    WorkflowService::decide_workflow(&workflow_2).expect("evaluation failed");

    let tasks = TaskService::batch_poll("wapi_limited_task", "worker_1", "", 2, 500)
        .expect("poll failed");
    assert_eq!(tasks.len(), 1);
}

/// Bumping one task type pushes its stale reservations back to visible.
#[test]
fn requeue_restores_a_consumed_reservation() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wapi_requeue_wf",
            "workflowDef": {
                "name": "wapi_requeue_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wapi_requeue_task",
                        "taskReferenceName": "wapi_requeue_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    // the worker dies right after the poll
    let tasks = TaskService::batch_poll("wapi_requeue_task", "worker_gone", "", 1, 500)
        .expect("poll failed");
    assert_eq!(tasks.len(), 1);
    assert_eq!(sargas_core::QueueDao::get_size("wapi_requeue_task"), 0);

    let count = TaskService::requeue_pending_tasks("wapi_requeue_task").expect("requeue failed");
    assert_eq!(count, 1);
    assert_eq!(sargas_core::QueueDao::get_size("wapi_requeue_task"), 1);

    let tasks = TaskService::batch_poll("wapi_requeue_task", "worker_2", "", 1, 500)
        .expect("poll failed");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].inner.workflow_instance_id, workflow_id);
}

/// Worker log lines are kept per task execution.
#[test]
fn task_logs_round_trip() {
    init_logger();
    TaskService::log("wapi_log_task_id", "the worker did a thing").expect("log failed");
    let logs = ExecutionService::get_task_logs("wapi_log_task_id");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].log, "the worker did a thing");
}
