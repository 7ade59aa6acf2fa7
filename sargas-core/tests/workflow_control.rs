use sargas_common::prelude::*;
use sargas_common::{StartWorkflowRequest, TaskResult};
use sargas_core::{
    ExecutionService, TaskService, TaskStatus, WorkflowService, WorkflowStatus,
};

fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

fn start_request(json: &str) -> StartWorkflowRequest {
    let json: serde_json::Value = serde_json::from_str(json).expect("parse json failed");
    json.try_into().expect("parse StartWorkflowRequest failed")
}

fn complete_task(workflow_id: &InlineStr, task_id: &InlineStr, output: &[(&str, &str)]) {
    let mut result = TaskResult::complete(workflow_id.clone(), task_id.clone());
    for (k, v) in output {
        result
            .output_data
            .insert(InlineStr::from(*k), Object::String(InlineStr::from(*v)));
    }
    TaskService::update_task(result).expect("update failed");
}

/// Static fork: the fork marker completes immediately, both branches run in
/// parallel, the join collects them and the workflow completes.
#[test]
fn fork_join_runs_both_branches() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_fork_wf",
            "workflowDef": {
                "name": "wc_fork_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_fork",
                        "taskReferenceName": "wc_fork_ref",
                        "type": "FORK_JOIN",
                        "inputParameters": {},
                        "forkTasks": [
                            [
                                {
                                    "name": "wc_branch_1",
                                    "taskReferenceName": "wc_branch_1_ref",
                                    "type": "USER_DEFINED",
                                    "inputParameters": {}
                                }
                            ],
                            [
                                {
                                    "name": "wc_branch_2",
                                    "taskReferenceName": "wc_branch_2_ref",
                                    "type": "USER_DEFINED",
                                    "inputParameters": {}
                                }
                            ]
                        ]
                    },
                    {
                        "name": "wc_join",
                        "taskReferenceName": "wc_join_ref",
                        "type": "JOIN",
                        "joinOn": ["wc_branch_1_ref", "wc_branch_2_ref"]
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    let branch_1 =
        TaskService::batch_poll("wc_branch_1", "worker_1", "", 1, 500).expect("poll failed");
    let branch_2 =
        TaskService::batch_poll("wc_branch_2", "worker_2", "", 1, 500).expect("poll failed");
    assert_eq!(branch_1.len(), 1);
    assert_eq!(branch_2.len(), 1);

    complete_task(&workflow_id, &branch_1[0].inner.task_id, &[("b1", "done")]);
    // one branch done: the join still holds
    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Running);

    complete_task(&workflow_id, &branch_2[0].inner.task_id, &[("b2", "done")]);

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    let model = workflow.workflow.expect("workflow model present");
    let join = model
        .tasks
        .iter()
        .find(|x| x.reference_task_name == "wc_join_ref")
        .expect("join task present");
    assert_eq!(join.status, TaskStatus::Completed);
    // the join aggregated both branch outputs
    assert!(join.output_data.contains_key(&InlineStr::from("wc_branch_1_ref")));
    assert!(join.output_data.contains_key(&InlineStr::from("wc_branch_2_ref")));
}

/// The decision picks the branch matching the case value and marks itself
/// with hasChildren; only that branch runs.
#[test]
fn decision_runs_the_selected_branch() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_decision_wf",
            "input": { "shipper": "east" },
            "workflowDef": {
                "name": "wc_decision_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_decide",
                        "taskReferenceName": "wc_decide_ref",
                        "type": "DECISION",
                        "caseValueParam": "case",
                        "inputParameters": { "case": "${workflow.input.shipper}" },
                        "decisionCases": {
                            "east": [
                                {
                                    "name": "wc_ship_east",
                                    "taskReferenceName": "wc_ship_east_ref",
                                    "type": "USER_DEFINED",
                                    "inputParameters": {}
                                }
                            ],
                            "west": [
                                {
                                    "name": "wc_ship_west",
                                    "taskReferenceName": "wc_ship_west_ref",
                                    "type": "USER_DEFINED",
                                    "inputParameters": {}
                                }
                            ]
                        }
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    // the unselected branch has nothing queued
    let west = TaskService::batch_poll("wc_ship_west", "worker_1", "", 1, 100)
        .expect("poll failed");
    assert!(west.is_empty());

    let east =
        TaskService::batch_poll("wc_ship_east", "worker_1", "", 1, 500).expect("poll failed");
    assert_eq!(east.len(), 1);
    complete_task(&workflow_id, &east[0].inner.task_id, &[]);

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    let model = workflow.workflow.expect("workflow model present");
    let decision = model
        .tasks
        .iter()
        .find(|x| x.reference_task_name == "wc_decide_ref")
        .expect("decision task present");
    assert_eq!(decision.status, TaskStatus::Completed);
    assert!(decision.input_data.contains_key(&InlineStr::from("hasChildren")));
}

/// A task recorded as SKIPPED is walked over on the way to completion.
#[test]
fn skipped_task_is_walked_over() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_skip_wf",
            "workflowDef": {
                "name": "wc_skip_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_skip_a",
                        "taskReferenceName": "wc_skip_a_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    },
                    {
                        "name": "wc_skip_b",
                        "taskReferenceName": "wc_skip_b_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    WorkflowService::skip_task_from_workflow(&workflow_id, "wc_skip_b_ref", None)
        .expect("skip failed");

    let tasks = TaskService::batch_poll("wc_skip_a", "worker_1", "", 1, 500).expect("poll failed");
    assert_eq!(tasks.len(), 1);
    complete_task(&workflow_id, &tasks[0].inner.task_id, &[]);

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    // nothing for B was ever queued
    assert_eq!(sargas_core::QueueDao::get_size("wc_skip_b"), 0);
}

/// A paused workflow schedules nothing until it is resumed.
#[test]
fn paused_workflow_is_inert() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_pause_wf",
            "workflowDef": {
                "name": "wc_pause_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_pause_task",
                        "taskReferenceName": "wc_pause_task_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");

    WorkflowService::pause_workflow(&workflow_id).expect("pause failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");
    assert_eq!(sargas_core::QueueDao::get_size("wc_pause_task"), 0);

    WorkflowService::resume_workflow(&workflow_id).expect("resume failed");
    let tasks =
        TaskService::batch_poll("wc_pause_task", "worker_1", "", 1, 500).expect("poll failed");
    assert_eq!(tasks.len(), 1);
}

/// Termination cancels whatever is still running and clears the queues.
#[test]
fn terminate_cancels_running_tasks() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_terminate_wf",
            "workflowDef": {
                "name": "wc_terminate_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_terminate_task",
                        "taskReferenceName": "wc_terminate_task_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");
    assert_eq!(sargas_core::QueueDao::get_size("wc_terminate_task"), 1);

    WorkflowService::terminate_workflow(&workflow_id, "operator gave up").expect("terminate failed");

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Terminated);
    let model = workflow.workflow.expect("workflow model present");
    assert_eq!(model.reason_for_incompletion, "operator gave up");
    assert_eq!(model.tasks[0].status, TaskStatus::Canceled);
    assert_eq!(sargas_core::QueueDao::get_size("wc_terminate_task"), 0);
}

/// An oversized task output is moved to external storage and transparently
/// read back when it becomes the workflow output.
#[test]
fn oversized_output_round_trips_through_external_storage() {
    init_logger();
    let workflow_id = WorkflowService::start_workflow(start_request(
        r#"{
            "name": "wc_payload_wf",
            "workflowDef": {
                "name": "wc_payload_wf",
                "version": 1,
                "schemaVersion": 2,
                "tasks": [
                    {
                        "name": "wc_payload_task",
                        "taskReferenceName": "wc_payload_task_ref",
                        "type": "USER_DEFINED",
                        "inputParameters": {}
                    }
                ]
            }
        }"#,
    ))
    .expect("start failed");
    WorkflowService::decide_workflow(&workflow_id).expect("evaluation failed");

    let tasks =
        TaskService::batch_poll("wc_payload_task", "worker_1", "", 1, 500).expect("poll failed");
    assert_eq!(tasks.len(), 1);
    let task_id = tasks[0].inner.task_id.clone();

    // 4MB: over the task-output ceiling, under the workflow-output one
    let huge = "x".repeat(4 * 1024 * 1024);
    let mut result = TaskResult::complete(workflow_id.clone(), task_id.clone());
    result
        .output_data
        .insert("blob".into(), Object::String(huge.as_str().into()));
    TaskService::update_task(result).expect("update failed");

    let task = ExecutionService::get_task(&task_id).expect("task present");
    assert!(task.inner.output_data.is_empty());
    assert!(!task.inner.external_output_payload_storage_path.is_empty());

    let workflow =
        WorkflowService::get_execution_status(&workflow_id, true).expect("status failed");
    assert_eq!(workflow.status, WorkflowStatus::Completed);
    let model = workflow.workflow.expect("workflow model present");
    let blob = model
        .output
        .get(&InlineStr::from("blob"))
        .and_then(|x| x.as_string())
        .expect("blob carried into the workflow output");
    assert_eq!(blob.len(), huge.len());
}
