use sargas_common::prelude::*;
use sargas_common::WorkflowDef;
use sargas_core::{
    DeciderService, QueueDao, QueueUtils, StartWorkflowInput, TaskStatus, WorkflowModel,
};

fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

fn parse_def(json: &str) -> WorkflowDef {
    let json: serde_json::Value = serde_json::from_str(json).expect("parse json failed");
    WorkflowDef::try_from(&json).expect("parse WorkflowDef failed")
}

fn start_input() -> StartWorkflowInput {
    StartWorkflowInput {
        name: InlineStr::new(),
        version: None,
        workflow_definition: None,
        workflow_input: HashMap::default(),
        external_input_payload_storage_path: InlineStr::new(),
        correlation_id: InlineStr::new(),
        task_to_domain: HashMap::default(),
        workflow_id: InlineStr::new(),
    }
}

fn linear_def(name: &str, task_a: &str, task_b: &str) -> WorkflowDef {
    parse_def(&format!(
        r#"{{
            "name": "{name}",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {{
                    "name": "{task_a}",
                    "taskReferenceName": "{task_a}_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {{}}
                }},
                {{
                    "name": "{task_b}",
                    "taskReferenceName": "{task_b}_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {{}}
                }}
            ]
        }}"#
    ))
}

/// Linear two-task workflow driven to completion through successive decides.
#[test]
fn linear_happy_path() {
    init_logger();
    let def = linear_def("linear_happy_path_wf", "lhp_task_a", "lhp_task_b");
    let mut workflow = WorkflowModel::new("lhp_wf_1".into(), &def, &start_input());

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    let task_a = &outcome.tasks_to_be_scheduled[0];
    assert_eq!(task_a.reference_task_name, "lhp_task_a_ref");
    assert_eq!(task_a.status, TaskStatus::Scheduled);
    assert!(!outcome.is_complete);

    // worker completes A
    let mut task_a = task_a.clone();
    task_a.status = TaskStatus::Completed;
    workflow.tasks.push(task_a);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    let task_b = &outcome.tasks_to_be_scheduled[0];
    assert_eq!(task_b.reference_task_name, "lhp_task_b_ref");
    assert!(workflow.tasks[0].executed);

    // worker completes B
    let mut task_b = task_b.clone();
    task_b.status = TaskStatus::Completed;
    workflow.tasks.push(task_b);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert!(outcome.tasks_to_be_scheduled.is_empty());
    assert!(outcome.is_complete);
}

/// Two decides over the same snapshot yield the same plan.
#[test]
fn decide_is_referentially_transparent() {
    init_logger();
    let def = linear_def("decide_pure_wf", "pure_task_a", "pure_task_b");
    let workflow = WorkflowModel::new("pure_wf_1".into(), &def, &start_input());

    let mut first = workflow.clone();
    let mut second = workflow.clone();
    let outcome_a = DeciderService::decide(&mut first, &def).expect("decide failed");
    let outcome_b = DeciderService::decide(&mut second, &def).expect("decide failed");

    let refs = |outcome: &sargas_core::DeciderOutcome| {
        outcome
            .tasks_to_be_scheduled
            .iter()
            .map(|x| (x.reference_task_name.clone(), x.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(refs(&outcome_a), refs(&outcome_b));
    assert_eq!(outcome_a.is_complete, outcome_b.is_complete);
    assert_eq!(
        outcome_a.tasks_to_be_updated.len(),
        outcome_b.tasks_to_be_updated.len()
    );
}

/// An executed task never shows up again, neither scheduled nor updated.
#[test]
fn executed_tasks_are_left_alone() {
    init_logger();
    let def = linear_def("executed_mono_wf", "mono_task_a", "mono_task_b");
    let mut workflow = WorkflowModel::new("mono_wf_1".into(), &def, &start_input());

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut task_a = outcome.tasks_to_be_scheduled[0].clone();
    task_a.status = TaskStatus::Completed;
    workflow.tasks.push(task_a);
    // A becomes executed here
    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut task_b = outcome.tasks_to_be_scheduled[0].clone();
    task_b.status = TaskStatus::InProgress;
    workflow.tasks.push(task_b);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    for task in outcome
        .tasks_to_be_scheduled
        .iter()
        .chain(outcome.tasks_to_be_updated.iter())
    {
        assert_ne!(task.reference_task_name, "mono_task_a_ref");
    }
}

fn retry_def(name: &str, task: &str) -> WorkflowDef {
    parse_def(&format!(
        r#"{{
            "name": "{name}",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {{
                    "name": "{task}",
                    "taskReferenceName": "{task}_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {{}},
                    "taskDefinition": {{
                        "name": "{task}",
                        "retryCount": 2,
                        "retryLogic": "EXPONENTIAL_BACKOFF",
                        "retryDelaySeconds": 5,
                        "timeoutPolicy": "TIME_OUT_WF",
                        "timeoutSeconds": 0,
                        "responseTimeoutSeconds": 0
                    }}
                }}
            ]
        }}"#
    ))
}

/// Retries with exponential backoff until the retry budget is exhausted, then
/// the workflow is failed.
#[test]
fn retry_with_backoff_until_exhausted() {
    init_logger();
    let def = retry_def("retry_backoff_wf", "rb_task_a");
    let mut workflow = WorkflowModel::new("rb_wf_1".into(), &def, &start_input());

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut attempt_1 = outcome.tasks_to_be_scheduled[0].clone();
    attempt_1.status = TaskStatus::Failed;
    attempt_1.reason_for_incompletion = "worker blew up".into();
    workflow.tasks.push(attempt_1);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    let attempt_2 = outcome.tasks_to_be_scheduled[0].clone();
    assert_eq!(attempt_2.retry_count, 1);
    assert_eq!(attempt_2.start_delay_in_seconds, 5);
    assert_eq!(attempt_2.status, TaskStatus::Scheduled);
    // the retry chain links back to the failed attempt, which is now retried
    assert_eq!(attempt_2.retried_task_id, workflow.tasks[0].task_id);
    assert!(workflow.tasks[0].retried);
    assert!(outcome
        .tasks_to_be_updated
        .iter()
        .any(|x| x.task_id == workflow.tasks[0].task_id));

    let mut attempt_2 = attempt_2;
    attempt_2.status = TaskStatus::Failed;
    workflow.tasks.push(attempt_2);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut attempt_3 = outcome.tasks_to_be_scheduled[0].clone();
    assert_eq!(attempt_3.retry_count, 2);
    assert_eq!(attempt_3.start_delay_in_seconds, 10);

    attempt_3.status = TaskStatus::Failed;
    attempt_3.reason_for_incompletion = "still broken".into();
    workflow.tasks.push(attempt_3);

    // no retries left: the decider demands termination
    let err = DeciderService::decide(&mut workflow, &def).expect_err("decide must fail");
    assert_eq!(err.code(), ErrorCode::TERMINATE_WORKFLOW_CODE);
}

/// A failed optional task is recorded as COMPLETED_WITH_ERRORS and the
/// workflow moves on.
#[test]
fn optional_task_failure_moves_on() {
    init_logger();
    let def = parse_def(
        r#"{
            "name": "optional_failure_wf",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {
                    "name": "opt_task_a",
                    "taskReferenceName": "opt_task_a_ref",
                    "type": "USER_DEFINED",
                    "optional": true,
                    "inputParameters": {}
                },
                {
                    "name": "opt_task_b",
                    "taskReferenceName": "opt_task_b_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {}
                }
            ]
        }"#,
    );
    let mut workflow = WorkflowModel::new("opt_wf_1".into(), &def, &start_input());

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut task_a = outcome.tasks_to_be_scheduled[0].clone();
    task_a.status = TaskStatus::Failed;
    workflow.tasks.push(task_a);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(workflow.tasks[0].status, TaskStatus::CompletedWithErrors);
    assert!(workflow.tasks[0].executed);
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    assert_eq!(
        outcome.tasks_to_be_scheduled[0].reference_task_name,
        "opt_task_b_ref"
    );
}

/// While the task id sits in its queue a registered callback is pending, so
/// the response timeout must not fire no matter how stale the update is.
#[test]
fn response_timeout_suppressed_by_queue_presence() {
    init_logger();
    let def = parse_def(
        r#"{
            "name": "response_timeout_wf",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {
                    "name": "rt_task_a",
                    "taskReferenceName": "rt_task_a_ref",
                    "type": "USER_DEFINED",
                    "inputParameters": {},
                    "taskDefinition": {
                        "name": "rt_task_a",
                        "retryCount": 1,
                        "retryLogic": "FIXED",
                        "retryDelaySeconds": 0,
                        "timeoutPolicy": "TIME_OUT_WF",
                        "timeoutSeconds": 0,
                        "responseTimeoutSeconds": 1
                    }
                }
            ]
        }"#,
    );
    let mut workflow = WorkflowModel::new("rt_wf_1".into(), &def, &start_input());

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    let mut task_a = outcome.tasks_to_be_scheduled[0].clone();
    task_a.status = TaskStatus::InProgress;
    task_a.update_time = chrono::Utc::now().timestamp_millis() - 5_000;
    workflow.tasks.push(task_a.clone());

    // the task is present in its queue: callback registered
    let queue_name = QueueUtils::get_queue_name(&task_a.task_type, "");
    QueueDao::push(&queue_name, &task_a.task_id, 0);

    DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(workflow.tasks[0].status, TaskStatus::InProgress);

    // once the queue entry is gone the stale update times the task out and a
    // retry is produced
    QueueDao::remove(&queue_name, &task_a.task_id).expect("remove failed");
    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(workflow.tasks[0].status, TaskStatus::TimedOut);
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    assert_eq!(outcome.tasks_to_be_scheduled[0].retry_count, 1);
}

/// A decision that already produced its branch must not duplicate it.
#[test]
fn decision_with_children_produces_nothing() {
    init_logger();
    let def = parse_def(
        r#"{
            "name": "decision_children_wf",
            "version": 1,
            "schemaVersion": 2,
            "tasks": [
                {
                    "name": "dc_decide",
                    "taskReferenceName": "dc_decide_ref",
                    "type": "DECISION",
                    "caseValueParam": "case",
                    "inputParameters": {},
                    "decisionCases": {
                        "a": [
                            {
                                "name": "dc_branch_a",
                                "taskReferenceName": "dc_branch_a_ref",
                                "type": "USER_DEFINED",
                                "inputParameters": {}
                            }
                        ]
                    }
                }
            ]
        }"#,
    );
    let mut workflow = WorkflowModel::new("dc_wf_1".into(), &def, &start_input());

    let mut decision = sargas_core::TaskModel::new(TaskStatus::Completed);
    decision.task_id = "dc_decision_task".into();
    decision.task_type = "DECISION".into();
    decision.task_def_name = "DECISION".into();
    decision.reference_task_name = "dc_decide_ref".into();
    decision.workflow_instance_id = workflow.workflow_id.clone();
    decision.workflow_task = def.get_task_by_ref_name("dc_decide_ref").cloned();
    decision.input_data.insert("hasChildren".into(), "true".into());

    let mut branch = sargas_core::TaskModel::new(TaskStatus::InProgress);
    branch.task_id = "dc_branch_task".into();
    branch.task_type = "dc_branch_a".into();
    branch.task_def_name = "dc_branch_a".into();
    branch.reference_task_name = "dc_branch_a_ref".into();
    branch.workflow_instance_id = workflow.workflow_id.clone();
    branch.workflow_task = def.get_task_by_ref_name("dc_branch_a_ref").cloned();

    workflow.tasks.push(decision);
    workflow.tasks.push(branch);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert!(outcome.tasks_to_be_scheduled.is_empty());
    assert!(workflow.tasks[0].executed);
}

/// A workflow marked for re-run resumes from its READY_FOR_RERUN task only.
#[test]
fn rerun_resumes_from_marked_task() {
    init_logger();
    let def = linear_def("rerun_wf", "rr_task_a", "rr_task_b");
    let mut workflow = WorkflowModel::new("rr_wf_2".into(), &def, &start_input());
    workflow.re_run_from_workflow_id = "rr_wf_1".into();

    let mut rerun_task = sargas_core::TaskModel::new(TaskStatus::ReadyForRerun);
    rerun_task.task_id = "rr_task".into();
    rerun_task.task_type = "rr_task_a".into();
    rerun_task.task_def_name = "rr_task_a".into();
    rerun_task.reference_task_name = "rr_task_a_ref".into();
    rerun_task.retry_count = 2;
    rerun_task.workflow_instance_id = workflow.workflow_id.clone();
    workflow.tasks.push(rerun_task);

    let outcome = DeciderService::decide(&mut workflow, &def).expect("decide failed");
    assert_eq!(outcome.tasks_to_be_scheduled.len(), 1);
    let resumed = &outcome.tasks_to_be_scheduled[0];
    assert_eq!(resumed.task_id, "rr_task");
    assert_eq!(resumed.status, TaskStatus::Scheduled);
    assert!(resumed.retried);
    assert_eq!(resumed.retry_count, 0);
}
