use sargas_common::prelude::*;
use sargas_common::TaskType;

use super::workflow_system_task::WorkflowSystemTask;
use crate::model::{TaskModel, TaskStatus, WorkflowModel};

/// Collects the forked branches. Completes once every joined reference is
/// terminal; fails as soon as one of them finished unsuccessfully and was not
/// optional.
pub struct Join;

impl WorkflowSystemTask for Join {
    fn get_task_type(&self) -> &str {
        TaskType::Join.as_ref()
    }

    fn execute(&self, workflow: &WorkflowModel, task: &mut TaskModel) -> bool {
        let join_on = task
            .input_data
            .get("joinOn")
            .and_then(|x| x.as_list())
            .map(|x| x.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .unwrap_or_default();

        let mut all_done = true;
        for join_on_ref in &join_on {
            let forked_task = match workflow.get_task_by_ref_name(join_on_ref) {
                Ok(forked_task) => forked_task,
                Err(_) => None,
            };
            let forked_task = match forked_task {
                Some(forked_task) => forked_task,
                None => {
                    // the task being joined on has not been scheduled yet
                    all_done = false;
                    break;
                }
            };

            if !forked_task.status.is_terminal() {
                all_done = false;
                break;
            }
            task.output_data.insert(
                join_on_ref.as_str().into(),
                forked_task.output_data.clone().into(),
            );
            if !forked_task.status.is_successful()
                && !forked_task
                    .workflow_task
                    .as_ref()
                    .map(|x| x.optional)
                    .unwrap_or(false)
            {
                task.status = TaskStatus::Failed;
                task.reason_for_incompletion =
                    forked_task.reason_for_incompletion.clone();
                return true;
            }
        }

        if all_done {
            task.status = TaskStatus::Completed;
            return true;
        }
        false
    }
}
