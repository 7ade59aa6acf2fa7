use std::cell::RefCell;

use crate::model::{TaskModel, WorkflowStatus};

// The TerminateWorkflow error code carries its reason in the error itself;
// the intended workflow status and the offending task travel alongside it in
// these slots, set by the decider and drained by the executor on the same
// thread.
thread_local! {
    pub static STATUS: RefCell<Option<WorkflowStatus>> = RefCell::new(None);
    pub static TASK: RefCell<Option<TaskModel>> = RefCell::new(None);
}
