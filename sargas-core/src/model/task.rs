use super::TaskModel;

/// API view of a task execution, handed to polling workers.
#[derive(Clone, Debug)]
pub struct Task {
    pub inner: TaskModel,
}
