use sargas_common::prelude::*;

use crate::model::TaskModel;

pub struct QueueUtils;

impl QueueUtils {
    /// Part of the wire contract: producers and consumers agree on this
    /// separator.
    pub const DOMAIN_SEPARATOR: &'static str = ":";

    pub fn get_queue_name_by_task_model(task_model: &TaskModel) -> InlineStr {
        Self::get_queue_name(&task_model.task_type, &task_model.domain)
    }

    /// `<taskType>` or `<taskType>:<domain>` when a domain is set.
    pub fn get_queue_name(task_type: &str, domain: &str) -> InlineStr {
        let mut queue_name = InlineStr::from(task_type);
        if !domain.is_empty() {
            queue_name.push_str(Self::DOMAIN_SEPARATOR);
            queue_name.push_str(domain);
        }
        queue_name
    }

    pub fn get_task_type(queue: &str) -> InlineStr {
        if queue.is_empty() {
            return InlineStr::from("");
        }

        match queue.find(Self::DOMAIN_SEPARATOR) {
            Some(index) => InlineStr::from(&queue[..index]),
            None => InlineStr::from(queue),
        }
    }

    pub fn is_domain_queue(queue: &str) -> bool {
        queue.contains(Self::DOMAIN_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    #[test]
    fn queue_name_grammar() {
        assert_eq!(QueueUtils::get_queue_name("encode", ""), "encode");
        assert_eq!(QueueUtils::get_queue_name("encode", "eu"), "encode:eu");
        assert_eq!(QueueUtils::get_task_type("encode:eu"), "encode");
        assert_eq!(QueueUtils::get_task_type("encode"), "encode");
        assert!(QueueUtils::is_domain_queue("encode:eu"));
        assert!(!QueueUtils::is_domain_queue("encode"));
    }

    #[test]
    fn queue_name_from_task() {
        let mut task = TaskModel::new(TaskStatus::Scheduled);
        task.task_type = "encode".into();
        assert_eq!(QueueUtils::get_queue_name_by_task_model(&task), "encode");
        task.domain = "eu".into();
        assert_eq!(QueueUtils::get_queue_name_by_task_model(&task), "encode:eu");
    }
}
