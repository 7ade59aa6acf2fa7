use chrono::Utc;
use dashmap::DashMap;
use sargas_common::prelude::*;

/// The most recent poll observed per task queue and domain.
#[derive(Clone, Debug)]
pub struct PollData {
    pub queue_name: InlineStr,
    pub domain: InlineStr,
    pub worker_id: InlineStr,
    pub last_poll_time: i64,
}

pub struct PollDataDao;

static POLL_DATA: Lazy<DashMap<(InlineStr, InlineStr), PollData>> = Lazy::new(DashMap::new);

const DEFAULT_DOMAIN: &str = "DEFAULT";

impl PollDataDao {
    /// Updates the `PollData` information with the most recently polled data
    /// for a task queue.
    pub fn update_last_poll_data(task_def_name: &str, domain: &str, worker_id: &str) {
        let effective_domain: InlineStr = if domain.is_empty() {
            DEFAULT_DOMAIN.into()
        } else {
            domain.into()
        };
        POLL_DATA.insert(
            (task_def_name.into(), effective_domain.clone()),
            PollData {
                queue_name: task_def_name.into(),
                domain: effective_domain,
                worker_id: worker_id.into(),
                last_poll_time: Utc::now().timestamp_millis(),
            },
        );
    }

    pub fn get_poll_data(task_def_name: &str) -> Vec<PollData> {
        POLL_DATA
            .iter()
            .filter(|entry| entry.key().0.eq(task_def_name))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn get_all_poll_data() -> Vec<PollData> {
        POLL_DATA.iter().map(|entry| entry.value().clone()).collect()
    }
}
