use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use keyed_priority_queue::KeyedPriorityQueue;
use parking_lot::Mutex;
use sargas_common::prelude::*;

use crate::config::Properties;

/// DAO responsible for queuing tasks for the workers. Named FIFO queues with
/// per-item visibility delay and an unacked holding area: a popped id stays
/// invisible until it is acked, removed, or its unack timer lapses and it is
/// handed out again.
pub struct QueueDao;

static QUEUES: Lazy<DashMap<InlineStr, Mutex<QueueState>>> = Lazy::new(DashMap::new);

/// Per-queue state. `visible` is ordered by the instant an id becomes
/// poppable (scores are negated, the priority queue yields its maximum).
/// `unacked` maps an id to the instant it goes back to `visible`.
struct QueueState {
    visible: KeyedPriorityQueue<InlineStr, i64>,
    unacked: HashMap<InlineStr, i64>,
}

impl QueueState {
    fn new() -> Self {
        Self {
            visible: KeyedPriorityQueue::new(),
            unacked: HashMap::new(),
        }
    }
}

impl QueueDao {
    pub const DECIDER_QUEUE: &'static str = "_deciderQueue";

    pub fn push(queue_name: &str, id: &InlineStr, offset_time_in_seconds: i64) {
        let visible_at = Utc::now().timestamp_millis() + offset_time_in_seconds * 1000;
        let queue = QUEUES
            .entry(queue_name.into())
            .or_insert_with(|| Mutex::new(QueueState::new()));
        let mut state = queue.lock();
        state.unacked.remove(id);
        state.visible.push(id.clone(), -visible_at);
    }

    /// return true only when the id was not present, visible or unacked
    pub fn push_if_not_exists(queue_name: &str, id: &InlineStr, offset_time_in_seconds: i64) -> bool {
        let visible_at = Utc::now().timestamp_millis() + offset_time_in_seconds * 1000;
        let queue = QUEUES
            .entry(queue_name.into())
            .or_insert_with(|| Mutex::new(QueueState::new()));
        let mut state = queue.lock();
        if state.visible.get_priority(id).is_some() || state.unacked.contains_key(id) {
            return false;
        }
        state.visible.push(id.clone(), -visible_at);
        true
    }

    /// Pops up to `count` visible ids, blocking up to `timeout_ms` for them to
    /// become available. Popped ids move to the unacked area; if they are not
    /// acknowledged in a timely manner they are pushed back into the queue.
    pub fn pop(queue_name: &str, count: i32, timeout_ms: i32) -> SgResult<Vec<InlineStr>> {
        let started = Instant::now();
        let mut message_ids = Vec::with_capacity(count.max(0) as usize);

        loop {
            if let Some(queue) = QUEUES.get(queue_name) {
                let mut state = queue.lock();
                Self::process_unacks(&mut state);

                let unack_at = Utc::now().timestamp_millis()
                    + Properties::get().queue_unack_timeout_ms;
                while (message_ids.len() as i32) < count {
                    let ready = state
                        .visible
                        .peek()
                        .map(|(_, &score)| -score <= Utc::now().timestamp_millis())
                        .unwrap_or(false);
                    if !ready {
                        break;
                    }
                    let (message_id, _) = state.visible.pop().expect("peeked above");
                    state.unacked.insert(message_id.clone(), unack_at);
                    message_ids.push(message_id);
                }
            }

            if (message_ids.len() as i32) >= count {
                break;
            }
            let elapsed_ms = started.elapsed().as_millis() as i32;
            if elapsed_ms >= timeout_ms {
                break;
            }
            // at most sleep 10ms between attempts
            std::thread::sleep(Duration::from_millis(
                ((timeout_ms - elapsed_ms) as u64).min(10),
            ));
        }

        Ok(message_ids)
    }

    /// return true if the message was found unacked and removed
    pub fn ack(queue_name: &str, message_id: &InlineStr) -> bool {
        if let Some(queue) = QUEUES.get(queue_name) {
            queue.lock().unacked.remove(message_id).is_some()
        } else {
            false
        }
    }

    pub fn remove(queue_name: &str, message_id: &InlineStr) -> SgResult<()> {
        if let Some(queue) = QUEUES.get(queue_name) {
            let mut state = queue.lock();
            state.visible.remove(message_id);
            state.unacked.remove(message_id);
        }
        Ok(())
    }

    /// Membership in the visible set only: a dequeued-for-work id does not
    /// exist until it is pushed back.
    pub fn exists(queue_name: &str, message_id: &InlineStr) -> bool {
        if let Some(queue) = QUEUES.get(queue_name) {
            queue.lock().visible.get_priority(message_id).is_some()
        } else {
            false
        }
    }

    pub fn get_size(queue_name: &str) -> i32 {
        QUEUES
            .get(queue_name)
            .map(|queue| queue.lock().visible.len() as i32)
            .unwrap_or(0)
    }

    pub fn queues_detail() -> HashMap<InlineStr, i64> {
        QUEUES
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().lock().visible.len() as i64))
            .collect()
    }

    /// Postpone a given message with `postpone_duration_in_seconds`, so that
    /// the message won't be available for further polls until the duration
    /// passes. The message is removed and pushed back with the new delay.
    pub fn postpone(
        queue_name: &str,
        message_id: &InlineStr,
        postpone_duration_in_seconds: i64,
    ) -> SgResult<bool> {
        Self::remove(queue_name, message_id)?;
        Self::push(queue_name, message_id, postpone_duration_in_seconds);
        Ok(true)
    }

    fn process_unacks(state: &mut QueueState) {
        let now = Utc::now().timestamp_millis();
        let expired = state
            .unacked
            .iter()
            .filter(|(_, &requeue_at)| requeue_at <= now)
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        for id in expired {
            state.unacked.remove(&id);
            state.visible.push(id, -now);
        }
    }
}
