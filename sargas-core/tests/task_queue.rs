use std::time::Instant;

use sargas_common::prelude::*;
use sargas_core::QueueDao;

fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

#[test]
fn pop_returns_within_timeout() {
    init_logger();
    let started = Instant::now();
    let popped = QueueDao::pop("tq_empty_queue", 1, 200).expect("pop failed");
    assert!(popped.is_empty());
    // some leeway over the requested 200ms
    assert!(started.elapsed().as_millis() < 1_000);
}

#[test]
fn push_if_not_exists_is_idempotent() {
    init_logger();
    let queue = "tq_idempotent_queue";
    let id = InlineStr::from("tq_idem_id");

    assert!(QueueDao::push_if_not_exists(queue, &id, 0));
    assert!(!QueueDao::push_if_not_exists(queue, &id, 0));
    assert_eq!(QueueDao::get_size(queue), 1);
}

#[test]
fn popped_ids_move_to_the_unacked_area() {
    init_logger();
    let queue = "tq_unacked_queue";
    let id = InlineStr::from("tq_unacked_id");

    QueueDao::push(queue, &id, 0);
    assert!(QueueDao::exists(queue, &id));

    let popped = QueueDao::pop(queue, 1, 200).expect("pop failed");
    assert_eq!(popped, vec![id.clone()]);
    // dequeued for work: no longer a queue member
    assert!(!QueueDao::exists(queue, &id));
    assert_eq!(QueueDao::get_size(queue), 0);
    // an unacked id blocks a re-insert
    assert!(!QueueDao::push_if_not_exists(queue, &id, 0));

    assert!(QueueDao::ack(queue, &id));
    assert!(!QueueDao::ack(queue, &id));
}

#[test]
fn delayed_items_become_visible_later() {
    init_logger();
    let queue = "tq_delayed_queue";
    let id = InlineStr::from("tq_delayed_id");

    QueueDao::push(queue, &id, 1);
    // not yet visible
    let popped = QueueDao::pop(queue, 1, 100).expect("pop failed");
    assert!(popped.is_empty());
    // the delay is still queue membership
    assert!(QueueDao::exists(queue, &id));

    let popped = QueueDao::pop(queue, 1, 1_500).expect("pop failed");
    assert_eq!(popped, vec![id]);
}

#[test]
fn postpone_hides_the_entry_for_the_duration() {
    init_logger();
    let queue = "tq_postpone_queue";
    let id = InlineStr::from("tq_postpone_id");

    QueueDao::push(queue, &id, 0);
    QueueDao::postpone(queue, &id, 5).expect("postpone failed");

    let popped = QueueDao::pop(queue, 1, 100).expect("pop failed");
    assert!(popped.is_empty());
    assert!(QueueDao::exists(queue, &id));
}

#[test]
fn remove_deletes_from_both_areas() {
    init_logger();
    let queue = "tq_remove_queue";
    let visible = InlineStr::from("tq_remove_visible");
    let unacked = InlineStr::from("tq_remove_unacked");

    QueueDao::push(queue, &visible, 0);
    QueueDao::push(queue, &unacked, 0);
    let popped = QueueDao::pop(queue, 1, 200).expect("pop failed");
    assert_eq!(popped.len(), 1);

    QueueDao::remove(queue, &visible).expect("remove failed");
    QueueDao::remove(queue, &unacked).expect("remove failed");
    assert_eq!(QueueDao::get_size(queue), 0);
    assert!(!QueueDao::ack(queue, &unacked));
    assert!(!QueueDao::ack(queue, &visible));
}

#[test]
fn queues_detail_reports_visible_sizes() {
    init_logger();
    let queue = "tq_detail_queue";
    QueueDao::push(queue, &InlineStr::from("tq_detail_1"), 0);
    QueueDao::push(queue, &InlineStr::from("tq_detail_2"), 0);

    let detail = QueueDao::queues_detail();
    assert_eq!(detail.get(&InlineStr::from(queue)), Some(&2));
}
