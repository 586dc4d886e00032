//! End-to-end walk of the public surface with no collector configured.
//!
//! This is the default production configuration: every notification must
//! succeed silently, handles must behave normally, and nothing may panic.
//! The test binary never sets `TRACEGATE_COLLECTOR`, so the one-time
//! initialization settles into no-op mode.

use tracegate::{
    timestamp, Counter, Domain, Event, Id, MetadataValue, StringHandle, ValueKind,
};

#[test]
fn full_api_walk_is_silent() {
    let domain = Domain::create("NoCollector.Walk");
    let task = StringHandle::create("WalkTask");
    let key = StringHandle::create("count");
    assert!(domain.is_valid());
    assert!(task.is_valid());

    domain.task_begin(task);
    domain.task_begin_with_id(Id(1), Id::NONE, task);
    domain.metadata_add(Id(1), key, MetadataValue::U64(&[42]));
    domain.metadata_str_add(Id(1), key, "forty-two");
    domain.task_end();
    domain.task_end();

    domain.frame_begin(None);
    domain.frame_end(None);
    let begin = timestamp();
    let end = timestamp();
    domain.frame_submit(Some(Id(9)), begin, end);

    let counter = Counter::create_typed("walk_counter", "NoCollector.Walk", ValueKind::U64);
    counter.set_value(7);
    counter.inc();
    counter.dec();

    let event = Event::create("WalkEvent");
    event.start();
    event.end();

    tracegate::set_thread_name("WalkThread");
}

#[test]
fn handles_keep_their_identity() {
    let a = Domain::create("NoCollector.Identity");
    let b = Domain::create("NoCollector.Identity");
    assert_eq!(a, b);

    let c1 = Counter::create("DupCounter", "DupDomain");
    let c2 = Counter::create("DupCounter", "DupDomain");
    assert_eq!(c1, c2);
    assert!(c1.is_valid());
}

#[test]
fn invalid_creation_input_yields_null_handles() {
    assert!(!Domain::create("").is_valid());
    assert!(!StringHandle::create("").is_valid());
    assert!(!Event::create("").is_valid());
    assert!(!Counter::create("Counter", "").is_valid());
    assert!(!Counter::create("", "Domain").is_valid());
}

#[test]
fn pause_resume_stays_balanced() {
    assert!(tracegate::is_collection_active());
    tracegate::pause();
    tracegate::pause();
    tracegate::resume();
    assert!(!tracegate::is_collection_active());
    tracegate::resume();
    assert!(tracegate::is_collection_active());
}

#[test]
fn rapid_begin_end_cycles() {
    let domain = Domain::create("NoCollector.Rapid");
    let name = StringHandle::create("RapidTask");
    for _ in 0..1000 {
        domain.task_begin(name);
        domain.task_end();
    }
}
