//! A configured-but-unloadable collector must cost one failed attempt and
//! then behave exactly like the no-collector configuration.
//!
//! Single test: the path variable has to be in place before the process's
//! first instrumentation call, and the failed load is terminal.

use tracegate::{Counter, Domain, StringHandle};

#[test]
fn unloadable_collector_degrades_to_noop_mode() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("no_such_collector.so");
    std::env::set_var("TRACEGATE_COLLECTOR", &missing);

    // First call drives the one-time load, which fails and is never retried.
    let domain = Domain::create("BadCollector.Domain");
    assert!(domain.is_valid());

    let name = StringHandle::create("BadCollectorTask");
    domain.task_begin(name);
    domain.task_end();

    let counter = Counter::create("bad_collector_counter", "BadCollector.Domain");
    assert!(counter.is_valid());
    counter.set_value(1);

    tracegate::pause();
    tracegate::resume();
    assert!(tracegate::is_collection_active());

    // Identity semantics are unaffected by the failed load.
    assert_eq!(domain, Domain::create("BadCollector.Domain"));
}
