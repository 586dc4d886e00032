//! A small instrumented work pipeline.
//!
//! Run without a collector to see the no-op fast path, or point
//! `TRACEGATE_COLLECTOR` at a built collector library to record a trace:
//!
//! ```sh
//! cargo build -p tracegate-collector
//! TRACEGATE_COLLECTOR=target/debug/libtracegate_collector.so \
//!     TRACEGATE_TRACE_FILE=/tmp/pipeline.jsonl \
//!     cargo run --example instrumented_pipeline
//! ```

use std::thread;
use std::time::Duration;

use tracegate::{Counter, Domain, Event, Id, StringHandle, ValueKind};

fn main() {
    env_logger::init();

    let domain = Domain::create("pipeline");
    let stage_load = StringHandle::create("load");
    let stage_transform = StringHandle::create("transform");
    let stage_store = StringHandle::create("store");
    let queue_depth = Counter::create_typed("queue_depth", "pipeline", ValueKind::U64);
    let checkpoint = Event::create("checkpoint");

    tracegate::set_thread_name("pipeline-main");

    for batch in 0..5_u64 {
        domain.frame_begin(Some(Id(batch + 1)));

        domain.task_begin(stage_load);
        thread::sleep(Duration::from_millis(2));
        queue_depth.set_value(10 - batch);
        domain.task_end();

        domain.task_begin(stage_transform);
        domain.task_begin_with_id(Id(100 + batch), Id::NONE, stage_store);
        thread::sleep(Duration::from_millis(1));
        domain.task_end();
        domain.task_end();

        if batch == 2 {
            checkpoint.start();
            thread::sleep(Duration::from_millis(1));
            checkpoint.end();
        }

        domain.frame_end(Some(Id(batch + 1)));
    }

    println!("processed 5 batches under domain {domain}");
}
