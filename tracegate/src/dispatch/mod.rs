//! # Notification Dispatch
//!
//! The patchable indirection between the public call surface and the
//! collector. One immutable [`Bindings`] table holds a function-pointer slot
//! per notification kind; it is published exactly once via an
//! [`ArcSwapOption`] release store and read with acquire loads, so no caller
//! ever observes a half-written target.
//!
//! ## Call Paths
//!
//! - **Stub path** (table not yet published): drive the [`InitGate`], which
//!   runs the loader once across all racing threads, then re-load the table
//!   and forward.
//! - **Direct path** (steady state): one atomic load plus one `Option`
//!   branch per call. A process with no collector pays exactly that and
//!   nothing more.
//!
//! The table transitions `None → Some` once and is never invalidated; both
//! paths are correct during the race window.

pub(crate) mod gate;
pub(crate) mod loader;

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use gate::{GateOutcome, InitGate};
use tracegate_common::{
    ControlFn, CounterCreateFn, CounterRecord, CounterSetFn, DomainCreateFn, EventCreateFn,
    EventMarkFn, FrameMarkFn, FrameSubmitFn, MetadataAddFn, MetadataRecord, MetadataStrAddFn,
    RawStr, StringHandleCreateFn, TaskBeginFn, TaskEndFn, TaskRecord, ThreadSetNameFn,
};

/// One slot per notification kind. `None` is a permanent per-capability
/// no-op: either no collector is attached or it does not export the symbol.
pub(crate) struct Bindings {
    pub domain_create: Option<DomainCreateFn>,
    pub string_handle_create: Option<StringHandleCreateFn>,
    pub counter_create: Option<CounterCreateFn>,
    pub counter_set: Option<CounterSetFn>,
    pub event_create: Option<EventCreateFn>,
    pub event_start: Option<EventMarkFn>,
    pub event_end: Option<EventMarkFn>,
    pub task_begin: Option<TaskBeginFn>,
    pub task_end: Option<TaskEndFn>,
    pub frame_begin: Option<FrameMarkFn>,
    pub frame_end: Option<FrameMarkFn>,
    pub frame_submit: Option<FrameSubmitFn>,
    pub metadata_add: Option<MetadataAddFn>,
    pub metadata_str_add: Option<MetadataStrAddFn>,
    pub thread_set_name: Option<ThreadSetNameFn>,
    pub pause: Option<ControlFn>,
    pub resume: Option<ControlFn>,
    pub detach: Option<ControlFn>,
}

impl Bindings {
    /// The all-no-op table used when no collector is attached.
    pub(crate) fn disabled() -> Self {
        Self {
            domain_create: None,
            string_handle_create: None,
            counter_create: None,
            counter_set: None,
            event_create: None,
            event_start: None,
            event_end: None,
            task_begin: None,
            task_end: None,
            frame_begin: None,
            frame_end: None,
            frame_submit: None,
            metadata_add: None,
            metadata_str_add: None,
            thread_set_name: None,
            pause: None,
            resume: None,
            detach: None,
        }
    }
}

static TABLE: ArcSwapOption<Bindings> = ArcSwapOption::const_empty();
static GATE: InitGate = InitGate::new();

/// Fetch the binding table, initializing on first use.
///
/// Returns `None` only before the one-time load has finished: during the
/// race window for threads that must not block the loading thread
/// (re-entrant calls), or forever if the loader panicked. Dropping those
/// few notifications is the documented degradation mode.
fn bindings() -> Option<Arc<Bindings>> {
    if let Some(table) = TABLE.load_full() {
        return Some(table);
    }

    match GATE.ensure(|| {
        TABLE.store(Some(Arc::new(loader::load_from_env())));
    }) {
        GateOutcome::Ready => TABLE.load_full(),
        GateOutcome::Reentrant | GateOutcome::Failed => None,
    }
}

/// Force initialization without emitting anything. Used by control calls so
/// pause/resume observed before the first emitting call still reach an
/// attached collector.
pub(crate) fn ensure_initialized() {
    let _ = bindings();
}

macro_rules! forward {
    ($slot:ident $(, $arg:expr)*) => {
        if let Some(table) = bindings() {
            if let Some(f) = table.$slot {
                // Safety: pointer was resolved against the versioned ABI
                // contract and stays valid because the library is never
                // unloaded. Argument lifetimes outlive this call.
                #[allow(unsafe_code)]
                unsafe {
                    f($($arg),*);
                }
            }
        }
    };
}

pub(crate) fn domain_create(name: &str, seq: u64) {
    forward!(domain_create, RawStr::from_str(name), seq);
}

pub(crate) fn string_handle_create(name: &str, seq: u64) {
    forward!(string_handle_create, RawStr::from_str(name), seq);
}

pub(crate) fn counter_create(name: &str, domain: &str, kind: u32, seq: u64) {
    forward!(
        counter_create,
        RawStr::from_str(name),
        RawStr::from_str(domain),
        kind,
        seq
    );
}

pub(crate) fn counter_set(record: CounterRecord) {
    forward!(counter_set, record);
}

pub(crate) fn event_create(name: &str, seq: u64) {
    forward!(event_create, RawStr::from_str(name), seq);
}

pub(crate) fn event_start(seq: u64, timestamp_ns: u64, tid: u32) {
    forward!(event_start, seq, timestamp_ns, tid);
}

pub(crate) fn event_end(seq: u64, timestamp_ns: u64, tid: u32) {
    forward!(event_end, seq, timestamp_ns, tid);
}

pub(crate) fn task_begin(record: TaskRecord) {
    forward!(task_begin, record);
}

pub(crate) fn task_end(domain_seq: u64, timestamp_ns: u64, tid: u32) {
    forward!(task_end, domain_seq, timestamp_ns, tid);
}

pub(crate) fn frame_begin(domain_seq: u64, frame_id: u64, timestamp_ns: u64) {
    forward!(frame_begin, domain_seq, frame_id, timestamp_ns);
}

pub(crate) fn frame_end(domain_seq: u64, frame_id: u64, timestamp_ns: u64) {
    forward!(frame_end, domain_seq, frame_id, timestamp_ns);
}

pub(crate) fn frame_submit(domain_seq: u64, frame_id: u64, begin_ns: u64, end_ns: u64) {
    forward!(frame_submit, domain_seq, frame_id, begin_ns, end_ns);
}

pub(crate) fn metadata_add(record: MetadataRecord) {
    forward!(metadata_add, record);
}

pub(crate) fn metadata_str_add(domain_seq: u64, id: u64, key: &str, value: &str) {
    forward!(
        metadata_str_add,
        domain_seq,
        id,
        RawStr::from_str(key),
        RawStr::from_str(value)
    );
}

pub(crate) fn thread_set_name(name: &str, tid: u32) {
    forward!(thread_set_name, RawStr::from_str(name), tid);
}

pub(crate) fn pause() {
    forward!(pause);
}

pub(crate) fn resume() {
    forward!(resume);
}

pub(crate) fn detach() {
    forward!(detach);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global table is process-wide; these tests only assert behavior
    // that is stable regardless of which test initialized it first (the
    // suite never sets the collector path variable).

    #[test]
    fn uninitialized_process_settles_into_noop_mode() {
        ensure_initialized();
        let table = bindings().expect("table must be published after init");
        assert!(table.task_begin.is_none());
        assert!(table.pause.is_none());
    }

    #[test]
    fn forwarding_without_collector_is_silent() {
        task_end(1, 0, 1);
        pause();
        resume();
        thread_set_name("worker", 7);
    }
}
