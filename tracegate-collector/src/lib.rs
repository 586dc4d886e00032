//! # Reference Collector
//!
//! A minimal collector for the `tracegate` instrumentation core, built as a
//! `cdylib`. Point `TRACEGATE_COLLECTOR` at the built library and every
//! notification becomes one JSON record, appended to the file named by
//! `TRACEGATE_TRACE_FILE` (stderr when unset).
//!
//! This exists to exercise the ABI from the collector side and to give the
//! loading path a real counterpart; it makes no attempt at being a clever
//! trace store. Records are line-delimited JSON in arrival order, flushed on
//! `pause` and `detach`.
//!
//! ## Threading
//!
//! Notifications arrive concurrently from any thread of the instrumented
//! process; all state sits behind one mutex. Names are copied out of the
//! borrowed [`RawStr`] arguments at create time so later records can be
//! resolved without keeping foreign pointers around.

#![allow(unsafe_code)]

use log::{debug, warn};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{json, Value};

use tracegate_common::{
    CounterRecord, MetadataRecord, RawStr, TaskRecord, ValueKind, ABI_VERSION, COUNTER_OP_DEC,
    COUNTER_OP_INC, COUNTER_OP_SET,
};

mod record;
mod sink;

use record::TraceRecord;
use sink::Sink;

struct State {
    sink: Sink,
    /// seq → name, filled at create notifications so sample records can be
    /// written with human-readable names.
    domains: FxHashMap<u64, String>,
    counters: FxHashMap<u64, String>,
    events: FxHashMap<u64, String>,
}

impl State {
    fn new(sink: Sink) -> Self {
        Self {
            sink,
            domains: FxHashMap::default(),
            counters: FxHashMap::default(),
            events: FxHashMap::default(),
        }
    }
}

static STATE: Mutex<Option<State>> = Mutex::new(None);

fn with_state(f: impl FnOnce(&mut State)) {
    if let Some(state) = STATE.lock().as_mut() {
        f(state);
    }
}

fn emit(state: &mut State, record: TraceRecord<'_>) {
    if let Err(err) = state.sink.write_record(&record) {
        // Complain once per process would be nicer; once per record is
        // acceptable for a reference implementation behind debug logging.
        debug!("tracegate-collector: dropped record: {err}");
    }
}

/// Decode a borrowed ABI string, falling back to a placeholder rather than
/// refusing the record.
unsafe fn name_of(raw: RawStr) -> String {
    raw.to_owned_string().unwrap_or_else(|| "<invalid>".to_owned())
}

// ============================================================================
// Mandatory handshake
// ============================================================================

/// Version handshake and sink setup. Called exactly once by the core,
/// before any other notification.
#[no_mangle]
pub unsafe extern "C" fn tgc_init(abi_version: u32) -> u32 {
    let _ = env_logger::try_init();
    if abi_version != ABI_VERSION {
        warn!(
            "tracegate-collector: process speaks ABI v{abi_version}, this collector v{ABI_VERSION}"
        );
        // Echo our own version; the core aborts the attach on mismatch.
        return ABI_VERSION;
    }

    let sink = match sink::from_env() {
        Ok(sink) => sink,
        Err(err) => {
            warn!("tracegate-collector: falling back to stderr: {err}");
            Sink::stderr()
        }
    };
    *STATE.lock() = Some(State::new(sink));
    ABI_VERSION
}

// ============================================================================
// Creation notifications
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn tgc_domain_create(name: RawStr, seq: u64) {
    let name = name_of(name);
    with_state(|state| {
        emit(state, TraceRecord::new("domain_create", 0).name(&name).seq(seq));
        state.domains.insert(seq, name.clone());
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_string_handle_create(name: RawStr, seq: u64) {
    let name = name_of(name);
    with_state(|state| {
        emit(
            state,
            TraceRecord::new("string_handle_create", 0).name(&name).seq(seq),
        );
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_counter_create(name: RawStr, domain: RawStr, kind: u32, seq: u64) {
    let name = name_of(name);
    let domain = name_of(domain);
    with_state(|state| {
        emit(
            state,
            TraceRecord::new("counter_create", 0)
                .name(&name)
                .domain(&domain)
                .seq(seq)
                .value(json!(kind)),
        );
        state.counters.insert(seq, name.clone());
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_event_create(name: RawStr, seq: u64) {
    let name = name_of(name);
    with_state(|state| {
        emit(state, TraceRecord::new("event_create", 0).name(&name).seq(seq));
        state.events.insert(seq, name.clone());
    });
}

// ============================================================================
// Tasks and frames
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn tgc_task_begin(record: TaskRecord) {
    let name = name_of(record.name);
    with_state(|state| {
        let domain = state.domains.get(&record.domain_seq).cloned();
        let mut out = TraceRecord::new("task_begin", record.timestamp_ns)
            .name(&name)
            .seq(record.domain_seq)
            .tid(record.tid)
            .depth(record.depth);
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        if record.id != 0 {
            out = out.id(record.id);
        }
        if record.parent_id != 0 {
            out = out.parent(record.parent_id);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_task_end(domain_seq: u64, timestamp_ns: u64, tid: u32) {
    with_state(|state| {
        let domain = state.domains.get(&domain_seq).cloned();
        let mut out = TraceRecord::new("task_end", timestamp_ns)
            .seq(domain_seq)
            .tid(tid);
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_frame_begin(domain_seq: u64, frame_id: u64, timestamp_ns: u64) {
    frame_mark("frame_begin", domain_seq, frame_id, timestamp_ns);
}

#[no_mangle]
pub unsafe extern "C" fn tgc_frame_end(domain_seq: u64, frame_id: u64, timestamp_ns: u64) {
    frame_mark("frame_end", domain_seq, frame_id, timestamp_ns);
}

fn frame_mark(ev: &'static str, domain_seq: u64, frame_id: u64, timestamp_ns: u64) {
    with_state(|state| {
        let domain = state.domains.get(&domain_seq).cloned();
        let mut out = TraceRecord::new(ev, timestamp_ns).seq(domain_seq);
        if frame_id != 0 {
            out = out.id(frame_id);
        }
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_frame_submit(
    domain_seq: u64,
    frame_id: u64,
    begin_ns: u64,
    end_ns: u64,
) {
    with_state(|state| {
        let domain = state.domains.get(&domain_seq).cloned();
        let mut out = TraceRecord::new("frame_submit", begin_ns)
            .seq(domain_seq)
            .value(json!({ "end": end_ns }));
        if frame_id != 0 {
            out = out.id(frame_id);
        }
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        emit(state, out);
    });
}

// ============================================================================
// Counters and events
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn tgc_counter_set(record: CounterRecord) {
    let value = match ValueKind::from_raw(record.kind) {
        Some(ValueKind::I64) => json!(record.value_bits as i64),
        Some(ValueKind::F64) => json!(f64::from_bits(record.value_bits)),
        _ => json!(record.value_bits),
    };
    let op = match record.op {
        COUNTER_OP_SET => "set",
        COUNTER_OP_INC => "inc",
        COUNTER_OP_DEC => "dec",
        _ => "unknown",
    };
    with_state(|state| {
        let name = state.counters.get(&record.seq).cloned();
        let mut out = TraceRecord::new("counter_set", record.timestamp_ns)
            .seq(record.seq)
            .value(json!({ "op": op, "value": value }));
        if let Some(name) = name.as_deref() {
            out = out.name(name);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_event_start(seq: u64, timestamp_ns: u64, tid: u32) {
    event_mark("event_start", seq, timestamp_ns, tid);
}

#[no_mangle]
pub unsafe extern "C" fn tgc_event_end(seq: u64, timestamp_ns: u64, tid: u32) {
    event_mark("event_end", seq, timestamp_ns, tid);
}

fn event_mark(ev: &'static str, seq: u64, timestamp_ns: u64, tid: u32) {
    with_state(|state| {
        let name = state.events.get(&seq).cloned();
        let mut out = TraceRecord::new(ev, timestamp_ns).seq(seq).tid(tid);
        if let Some(name) = name.as_deref() {
            out = out.name(name);
        }
        emit(state, out);
    });
}

// ============================================================================
// Metadata and thread naming
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn tgc_metadata_add(record: MetadataRecord) {
    let key = name_of(record.key);
    let count = usize::try_from(record.count).unwrap_or(0);
    let value = match ValueKind::from_raw(record.kind) {
        Some(ValueKind::U64) => {
            let values = std::slice::from_raw_parts(record.data.cast::<u64>(), count);
            json!(values)
        }
        Some(ValueKind::I64) => {
            let values = std::slice::from_raw_parts(record.data.cast::<i64>(), count);
            json!(values)
        }
        Some(ValueKind::F64) => {
            let values = std::slice::from_raw_parts(record.data.cast::<f64>(), count);
            json!(values)
        }
        _ => Value::Null,
    };
    with_state(|state| {
        let domain = state.domains.get(&record.domain_seq).cloned();
        let mut out = TraceRecord::new("metadata_add", 0)
            .name(&key)
            .seq(record.domain_seq)
            .value(value);
        if record.id != 0 {
            out = out.id(record.id);
        }
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_metadata_str_add(
    domain_seq: u64,
    id: u64,
    key: RawStr,
    value: RawStr,
) {
    let key = name_of(key);
    let value = name_of(value);
    with_state(|state| {
        let domain = state.domains.get(&domain_seq).cloned();
        let mut out = TraceRecord::new("metadata_str_add", 0)
            .name(&key)
            .seq(domain_seq)
            .value(json!(value));
        if id != 0 {
            out = out.id(id);
        }
        if let Some(domain) = domain.as_deref() {
            out = out.domain(domain);
        }
        emit(state, out);
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_thread_set_name(name: RawStr, tid: u32) {
    let name = name_of(name);
    with_state(|state| {
        emit(state, TraceRecord::new("thread_set_name", 0).name(&name).tid(tid));
    });
}

// ============================================================================
// Collection control
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn tgc_pause() {
    with_state(|state| {
        emit(state, TraceRecord::new("pause", 0));
        state.sink.flush();
    });
}

#[no_mangle]
pub unsafe extern "C" fn tgc_resume() {
    with_state(|state| emit(state, TraceRecord::new("resume", 0)));
}

#[no_mangle]
pub unsafe extern "C" fn tgc_detach() {
    with_state(|state| {
        emit(state, TraceRecord::new("detach", 0));
        state.sink.flush();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    // All exported functions share the process-wide STATE; serialize and
    // reinstall a capture sink per test.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn install_capture() -> sink::Capture {
        let (sink, capture) = Sink::capture();
        *STATE.lock() = Some(State::new(sink));
        capture
    }

    fn lines(capture: &sink::Capture) -> Vec<Value> {
        capture
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).expect("record lines are valid JSON"))
            .collect()
    }

    #[test]
    fn create_and_sample_records_resolve_names() {
        let _guard = TEST_LOCK.lock();
        let capture = install_capture();

        unsafe {
            tgc_domain_create(RawStr::from_str("render"), 1);
            tgc_counter_create(
                RawStr::from_str("fps"),
                RawStr::from_str("render"),
                ValueKind::F64 as u32,
                1,
            );
            tgc_counter_set(CounterRecord {
                seq: 1,
                kind: ValueKind::F64 as u32,
                op: COUNTER_OP_SET,
                value_bits: 59.5_f64.to_bits(),
                timestamp_ns: 1000,
            });
        }

        let records = lines(&capture);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["ev"], "domain_create");
        assert_eq!(records[0]["name"], "render");
        assert_eq!(records[2]["ev"], "counter_set");
        assert_eq!(records[2]["name"], "fps", "sample resolved via create");
        assert_eq!(records[2]["value"]["value"], 59.5);
        assert_eq!(records[2]["value"]["op"], "set");
    }

    #[test]
    fn task_records_carry_nesting_info() {
        let _guard = TEST_LOCK.lock();
        let capture = install_capture();

        unsafe {
            tgc_domain_create(RawStr::from_str("net"), 7);
            tgc_task_begin(TaskRecord {
                domain_seq: 7,
                id: 3,
                parent_id: 0,
                name: RawStr::from_str("parse"),
                timestamp_ns: 500,
                tid: 42,
                depth: 2,
            });
            tgc_task_end(7, 900, 42);
        }

        let records = lines(&capture);
        assert_eq!(records[1]["ev"], "task_begin");
        assert_eq!(records[1]["domain"], "net");
        assert_eq!(records[1]["depth"], 2);
        assert_eq!(records[1]["id"], 3);
        assert!(records[1].get("parent").is_none(), "zero parent omitted");
        assert_eq!(records[2]["ev"], "task_end");
        assert_eq!(records[2]["ts"], 900);
    }

    #[test]
    fn metadata_payloads_decode_by_kind() {
        let _guard = TEST_LOCK.lock();
        let capture = install_capture();

        let values = [10_u64, 20, 30];
        unsafe {
            tgc_metadata_add(MetadataRecord {
                domain_seq: 1,
                id: 0,
                key: RawStr::from_str("counts"),
                kind: ValueKind::U64 as u32,
                count: values.len() as u64,
                data: values.as_ptr().cast(),
            });
        }

        let records = lines(&capture);
        assert_eq!(records[0]["ev"], "metadata_add");
        assert_eq!(records[0]["value"], json!([10, 20, 30]));
    }

    #[test]
    fn init_rejects_nothing_but_reports_version() {
        let _guard = TEST_LOCK.lock();
        let echoed = unsafe { tgc_init(ABI_VERSION) };
        assert_eq!(echoed, ABI_VERSION);
        let echoed = unsafe { tgc_init(ABI_VERSION + 1) };
        assert_eq!(echoed, ABI_VERSION, "mismatch is reported, core decides");
    }

    #[test]
    fn notifications_before_init_are_dropped() {
        let _guard = TEST_LOCK.lock();
        *STATE.lock() = None;
        unsafe {
            tgc_pause();
            tgc_resume();
            tgc_event_start(1, 0, 1);
        }
    }
}
