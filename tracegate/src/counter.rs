//! # Counter Samples
//!
//! Sampling a counter sends the value (or a delta) to the collector, which
//! owns the accumulated state. Each record carries the kind of the supplied
//! value, so a caller mixing setter types degrades to odd numbers in the
//! trace instead of undefined behavior.

use crate::control;
use crate::dispatch;
use crate::handles::Counter;
use crate::model::Timestamp;
use tracegate_common::{
    CounterRecord, ValueKind, COUNTER_OP_DEC, COUNTER_OP_INC, COUNTER_OP_SET,
};

impl Counter {
    /// Set the counter to an absolute unsigned value.
    pub fn set_value(&self, value: u64) {
        self.emit(COUNTER_OP_SET, ValueKind::U64, value);
    }

    /// Set the counter to an absolute signed value.
    pub fn set_value_i64(&self, value: i64) {
        self.emit(COUNTER_OP_SET, ValueKind::I64, value as u64);
    }

    /// Set the counter to an absolute floating-point value.
    pub fn set_value_f64(&self, value: f64) {
        self.emit(COUNTER_OP_SET, ValueKind::F64, value.to_bits());
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.inc_delta(1);
    }

    /// Increment by `delta`.
    pub fn inc_delta(&self, delta: u64) {
        self.emit(COUNTER_OP_INC, ValueKind::U64, delta);
    }

    /// Decrement by one.
    pub fn dec(&self) {
        self.dec_delta(1);
    }

    /// Decrement by `delta`.
    pub fn dec_delta(&self, delta: u64) {
        self.emit(COUNTER_OP_DEC, ValueKind::U64, delta);
    }

    fn emit(&self, op: u32, kind: ValueKind, value_bits: u64) {
        let Some(counter) = self.0 else { return };
        if !control::is_collection_active() {
            return;
        }
        dispatch::counter_set(CounterRecord {
            seq: counter.seq(),
            kind: kind as u32,
            op,
            value_bits,
            timestamp_ns: Timestamp::now().as_nanos(),
        });
    }
}
