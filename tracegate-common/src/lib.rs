//! # Collector ABI Contract (Instrumented Process ↔ Collector)
//!
//! Defines the data structures, symbol names and function signatures shared
//! between the `tracegate` instrumentation core and any collector library
//! loaded into the process at runtime. All types use `#[repr(C)]` so the
//! layout is identical on both sides of the dynamic-library boundary.
//!
//! ## Loading Protocol
//!
//! 1. The core reads [`COLLECTOR_PATH_ENV`] once, at first instrumentation
//!    call. An unset variable means "no collector" and is not an error.
//! 2. The core resolves [`symbols::INIT`] and calls it with [`ABI_VERSION`].
//!    The collector echoes the version it implements; a mismatch aborts the
//!    load and the process runs in no-op mode.
//! 3. Each remaining `tgc_*` symbol is resolved independently. A missing
//!    symbol disables that one notification kind only.
//!
//! ## Pointer Lifetimes
//!
//! [`RawStr`] and [`MetadataRecord::data`] reference memory owned by the
//! instrumented process and are valid **only for the duration of the call**.
//! A collector that wants to keep them must copy.
//!
//! ## Key Types
//!
//! - [`RawStr`] - borrowed UTF-8 string crossing the boundary (not NUL-terminated)
//! - [`TaskRecord`] - arguments of a task-begin notification
//! - [`CounterRecord`] - arguments of a counter sample
//! - [`MetadataRecord`] - arguments of a typed metadata attachment

#![no_std]

#[cfg(feature = "user")]
extern crate std;

use core::ffi::c_void;

// ============================================================================
// Versioning and Configuration
// ============================================================================

/// ABI version spoken by this crate.
///
/// Bumped whenever a record layout, signature or symbol name changes.
/// `tgc_init` must return exactly this value for the load to proceed.
pub const ABI_VERSION: u32 = 1;

/// Environment variable naming the collector shared library to load.
///
/// Read once per process. Unset or empty means no collector is attached and
/// every notification becomes a no-op.
pub const COLLECTOR_PATH_ENV: &str = "TRACEGATE_COLLECTOR";

// ============================================================================
// Exported Symbol Names
// ============================================================================

/// Names of the C-callable symbols a collector may export.
///
/// Only [`symbols::INIT`] is mandatory. Every other symbol degrades to a
/// per-capability no-op when absent.
pub mod symbols {
    /// `tgc_init(abi_version) -> supported_version`, the mandatory handshake.
    pub const INIT: &[u8] = b"tgc_init";

    pub const DOMAIN_CREATE: &[u8] = b"tgc_domain_create";
    pub const STRING_HANDLE_CREATE: &[u8] = b"tgc_string_handle_create";
    pub const COUNTER_CREATE: &[u8] = b"tgc_counter_create";
    pub const COUNTER_SET: &[u8] = b"tgc_counter_set";
    pub const EVENT_CREATE: &[u8] = b"tgc_event_create";
    pub const EVENT_START: &[u8] = b"tgc_event_start";
    pub const EVENT_END: &[u8] = b"tgc_event_end";
    pub const TASK_BEGIN: &[u8] = b"tgc_task_begin";
    pub const TASK_END: &[u8] = b"tgc_task_end";
    pub const FRAME_BEGIN: &[u8] = b"tgc_frame_begin";
    pub const FRAME_END: &[u8] = b"tgc_frame_end";
    pub const FRAME_SUBMIT: &[u8] = b"tgc_frame_submit";
    pub const METADATA_ADD: &[u8] = b"tgc_metadata_add";
    pub const METADATA_STR_ADD: &[u8] = b"tgc_metadata_str_add";
    pub const THREAD_SET_NAME: &[u8] = b"tgc_thread_set_name";
    pub const PAUSE: &[u8] = b"tgc_pause";
    pub const RESUME: &[u8] = b"tgc_resume";
    pub const DETACH: &[u8] = b"tgc_detach";
}

// ============================================================================
// Value Kinds and Counter Operations
// ============================================================================

/// Type tag for counter and metadata payloads.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    U64 = 0,
    I64 = 1,
    F64 = 2,
    Str = 3,
}

impl ValueKind {
    /// Decode a raw tag received over the ABI.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::U64),
            1 => Some(Self::I64),
            2 => Some(Self::F64),
            3 => Some(Self::Str),
            _ => None,
        }
    }
}

/// Counter sample operations (see [`CounterRecord::op`]).
///
/// The collector owns the accumulated value; `INC`/`DEC` carry deltas.
pub const COUNTER_OP_SET: u32 = 0;
pub const COUNTER_OP_INC: u32 = 1;
pub const COUNTER_OP_DEC: u32 = 2;

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Borrowed UTF-8 string crossing the ABI boundary.
///
/// Not NUL-terminated; `len` is the byte length. A null `ptr` encodes the
/// absence of a string (e.g. an anonymous frame).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl RawStr {
    /// The absent string.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// Borrow the string on the receiving side.
    ///
    /// Returns `None` for a null pointer or non-UTF-8 bytes.
    ///
    /// # Safety
    ///
    /// `ptr`/`len` must describe readable memory that outlives `'a`. Within
    /// a notification call the sender guarantees validity for the duration
    /// of that call only.
    #[must_use]
    pub unsafe fn as_str<'a>(&self) -> Option<&'a str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = core::slice::from_raw_parts(self.ptr, self.len);
        core::str::from_utf8(bytes).ok()
    }

    /// Copy the string out, for collectors that buffer records.
    ///
    /// # Safety
    ///
    /// Same requirements as [`RawStr::as_str`].
    #[cfg(feature = "user")]
    #[must_use]
    pub unsafe fn to_owned_string(&self) -> Option<std::string::String> {
        self.as_str().map(std::borrow::ToOwned::to_owned)
    }
}

/// Arguments of a task-begin notification.
///
/// `depth` is the nesting depth on the emitting thread *after* the push, so
/// the outermost task of a thread reports 1.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TaskRecord {
    /// Sequence number of the owning domain.
    pub domain_seq: u64,
    /// Caller-supplied task instance id, 0 when anonymous.
    pub id: u64,
    /// Caller-supplied parent id, 0 when none.
    pub parent_id: u64,
    /// Interned task name.
    pub name: RawStr,
    /// Monotonic nanoseconds at begin.
    pub timestamp_ns: u64,
    /// OS thread id of the emitting thread.
    pub tid: u32,
    /// Nesting depth on the emitting thread, including this task.
    pub depth: u32,
}

/// Arguments of a counter sample.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CounterRecord {
    /// Sequence number assigned at counter creation.
    pub seq: u64,
    /// [`ValueKind`] of `value_bits`, as `u32`.
    pub kind: u32,
    /// One of `COUNTER_OP_SET`, `COUNTER_OP_INC`, `COUNTER_OP_DEC`.
    pub op: u32,
    /// Value payload: `u64` as-is, `i64`/`f64` bit-cast.
    pub value_bits: u64,
    /// Monotonic nanoseconds at the sample.
    pub timestamp_ns: u64,
}

/// Arguments of a typed metadata attachment.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MetadataRecord {
    /// Sequence number of the owning domain.
    pub domain_seq: u64,
    /// Task/frame instance id the metadata refers to, 0 for the domain itself.
    pub id: u64,
    /// Interned key name.
    pub key: RawStr,
    /// [`ValueKind`] of the elements in `data`, as `u32`.
    pub kind: u32,
    /// Number of elements in `data`.
    pub count: u64,
    /// Pointer to `count` elements of the declared kind. Valid only for the
    /// duration of the call.
    pub data: *const c_void,
}

// ============================================================================
// Notification Signatures
// ============================================================================

/// Mandatory handshake: receives [`ABI_VERSION`], returns the version the
/// collector implements.
pub type InitFn = unsafe extern "C" fn(abi_version: u32) -> u32;

/// A domain was interned. Fired once per unique name.
pub type DomainCreateFn = unsafe extern "C" fn(name: RawStr, seq: u64);
/// A string handle was interned. Fired once per unique name.
pub type StringHandleCreateFn = unsafe extern "C" fn(name: RawStr, seq: u64);
/// A counter was interned. Fired once per unique (name, domain) pair.
pub type CounterCreateFn = unsafe extern "C" fn(name: RawStr, domain: RawStr, kind: u32, seq: u64);
pub type CounterSetFn = unsafe extern "C" fn(record: CounterRecord);
/// An event was interned. Fired once per unique name.
pub type EventCreateFn = unsafe extern "C" fn(name: RawStr, seq: u64);
/// Event start/end share a shape: which one fired is encoded by the symbol.
pub type EventMarkFn = unsafe extern "C" fn(seq: u64, timestamp_ns: u64, tid: u32);
pub type TaskBeginFn = unsafe extern "C" fn(record: TaskRecord);
pub type TaskEndFn = unsafe extern "C" fn(domain_seq: u64, timestamp_ns: u64, tid: u32);
/// Frame begin/end share a shape; `frame_id` is 0 for anonymous frames.
pub type FrameMarkFn = unsafe extern "C" fn(domain_seq: u64, frame_id: u64, timestamp_ns: u64);
pub type FrameSubmitFn =
    unsafe extern "C" fn(domain_seq: u64, frame_id: u64, begin_ns: u64, end_ns: u64);
pub type MetadataAddFn = unsafe extern "C" fn(record: MetadataRecord);
pub type MetadataStrAddFn =
    unsafe extern "C" fn(domain_seq: u64, id: u64, key: RawStr, value: RawStr);
pub type ThreadSetNameFn = unsafe extern "C" fn(name: RawStr, tid: u32);
/// pause/resume/detach take no arguments.
pub type ControlFn = unsafe extern "C" fn();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_str_round_trip() {
        let raw = RawStr::from_str("render.frame");
        assert!(!raw.is_empty());
        let back = unsafe { raw.as_str() };
        assert_eq!(back, Some("render.frame"));
    }

    #[test]
    fn raw_str_empty_is_none() {
        let raw = RawStr::empty();
        assert!(raw.is_empty());
        assert_eq!(unsafe { raw.as_str() }, None);
    }

    #[test]
    fn value_kind_raw_round_trip() {
        for kind in [ValueKind::U64, ValueKind::I64, ValueKind::F64, ValueKind::Str] {
            assert_eq!(ValueKind::from_raw(kind as u32), Some(kind));
        }
        assert_eq!(ValueKind::from_raw(42), None);
    }
}
