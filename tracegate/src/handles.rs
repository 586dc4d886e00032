//! # Handle Types
//!
//! The four interned handle kinds: [`Domain`], [`StringHandle`], [`Counter`]
//! and [`Event`]. A handle is a `Copy` token wrapping a reference into the
//! process-lifetime registry for its kind; creating the same name twice
//! returns the identical handle, and an empty name returns the *null handle*
//! (`is_valid() == false`) without touching the registry.
//!
//! Creation notifications fire once per unique name and are intentionally
//! not gated by pause/resume: they define identities, not records, and a
//! collector must learn every name even if it was interned while paused.
//! Only detach silences them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::control;
use crate::dispatch;
use crate::model::Timestamp;
use crate::registry::Interner;
use tracegate_common::ValueKind;

// ============================================================================
// Registry storage
// ============================================================================

static DOMAINS: OnceLock<Interner<DomainData>> = OnceLock::new();
static STRINGS: OnceLock<Interner<StringHandleData>> = OnceLock::new();
static COUNTERS: OnceLock<Interner<CounterData>> = OnceLock::new();
static EVENTS: OnceLock<Interner<EventData>> = OnceLock::new();

pub(crate) fn domains() -> &'static Interner<DomainData> {
    DOMAINS.get_or_init(Interner::default)
}

pub(crate) fn strings() -> &'static Interner<StringHandleData> {
    STRINGS.get_or_init(Interner::default)
}

pub(crate) fn counters() -> &'static Interner<CounterData> {
    COUNTERS.get_or_init(Interner::default)
}

pub(crate) fn events() -> &'static Interner<EventData> {
    EVENTS.get_or_init(Interner::default)
}

/// Counters are keyed by (name, domain); the composite registry key joins
/// them with a unit separator, which cannot appear in either part by
/// convention and keeps "a" + "b/c" distinct from "a/b" + "c".
fn counter_key(name: &str, domain: &str) -> String {
    format!("{domain}\u{1f}{name}")
}

// ============================================================================
// Registry entries
// ============================================================================

/// One open frame on a domain's frame stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameEntry {
    pub id: u64,
    pub begin: Timestamp,
}

#[derive(Debug)]
pub struct DomainData {
    name: &'static str,
    seq: u64,
    enabled: AtomicBool,
    /// Frames are domain-scoped, not thread-scoped: a frame may end on a
    /// different thread than it began, so the stack lives here.
    pub(crate) frames: Mutex<Vec<FrameEntry>>,
}

impl DomainData {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct StringHandleData {
    name: &'static str,
    seq: u64,
}

impl StringHandleData {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug)]
pub struct CounterData {
    name: String,
    domain: String,
    seq: u64,
    kind: ValueKind,
}

impl CounterData {
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
pub struct EventData {
    name: &'static str,
    seq: u64,
}

impl EventData {
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

// ============================================================================
// Domain
// ============================================================================

/// A named grouping of instrumented activity, the namespace for tasks,
/// frames and metadata.
#[derive(Debug, Clone, Copy)]
pub struct Domain(pub(crate) Option<&'static DomainData>);

impl Domain {
    /// Intern a domain. Idempotent: the same name always yields the same
    /// handle. An empty name yields the null handle.
    #[must_use]
    pub fn create(name: &str) -> Self {
        if name.is_empty() {
            return Self(None);
        }
        let (data, created) = domains().intern(name, |seq, name| DomainData {
            name,
            seq,
            enabled: AtomicBool::new(true),
            frames: Mutex::new(Vec::new()),
        });
        if created && !control::is_detached() {
            dispatch::domain_create(data.name, data.seq);
        }
        Self(Some(data))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.0.map(DomainData::name)
    }

    /// Sequence number, 0 for the null handle.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.0.map_or(0, DomainData::seq)
    }

    /// Per-domain collection filter. Disabled domains keep interning and
    /// keep their stacks balanced; they just stop emitting.
    pub fn set_enabled(&self, enabled: bool) {
        if let Some(data) = self.0 {
            data.enabled.store(enabled, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.0.is_some_and(DomainData::is_enabled)
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Domain {}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(data) => write!(f, "Domain({})", data.name),
            None => write!(f, "Domain(<null>)"),
        }
    }
}

// ============================================================================
// StringHandle
// ============================================================================

/// An interned, reusable identifier for a human-readable label (task names,
/// metadata keys).
#[derive(Debug, Clone, Copy)]
pub struct StringHandle(pub(crate) Option<&'static StringHandleData>);

impl StringHandle {
    /// Intern a label. Idempotent; empty names yield the null handle.
    #[must_use]
    pub fn create(name: &str) -> Self {
        if name.is_empty() {
            return Self(None);
        }
        let (data, created) = strings().intern(name, |seq, name| StringHandleData { name, seq });
        if created && !control::is_detached() {
            dispatch::string_handle_create(data.name, data.seq);
        }
        Self(Some(data))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.0.map(|data| data.name)
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.0.map_or(0, |data| data.seq)
    }
}

impl PartialEq for StringHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for StringHandle {}

impl fmt::Display for StringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(data) => write!(f, "StringHandle({})", data.name),
            None => write!(f, "StringHandle(<null>)"),
        }
    }
}

// ============================================================================
// Counter
// ============================================================================

/// A named sampled value within a domain namespace.
#[derive(Debug, Clone, Copy)]
pub struct Counter(pub(crate) Option<&'static CounterData>);

impl Counter {
    /// Intern an unsigned counter. Equivalent to
    /// [`Counter::create_typed`] with [`ValueKind::U64`].
    #[must_use]
    pub fn create(name: &str, domain: &str) -> Self {
        Self::create_typed(name, domain, ValueKind::U64)
    }

    /// Intern a typed counter, keyed by (name, domain).
    ///
    /// An empty name *or* domain yields the null handle. A duplicate create
    /// returns the existing handle, keeping its original kind.
    #[must_use]
    pub fn create_typed(name: &str, domain: &str, kind: ValueKind) -> Self {
        if name.is_empty() || domain.is_empty() {
            return Self(None);
        }
        let key = counter_key(name, domain);
        let (data, created) = counters().intern(&key, |seq, _| CounterData {
            name: name.to_owned(),
            domain: domain.to_owned(),
            seq,
            kind,
        });
        if created && !control::is_detached() {
            dispatch::counter_create(&data.name, &data.domain, data.kind as u32, data.seq);
        }
        Self(Some(data))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.map(|data| data.name.as_str())
    }

    #[must_use]
    pub fn domain_name(&self) -> Option<&str> {
        self.0.map(|data| data.domain.as_str())
    }

    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        self.0.map(|data| data.kind)
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.0.map_or(0, |data| data.seq)
    }
}

impl PartialEq for Counter {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Counter {}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(data) => write!(f, "Counter({}/{})", data.domain, data.name),
            None => write!(f, "Counter(<null>)"),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// A named marker with optional start/end spans, not tied to a domain.
#[derive(Debug, Clone, Copy)]
pub struct Event(pub(crate) Option<&'static EventData>);

impl Event {
    /// Intern an event. Idempotent; empty names yield the null handle.
    #[must_use]
    pub fn create(name: &str) -> Self {
        if name.is_empty() {
            return Self(None);
        }
        let (data, created) = events().intern(name, |seq, name| EventData { name, seq });
        if created && !control::is_detached() {
            dispatch::event_create(data.name, data.seq);
        }
        Self(Some(data))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.0.map(|data| data.name)
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.0.map_or(0, |data| data.seq)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Event {}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(data) => write!(f, "Event({})", data.name),
            None => write!(f, "Event(<null>)"),
        }
    }
}
