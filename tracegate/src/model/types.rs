//! Value types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep task instance ids, thread ids and timestamps
//! from being mixed up, and make the emitting signatures expressive.

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// Caller-supplied instance id for tasks and frames.
///
/// Ids establish identity across notifications (a task begun with an id can
/// later receive metadata addressed to it). [`Id::NONE`] marks an anonymous
/// instance and crosses the collector boundary as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub u64);

impl Id {
    /// The anonymous instance id.
    pub const NONE: Id = Id(0);

    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id:{}", self.0)
    }
}

/// OS thread id of an instrumented thread.
///
/// On Linux this is the kernel tid; elsewhere a process-local stand-in.
/// Distinct from any logical worker numbering the application may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tid(pub u32);

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Monotonic timestamp in nanoseconds.
///
/// Relative to a process-local origin fixed at the first instrumentation
/// call; collectors only ever order and subtract these, so the origin does
/// not matter. Never decreases within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

static ORIGIN: OnceLock<Instant> = OnceLock::new();

impl Timestamp {
    /// Capture the current monotonic time.
    #[must_use]
    pub fn now() -> Self {
        let origin = *ORIGIN.get_or_init(Instant::now);
        // u64 nanoseconds cover ~584 years of process uptime
        Self(origin.elapsed().as_nanos() as u64)
    }

    #[must_use]
    pub fn as_nanos(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Capture the current monotonic timestamp, for [`frame_submit`] callers
/// that measure a span themselves.
///
/// [`frame_submit`]: crate::Domain::frame_submit
#[must_use]
pub fn timestamp() -> Timestamp {
    Timestamp::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_monotonic() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        let c = Timestamp::now();
        assert!(a <= b);
        assert!(b <= c);
    }

    #[test]
    fn id_none_is_zero() {
        assert!(Id::NONE.is_none());
        assert!(!Id(7).is_none());
        assert_eq!(Id(7).to_string(), "Id:7");
    }

    #[test]
    fn tid_display() {
        assert_eq!(Tid(1234).to_string(), "TID:1234");
    }
}
