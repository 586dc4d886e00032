//! # Collection Control
//!
//! Process-wide pause/resume gate and the terminal detach switch. The gate
//! is a reference-counted suspend depth: `pause` increments, `resume`
//! decrements with a floor of zero, so unrelated pause regions compose and
//! extra resumes are harmless.
//!
//! Emitting calls check [`is_collection_active`] (one atomic load each)
//! *after* interning and bookkeeping: while suspended, handles keep being
//! created and stacks stay balanced, only emission is gated.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::dispatch;
use crate::handles::DomainData;

static SUSPEND_DEPTH: AtomicUsize = AtomicUsize::new(0);
static DETACHED: AtomicBool = AtomicBool::new(false);

/// Unit tests that touch the process-wide suspend depth serialize on this.
#[cfg(test)]
pub(crate) static TEST_GATE_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

/// Suspend collection. Nestable; every `pause` needs one `resume`.
///
/// Forwarded to the collector (it may flush buffers on it) even when the
/// gate was already closed.
pub fn pause() {
    SUSPEND_DEPTH.fetch_add(1, Ordering::SeqCst);
    if !is_detached() {
        dispatch::pause();
    }
}

/// Undo one `pause`. Resuming more often than pausing is a no-op: the depth
/// is clamped at zero.
pub fn resume() {
    let _ = SUSPEND_DEPTH.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
        depth.checked_sub(1)
    });
    if !is_detached() {
        dispatch::resume();
    }
}

/// Permanently stop forwarding notifications to the collector.
///
/// The collector is told exactly once; afterwards every call, including
/// pause/resume themselves, stops at the gate. There is no re-attach.
pub fn detach() {
    // Make sure a collector attached-but-never-notified still hears the
    // detach it may want to flush on.
    dispatch::ensure_initialized();
    if !DETACHED.swap(true, Ordering::SeqCst) {
        dispatch::detach();
    }
}

/// One atomic load each; the whole cost of a paused call site.
#[must_use]
pub fn is_collection_active() -> bool {
    !DETACHED.load(Ordering::SeqCst) && SUSPEND_DEPTH.load(Ordering::SeqCst) == 0
}

pub(crate) fn is_detached() -> bool {
    DETACHED.load(Ordering::SeqCst)
}

/// Gate for domain-scoped emissions: global state plus the domain's own
/// enable flag.
pub(crate) fn should_emit(domain: &DomainData) -> bool {
    is_collection_active() && domain.is_enabled()
}
