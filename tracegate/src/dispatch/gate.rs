//! # One-Shot Initialization Gate
//!
//! Race-free state machine that runs the collector load exactly once across
//! arbitrarily many concurrent first calls.
//!
//! ## States
//!
//! `NotStarted → InProgress → Done(Success) | Done(Failed)`
//!
//! A single compare-and-set picks the winning thread; losers sleep on a
//! condvar until the outcome is published. Failure is terminal; the load is
//! never retried, so a broken collector costs one attempt per process.
//!
//! ## Re-entrancy
//!
//! The winning thread's id is recorded while the closure runs. If the
//! collector itself calls back into the instrumentation API during its own
//! load, that call observes [`GateOutcome::Reentrant`] instead of
//! deadlocking, and the dispatcher drops the notification.

use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

const NOT_STARTED: u8 = 0;
const IN_PROGRESS: u8 = 1;
const DONE_OK: u8 = 2;
const DONE_FAILED: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateOutcome {
    /// Initialization has completed; the binding table is published.
    Ready,
    /// Initialization ran and failed (or panicked). Terminal.
    Failed,
    /// Called from inside the initialization closure on the same thread.
    Reentrant,
}

pub(crate) struct InitGate {
    state: AtomicU8,
    /// Tid of the thread currently running the closure, 0 otherwise.
    owner: AtomicU32,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl InitGate {
    pub(crate) const fn new() -> Self {
        Self {
            state: AtomicU8::new(NOT_STARTED),
            owner: AtomicU32::new(0),
            lock: Mutex::new(()),
            cvar: Condvar::new(),
        }
    }

    /// Run `init` exactly once, no matter how many threads arrive here.
    ///
    /// The winning thread runs it synchronously; concurrent callers block
    /// until the outcome is known; later callers return immediately. A panic
    /// inside `init` is caught and recorded as a terminal failure;
    /// instrumentation must never take the host process down.
    pub(crate) fn ensure<F: FnOnce()>(&self, init: F) -> GateOutcome {
        match self.state.load(Ordering::Acquire) {
            DONE_OK => return GateOutcome::Ready,
            DONE_FAILED => return GateOutcome::Failed,
            _ => {}
        }

        let tid = crate::context::current_tid();
        if self.owner.load(Ordering::Relaxed) == tid {
            return GateOutcome::Reentrant;
        }

        if self
            .state
            .compare_exchange(NOT_STARTED, IN_PROGRESS, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            self.owner.store(tid, Ordering::Relaxed);
            let result = panic::catch_unwind(AssertUnwindSafe(init));
            self.owner.store(0, Ordering::Relaxed);

            let done = if result.is_ok() { DONE_OK } else { DONE_FAILED };
            {
                let _guard = self.lock.lock();
                self.state.store(done, Ordering::Release);
            }
            self.cvar.notify_all();

            if result.is_ok() {
                GateOutcome::Ready
            } else {
                GateOutcome::Failed
            }
        } else {
            let mut guard = self.lock.lock();
            while self.state.load(Ordering::Acquire) == IN_PROGRESS {
                self.cvar.wait(&mut guard);
            }
            drop(guard);

            if self.state.load(Ordering::Acquire) == DONE_OK {
                GateOutcome::Ready
            } else {
                GateOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn init_runs_exactly_once_under_contention() {
        let gate: &'static InitGate = Box::leak(Box::new(InitGate::new()));
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(64));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let runs = Arc::clone(&runs);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let outcome = gate.ensure(|| {
                    runs.fetch_add(1, Ordering::SeqCst);
                });
                assert_eq!(outcome, GateOutcome::Ready);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn later_callers_skip_the_closure() {
        let gate = InitGate::new();
        assert_eq!(gate.ensure(|| {}), GateOutcome::Ready);
        assert_eq!(gate.ensure(|| panic!("must not run")), GateOutcome::Ready);
    }

    #[test]
    fn reentrant_call_does_not_deadlock() {
        let gate: &'static InitGate = Box::leak(Box::new(InitGate::new()));
        let outcome = gate.ensure(|| {
            // A collector calling back into the API during its own load
            // lands here, on the initializing thread.
            assert_eq!(gate.ensure(|| unreachable!()), GateOutcome::Reentrant);
        });
        assert_eq!(outcome, GateOutcome::Ready);
    }

    #[test]
    fn panic_in_init_is_a_terminal_failure() {
        let gate = InitGate::new();
        let outcome = gate.ensure(|| panic!("collector load blew up"));
        assert_eq!(outcome, GateOutcome::Failed);
        // Not retried.
        assert_eq!(gate.ensure(|| unreachable!()), GateOutcome::Failed);
    }
}
