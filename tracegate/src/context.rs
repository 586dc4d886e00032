//! # Per-Thread Instrumentation State
//!
//! One [`ThreadSlot`] per OS thread, created lazily on the first call from
//! that thread and dropped passively at thread exit. The slot is owned
//! exclusively by its thread, with no locking and no cross-thread ordering.
//!
//! The task stack enforces nesting *permissively*: `task_end` pops the top
//! entry even when the caller mixed up domains, and popping an empty stack
//! is a silent no-op. Instrumentation must never turn a caller bug into a
//! crash.

use std::cell::RefCell;

use crate::control;
use crate::dispatch;
use crate::model::{Tid, Timestamp};

/// One open task on the calling thread's stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TaskEntry {
    pub domain_seq: u64,
    pub id: u64,
    pub begin: Timestamp,
}

#[derive(Debug)]
struct ThreadSlot {
    tid: u32,
    /// Display name, last-writer-wins. Kept so a future query surface can
    /// report it; the collector is told on every rename.
    name: Option<String>,
    tasks: Vec<TaskEntry>,
}

thread_local! {
    static SLOT: RefCell<ThreadSlot> = RefCell::new(ThreadSlot {
        tid: os_tid(),
        name: None,
        tasks: Vec::new(),
    });
}

#[cfg(target_os = "linux")]
fn os_tid() -> u32 {
    // Safety: gettid has no preconditions.
    #[allow(unsafe_code)]
    let tid = unsafe { libc::gettid() };
    tid as u32
}

#[cfg(not(target_os = "linux"))]
fn os_tid() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    // Process-local stand-in; starts at 1 so 0 stays free as a sentinel.
    static NEXT: AtomicU32 = AtomicU32::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// OS thread id of the calling thread, cached in its slot.
pub(crate) fn current_tid() -> u32 {
    SLOT.with(|slot| slot.borrow().tid)
}

/// Push an open task and return (depth including it, begin timestamp).
pub(crate) fn push_task(domain_seq: u64, id: u64) -> (u32, Timestamp) {
    let begin = Timestamp::now();
    SLOT.with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.tasks.push(TaskEntry {
            domain_seq,
            id,
            begin,
        });
        (slot.tasks.len() as u32, begin)
    })
}

/// Pop the most recently begun task, regardless of domain.
///
/// Mismatched or spurious ends are tolerated: pop best-effort, never panic.
pub(crate) fn pop_task() -> Option<TaskEntry> {
    SLOT.with(|slot| slot.borrow_mut().tasks.pop())
}

/// Number of open tasks on the calling thread.
pub(crate) fn task_depth() -> usize {
    SLOT.with(|slot| slot.borrow().tasks.len())
}

/// Publish a display name for the calling thread.
///
/// Last writer wins; an empty name is a silent no-op. The collector is
/// notified with the caller's tid unless it has been detached.
pub fn set_thread_name(name: &str) {
    if name.is_empty() {
        return;
    }
    let tid = SLOT.with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.name = Some(name.to_owned());
        slot.tid
    });
    if !control::is_detached() {
        dispatch::thread_set_name(name, tid);
    }
}

/// Publish a display name for another thread, identified by tid.
///
/// Pure forwarding: the per-thread slot belongs to its own thread, so only
/// the collector learns about this one.
pub fn set_thread_name_for(name: &str, tid: Tid) {
    if name.is_empty() {
        return;
    }
    if !control::is_detached() {
        dispatch::thread_set_name(name, tid.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn push_pop_balance() {
        let (depth1, t1) = push_task(1, 0);
        let (depth2, t2) = push_task(1, 0);
        assert_eq!(depth2, depth1 + 1);
        assert!(t1 <= t2);

        assert!(pop_task().is_some());
        assert!(pop_task().is_some());
        assert_eq!(task_depth(), 0);
    }

    #[test]
    fn spurious_pop_is_harmless() {
        assert_eq!(task_depth(), 0);
        assert!(pop_task().is_none());
        assert_eq!(task_depth(), 0);
    }

    #[test]
    fn pop_ignores_domain_mismatch() {
        push_task(1, 0);
        push_task(2, 0);
        // Ends arrive for domain 1 twice; both pops succeed anyway.
        assert_eq!(pop_task().unwrap().domain_seq, 2);
        assert_eq!(pop_task().unwrap().domain_seq, 1);
    }

    #[test]
    fn stacks_are_per_thread() {
        push_task(9, 0);
        let other = thread::spawn(|| task_depth()).join().unwrap();
        assert_eq!(other, 0);
        assert_eq!(task_depth(), 1);
        pop_task();
    }

    #[test]
    fn tids_are_stable_within_a_thread() {
        assert_eq!(current_tid(), current_tid());
    }

    #[test]
    fn renaming_never_panics() {
        set_thread_name("FirstName");
        set_thread_name("SecondName");
        set_thread_name("");
        set_thread_name_for("Remote", Tid(99));
    }
}
