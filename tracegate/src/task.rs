//! # Tasks
//!
//! A task is a named, possibly nested, timed span of work on one thread
//! within a domain. Begin pushes onto the calling thread's stack and tells
//! the collector the nesting depth; end pops best-effort, so a mismatched or
//! spurious end is tolerated, never fatal.

use crate::context;
use crate::control;
use crate::dispatch;
use crate::handles::{Domain, StringHandle};
use crate::model::{Id, Timestamp};
use tracegate_common::{RawStr, TaskRecord};

impl Domain {
    /// Begin an anonymous task on the calling thread.
    pub fn task_begin(&self, name: StringHandle) {
        self.task_begin_with_id(Id::NONE, Id::NONE, name);
    }

    /// Begin a task with an explicit instance id and parent id, so metadata
    /// and cross-thread relations can refer to it later.
    ///
    /// A null domain or null name handle makes the whole call a no-op; the
    /// matching `task_end` then pops nothing, which is equally tolerated.
    pub fn task_begin_with_id(&self, id: Id, parent: Id, name: StringHandle) {
        let Some(domain) = self.0 else { return };
        let Some(name) = name.0 else { return };

        // Bookkeeping happens even while paused so nesting stays balanced.
        let (depth, begin) = context::push_task(domain.seq(), id.0);

        if !control::should_emit(domain) {
            return;
        }
        dispatch::task_begin(TaskRecord {
            domain_seq: domain.seq(),
            id: id.0,
            parent_id: parent.0,
            name: RawStr::from_str(name.name()),
            timestamp_ns: begin.as_nanos(),
            tid: context::current_tid(),
            depth,
        });
    }

    /// End the most recently begun task on the calling thread.
    ///
    /// Nesting is caller-enforced: if the top of the stack belongs to a
    /// different domain the entry is popped anyway, and ending with an empty
    /// stack is a silent no-op apart from the notification.
    pub fn task_end(&self) {
        let Some(domain) = self.0 else { return };

        let _popped = context::pop_task();
        let now = Timestamp::now();

        if !control::should_emit(domain) {
            return;
        }
        dispatch::task_end(domain.seq(), now.as_nanos(), context::current_tid());
    }
}
