//! # Frames
//!
//! A frame is a timed span that, unlike a task, is not tied to thread
//! nesting: it may begin on one thread and end on another, identified by an
//! optional caller-supplied id. The open-frame stack therefore lives on the
//! domain, not the thread. `frame_submit` reports a span measured entirely
//! by the caller, with explicit begin/end timestamps.

use crate::control;
use crate::dispatch;
use crate::handles::{Domain, FrameEntry};
use crate::model::{Id, Timestamp};

impl Domain {
    /// Open a frame. `None` opens an anonymous frame.
    pub fn frame_begin(&self, id: Option<Id>) {
        let Some(domain) = self.0 else { return };
        let begin = Timestamp::now();
        let id = id.unwrap_or(Id::NONE).0;

        domain.frames.lock().push(FrameEntry { id, begin });

        if !control::should_emit(domain) {
            return;
        }
        dispatch::frame_begin(domain.seq(), id, begin.as_nanos());
    }

    /// Close a frame.
    ///
    /// With an id, the newest open frame carrying that id is closed; if none
    /// matches (or without an id), the newest frame is closed instead;
    /// a caller bug shortens a frame rather than leaking it. Closing with no
    /// open frame is a silent no-op apart from the notification.
    pub fn frame_end(&self, id: Option<Id>) {
        let Some(domain) = self.0 else { return };
        let now = Timestamp::now();
        let wanted = id.unwrap_or(Id::NONE).0;

        let closed = {
            let mut frames = domain.frames.lock();
            let index = match frames.iter().rposition(|entry| entry.id == wanted) {
                Some(index) => Some(index),
                None if frames.is_empty() => None,
                None => Some(frames.len() - 1),
            };
            index.map(|index| frames.remove(index))
        };

        if !control::should_emit(domain) {
            return;
        }
        dispatch::frame_end(
            domain.seq(),
            closed.map_or(wanted, |entry| entry.id),
            now.as_nanos(),
        );
    }

    /// Report a frame measured by the caller, after the fact.
    pub fn frame_submit(&self, id: Option<Id>, begin: Timestamp, end: Timestamp) {
        let Some(domain) = self.0 else { return };
        if !control::should_emit(domain) {
            return;
        }
        dispatch::frame_submit(
            domain.seq(),
            id.unwrap_or(Id::NONE).0,
            begin.as_nanos(),
            end.as_nanos(),
        );
    }

    #[cfg(test)]
    pub(crate) fn open_frames(&self) -> usize {
        self.0.map_or(0, |domain| domain.frames.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn begin_end_balances() {
        let domain = Domain::create("FrameTest.Simple");
        domain.frame_begin(None);
        assert_eq!(domain.open_frames(), 1);
        domain.frame_end(None);
        assert_eq!(domain.open_frames(), 0);
    }

    #[test]
    fn identified_frames_close_by_id() {
        let domain = Domain::create("FrameTest.ById");
        domain.frame_begin(Some(Id(1)));
        domain.frame_begin(Some(Id(2)));
        domain.frame_end(Some(Id(1)));
        domain.frame_end(Some(Id(2)));
        assert_eq!(domain.open_frames(), 0);
    }

    #[test]
    fn unknown_id_falls_back_to_newest() {
        let domain = Domain::create("FrameTest.Fallback");
        domain.frame_begin(Some(Id(7)));
        domain.frame_end(Some(Id(42)));
        assert_eq!(domain.open_frames(), 0, "caller bug pops the newest frame");
    }

    #[test]
    fn spurious_end_is_harmless() {
        let domain = Domain::create("FrameTest.Spurious");
        domain.frame_end(None);
        domain.frame_end(Some(Id(3)));
        assert_eq!(domain.open_frames(), 0);
    }

    #[test]
    fn frames_cross_threads() {
        let domain = Domain::create("FrameTest.CrossThread");
        domain.frame_begin(Some(Id(11)));
        thread::spawn(move || {
            domain.frame_end(Some(Id(11)));
        })
        .join()
        .unwrap();
        assert_eq!(domain.open_frames(), 0, "frame state is domain-scoped");
    }

    #[test]
    fn submit_never_touches_the_stack() {
        let domain = Domain::create("FrameTest.Submit");
        let begin = Timestamp::now();
        let end = Timestamp::now();
        domain.frame_submit(Some(Id(5)), begin, end);
        assert_eq!(domain.open_frames(), 0);
    }

    #[test]
    fn null_domain_is_a_noop() {
        let domain = Domain::create("");
        domain.frame_begin(None);
        domain.frame_end(None);
        domain.frame_submit(None, Timestamp(0), Timestamp(1));
    }
}
