//! # Events
//!
//! An event marks a point or a simple (possibly overlapping) span of
//! interest, identified by its handle rather than by nesting. Start/end
//! pairs carry no stack discipline at all.

use crate::context;
use crate::control;
use crate::dispatch;
use crate::handles::Event;
use crate::model::Timestamp;

impl Event {
    /// Mark the start of an occurrence of this event.
    pub fn start(&self) {
        let Some(event) = self.0 else { return };
        if !control::is_collection_active() {
            return;
        }
        dispatch::event_start(
            event.seq(),
            Timestamp::now().as_nanos(),
            context::current_tid(),
        );
    }

    /// Mark the end of an occurrence of this event.
    pub fn end(&self) {
        let Some(event) = self.0 else { return };
        if !control::is_collection_active() {
            return;
        }
        dispatch::event_end(
            event.seq(),
            Timestamp::now().as_nanos(),
            context::current_tid(),
        );
    }
}
