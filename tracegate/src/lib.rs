//! # Tracegate - Low-Overhead Instrumentation API
//!
//! Tracegate lets applications annotate their work (domains, tasks, frames,
//! counters, events, metadata) so an externally attached *collector* can
//! record it. When no collector is attached, every call degrades to a single
//! predictable branch; instrumentation is never the reason a production
//! process crashes or even slows down noticeably.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      User Application                           │
//! │      Domain::create / task_begin / Counter::set_value / …       │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ handles + records
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Tracegate (This Crate)                       │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Registries  │   │   Context    │   │   Control    │         │
//! │  │  (interning) │   │ (task stack) │   │(pause/detach)│         │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘         │
//! │         └──────────────────┼──────────────────┘                 │
//! │                            ▼                                    │
//! │                    ┌──────────────┐   ┌──────────────┐          │
//! │                    │   Dispatch   │──▶│  Init Gate + │          │
//! │                    │  (one-shot   │   │    Loader    │          │
//! │                    │    table)    │   │ (libloading) │          │
//! │                    └──────┬───────┘   └──────────────┘          │
//! └───────────────────────────┼─────────────────────────────────────┘
//!                             │ tgc_* C ABI (tracegate-common)
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │           Collector Library ($TRACEGATE_COLLECTOR)              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - `handles`: the interned handle kinds ([`Domain`], [`StringHandle`],
//!   [`Counter`], [`Event`]); one immutable entry per name, forever
//! - `registry`: the thread-safe interning table behind each handle kind
//! - `context`: per-thread state (tid, display name, nested task stack)
//! - `control`: process-wide pause/resume depth and the terminal detach
//! - `dispatch`: the patchable indirection; stub path drives the one-shot
//!   init gate, direct path is one atomic load per call
//! - `model`: small value types ([`Id`], [`Timestamp`], [`Tid`])
//!
//! ## Degradation Ladder
//!
//! 1. `TRACEGATE_COLLECTOR` unset → everything no-ops after one branch.
//! 2. Library unloadable / wrong ABI → one warning, then as above.
//! 3. Individual symbol missing → only that notification kind no-ops.
//! 4. Caller passes an empty name → null handle, all uses of it no-op.
//! 5. Caller unbalances begin/end → best-effort pop, never a panic.
//!
//! ## Example
//!
//! ```
//! use tracegate::{Domain, StringHandle};
//!
//! let domain = Domain::create("renderer");
//! let name = StringHandle::create("draw_scene");
//!
//! domain.task_begin(name);
//! // ... the work being measured ...
//! domain.task_end();
//! ```

mod context;
mod control;
mod counter;
mod dispatch;
mod event;
mod frame;
mod handles;
mod metadata;
pub mod model;
mod registry;
mod task;

pub use context::{set_thread_name, set_thread_name_for};
pub use control::{detach, is_collection_active, pause, resume};
pub use handles::{Counter, Domain, Event, StringHandle};
pub use metadata::MetadataValue;
pub use model::{timestamp, Id, Tid, Timestamp};
pub use tracegate_common::ValueKind;
