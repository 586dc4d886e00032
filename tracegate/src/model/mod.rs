//! Core value types and internal errors
//!
//! This module contains the small value types that appear throughout the
//! public surface:
//! - Compile-time safety via newtype pattern
//! - Self-documenting function signatures
//! - Structured error handling for the loader path

pub(crate) mod errors;
pub mod types;

pub use types::{timestamp, Id, Tid, Timestamp};
