//! Structured error types for the collector loading path
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! These never cross the public boundary: every failure degrades the
//! affected notifications to no-ops and is logged at most once.

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CollectorError {
    #[error("failed to load collector library {path}: {source}")]
    LoadFailed {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("collector {path} does not export the mandatory init symbol")]
    HandshakeMissing { path: String },

    #[error("collector {path} implements ABI v{actual}, this process speaks v{expected}")]
    AbiMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abi_mismatch_display() {
        let err = CollectorError::AbiMismatch {
            path: "/opt/collector.so".to_string(),
            expected: 1,
            actual: 2,
        };
        assert!(err.to_string().contains("/opt/collector.so"));
        assert!(err.to_string().contains("ABI v2"));
    }

    #[test]
    fn handshake_missing_display() {
        let err = CollectorError::HandshakeMissing {
            path: "libnull.so".to_string(),
        };
        assert!(err.to_string().contains("libnull.so"));
        assert!(err.to_string().contains("init symbol"));
    }
}
