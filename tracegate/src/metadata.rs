//! # Metadata
//!
//! Typed key/value attachments addressed to a domain or, via an [`Id`], to a
//! task or frame begun with that id. Values are borrowed for the duration of
//! the notification call only; a collector that buffers must copy.

use std::ffi::c_void;

use crate::control;
use crate::dispatch;
use crate::handles::{Domain, StringHandle};
use crate::model::Id;
use tracegate_common::{MetadataRecord, RawStr, ValueKind};

/// A borrowed metadata payload.
#[derive(Debug, Clone, Copy)]
pub enum MetadataValue<'a> {
    U64(&'a [u64]),
    I64(&'a [i64]),
    F64(&'a [f64]),
}

impl MetadataValue<'_> {
    fn kind(&self) -> ValueKind {
        match self {
            Self::U64(_) => ValueKind::U64,
            Self::I64(_) => ValueKind::I64,
            Self::F64(_) => ValueKind::F64,
        }
    }

    fn count(&self) -> u64 {
        match self {
            Self::U64(values) => values.len() as u64,
            Self::I64(values) => values.len() as u64,
            Self::F64(values) => values.len() as u64,
        }
    }

    fn data(&self) -> *const c_void {
        match self {
            Self::U64(values) => values.as_ptr().cast(),
            Self::I64(values) => values.as_ptr().cast(),
            Self::F64(values) => values.as_ptr().cast(),
        }
    }
}

impl Domain {
    /// Attach numeric metadata. `id` addresses a task/frame instance,
    /// [`Id::NONE`] the domain itself. Null domain or key: silent no-op.
    pub fn metadata_add(&self, id: Id, key: StringHandle, value: MetadataValue<'_>) {
        let Some(domain) = self.0 else { return };
        let Some(key) = key.0 else { return };
        if !control::should_emit(domain) {
            return;
        }
        dispatch::metadata_add(MetadataRecord {
            domain_seq: domain.seq(),
            id: id.0,
            key: RawStr::from_str(key.name()),
            kind: value.kind() as u32,
            count: value.count(),
            data: value.data(),
        });
    }

    /// Attach string metadata.
    pub fn metadata_str_add(&self, id: Id, key: StringHandle, value: &str) {
        let Some(domain) = self.0 else { return };
        let Some(key) = key.0 else { return };
        if !control::should_emit(domain) {
            return;
        }
        dispatch::metadata_str_add(domain.seq(), id.0, key.name(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_payload_shapes() {
        let value = MetadataValue::U64(&[10, 20, 30, 40, 50]);
        assert_eq!(value.kind(), ValueKind::U64);
        assert_eq!(value.count(), 5);
        assert!(!value.data().is_null());

        let value = MetadataValue::F64(&[3.141_59]);
        assert_eq!(value.kind(), ValueKind::F64);
        assert_eq!(value.count(), 1);
    }

    #[test]
    fn attach_without_collector_never_panics() {
        let domain = Domain::create("MetadataTest.Attach");
        let key = StringHandle::create("iterations");

        domain.metadata_add(Id::NONE, key, MetadataValue::U64(&[100]));
        domain.metadata_add(Id(1), key, MetadataValue::I64(&[-1, 2]));
        domain.metadata_str_add(Id::NONE, key, "Test description");
    }

    #[test]
    fn null_handles_are_noops() {
        let domain = Domain::create("MetadataTest.Null");
        let null_key = StringHandle::create("");
        domain.metadata_add(Id::NONE, null_key, MetadataValue::U64(&[1]));
        domain.metadata_str_add(Id::NONE, null_key, "dropped");

        let null_domain = Domain::create("");
        let key = StringHandle::create("key");
        null_domain.metadata_add(Id::NONE, key, MetadataValue::U64(&[1]));
    }
}
