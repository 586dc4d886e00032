//! # Collector Loading and Symbol Binding
//!
//! Resolves the collector library path from the environment, loads it, runs
//! the ABI handshake and binds every exported notification symbol into a
//! [`Bindings`] table. Runs at most once per process, inside the init gate's
//! critical section.
//!
//! All failure states are represented as data: an unset path is the
//! supported "no collector" configuration, a broken library logs one warning
//! and yields an empty table. Nothing here panics past its boundary.

use libloading::Library;
use log::{debug, warn};
use std::env;
use std::ffi::OsString;
use std::mem;

use super::Bindings;
use crate::model::errors::CollectorError;
use tracegate_common::{symbols, InitFn, ABI_VERSION, COLLECTOR_PATH_ENV};

/// Load and bind the collector named by [`COLLECTOR_PATH_ENV`].
///
/// Returns the all-no-op table when no collector is configured or the
/// configured one cannot be used.
pub(super) fn load_from_env() -> Bindings {
    let Some(path) = env::var_os(COLLECTOR_PATH_ENV) else {
        debug!("no collector configured ({COLLECTOR_PATH_ENV} unset), notifications are no-ops");
        return Bindings::disabled();
    };
    if path.is_empty() {
        debug!("{COLLECTOR_PATH_ENV} is empty, notifications are no-ops");
        return Bindings::disabled();
    }

    match load(&path) {
        Ok(bindings) => {
            debug!("collector {} attached", path.to_string_lossy());
            bindings
        }
        Err(err) => {
            // Logged once: the load is never retried.
            warn!("collector disabled: {err}");
            Bindings::disabled()
        }
    }
}

#[allow(unsafe_code)]
fn load(path: &OsString) -> Result<Bindings, CollectorError> {
    let display = path.to_string_lossy().into_owned();

    // Safety: loading an arbitrary shared object runs its initializers; that
    // is the entire point of a collector. The operator opted in by setting
    // the environment variable.
    let lib = unsafe { Library::new(path) }.map_err(|source| CollectorError::LoadFailed {
        path: display.clone(),
        source,
    })?;

    let init: InitFn = unsafe { lib.get::<InitFn>(symbols::INIT) }
        .map_err(|_| CollectorError::HandshakeMissing {
            path: display.clone(),
        })
        .map(|sym| *sym)?;

    // Safety: signature fixed by the ABI contract just verified to exist.
    let actual = unsafe { init(ABI_VERSION) };
    if actual != ABI_VERSION {
        return Err(CollectorError::AbiMismatch {
            path: display,
            expected: ABI_VERSION,
            actual,
        });
    }

    let bindings = Bindings {
        domain_create: bind(&lib, symbols::DOMAIN_CREATE),
        string_handle_create: bind(&lib, symbols::STRING_HANDLE_CREATE),
        counter_create: bind(&lib, symbols::COUNTER_CREATE),
        counter_set: bind(&lib, symbols::COUNTER_SET),
        event_create: bind(&lib, symbols::EVENT_CREATE),
        event_start: bind(&lib, symbols::EVENT_START),
        event_end: bind(&lib, symbols::EVENT_END),
        task_begin: bind(&lib, symbols::TASK_BEGIN),
        task_end: bind(&lib, symbols::TASK_END),
        frame_begin: bind(&lib, symbols::FRAME_BEGIN),
        frame_end: bind(&lib, symbols::FRAME_END),
        frame_submit: bind(&lib, symbols::FRAME_SUBMIT),
        metadata_add: bind(&lib, symbols::METADATA_ADD),
        metadata_str_add: bind(&lib, symbols::METADATA_STR_ADD),
        thread_set_name: bind(&lib, symbols::THREAD_SET_NAME),
        pause: bind(&lib, symbols::PAUSE),
        resume: bind(&lib, symbols::RESUME),
        detach: bind(&lib, symbols::DETACH),
    };

    // The bound function pointers must stay valid for the process lifetime;
    // unloading is never supported, so the library handle is leaked.
    mem::forget(lib);

    Ok(bindings)
}

/// Resolve one optional symbol. A missing symbol is a permanent no-op for
/// that notification kind, not an error.
#[allow(unsafe_code)]
fn bind<T: Copy>(lib: &Library, name: &[u8]) -> Option<T> {
    // Safety: every T this is instantiated with is an `unsafe extern "C" fn`
    // type from the shared ABI contract.
    match unsafe { lib.get::<T>(name) } {
        Ok(sym) => Some(*sym),
        Err(_) => {
            debug!(
                "collector does not export {}, that capability is a no-op",
                String::from_utf8_lossy(name)
            );
            None
        }
    }
}
