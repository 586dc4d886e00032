//! # Handle Interning
//!
//! One [`Interner`] exists per handle kind (domains, string handles,
//! counters, events). Each maps an exact name to a unique, immutable entry
//! that lives for the rest of the process: callers cache handles in
//! long-lived state, so entries are append-only and leaked on purpose.
//!
//! ## Concurrency
//!
//! Lookup takes a read lock; insertion upgrades to a write lock and
//! re-checks, so two threads racing to intern the same new name agree on a
//! single winner and the loser returns the winner's entry. Interning is
//! linearizable per name.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Thread-safe, append-only interning table for one handle kind.
pub(crate) struct Interner<T: 'static> {
    inner: RwLock<Inner<T>>,
}

struct Inner<T: 'static> {
    by_name: FxHashMap<&'static str, &'static T>,
    entries: Vec<&'static T>,
}

impl<T: 'static> Default for Interner<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_name: FxHashMap::default(),
                entries: Vec::new(),
            }),
        }
    }
}

impl<T: 'static> Interner<T> {
    /// Look up `name`, creating the entry on first use.
    ///
    /// `make` receives the assigned sequence number (starting at 1) and the
    /// interned copy of the name. Returns the entry and whether this call
    /// created it; the creation notification must fire exactly once.
    ///
    /// Empty names are the caller's problem: handle constructors return the
    /// null handle before ever reaching the interner.
    pub(crate) fn intern(
        &self,
        name: &str,
        make: impl FnOnce(u64, &'static str) -> T,
    ) -> (&'static T, bool) {
        if let Some(existing) = self.inner.read().by_name.get(name).copied() {
            return (existing, false);
        }

        let mut inner = self.inner.write();
        // Re-check: another thread may have won the insert race while we
        // waited for the write lock.
        if let Some(existing) = inner.by_name.get(name).copied() {
            return (existing, false);
        }

        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let seq = inner.entries.len() as u64 + 1;
        let entry: &'static T = Box::leak(Box::new(make(seq, name)));
        inner.by_name.insert(name, entry);
        inner.entries.push(entry);
        (entry, true)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'static T> {
        self.inner.read().by_name.get(name).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().entries.len()
    }
}
