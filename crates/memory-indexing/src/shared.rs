//! Thread-safe handle over a single index instance.
//!
//! Indices are plain single-writer structures. `SharedIndex` puts one behind
//! an `RwLock` so many readers can search concurrently while writes are
//! serialized, and lets a fully built replacement be swapped in at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

/// Single-writer/multi-reader wrapper with atomic replacement.
#[derive(Debug, Default)]
pub struct SharedIndex<T> {
    inner: RwLock<T>,
    /// Bumped on every `replace`
    generation: AtomicU64,
}

impl<T> SharedIndex<T> {
    pub fn new(index: T) -> Self {
        Self {
            inner: RwLock::new(index),
            generation: AtomicU64::new(0),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Swap in a new instance, returning the previous one.
    ///
    /// Readers see either the old or the new index, never a mix.
    pub fn replace(&self, index: T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let old = std::mem::replace(&mut *guard, index);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Swapped shared index");
        old
    }

    /// Number of swaps performed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
