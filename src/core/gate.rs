//! # Access gate: the single critical region around the alarm registry.
//!
//! Every read or write of registry state (topology and per-record fields)
//! happens while a [`GateGuard`] is alive.
//!
//! ## Nesting
//! An operation that needs several registry steps (for example "remove the
//! record, then report what was removed") enters once and hands the guard's
//! `&mut T` to its helpers. Helpers never enter on their own, so nested
//! critical sections within one call chain share a single acquisition and
//! cannot self-deadlock.
//!
//! ```text
//! enter() ──► GateGuard ──► helper(&mut *guard) ──► helper(&mut *guard) ──► drop = leave
//! ```
//!
//! ## Rules
//! - Never hold a guard across a sleep.
//! - Acquisition waits without timeout; it cannot fail.

use std::ops::{Deref, DerefMut};

use tokio::sync::{Mutex, MutexGuard};

/// Mutual-exclusion wrapper owning the guarded value.
pub(crate) struct Gate<T> {
    inner: Mutex<T>,
}

impl<T> Gate<T> {
    /// Creates a gate owning `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Enters the critical region, waiting until it is free.
    pub async fn enter(&self) -> GateGuard<'_, T> {
        GateGuard {
            guard: self.inner.lock().await,
        }
    }
}

/// Proof that the critical region is held. Dropping it leaves the region.
pub(crate) struct GateGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> GateGuard<'_, T> {
    /// Leaves the critical region explicitly.
    #[inline]
    pub fn leave(self) {
        drop(self);
    }
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
