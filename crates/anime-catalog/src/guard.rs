//! Request supersession for a single fetch site.
//!
//! Every request takes a [`Ticket`]; issuing a new ticket retires all earlier
//! ones. Results are committed only while their ticket is still current.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter for one fetch site
#[derive(Debug, Default)]
pub struct RequestGuard {
    generation: AtomicU64,
}

/// Proof of which generation a request belongs to
#[derive(Debug)]
pub struct Ticket<'a> {
    guard: &'a RequestGuard,
    generation: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, retiring every outstanding ticket
    pub fn issue(&self) -> Ticket<'_> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            guard: self,
            generation,
        }
    }

    /// Retire every outstanding ticket without starting a request
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Ticket<'_> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.guard.current() == self.generation
    }
}
