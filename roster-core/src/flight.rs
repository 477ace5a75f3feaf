//! Single-flight guard.
//!
//! Rejects a second invocation of an operation while the first is still
//! outstanding. The guard is released when the returned permit is dropped,
//! so every exit path of the guarded operation (success, error, early
//! return, a cancelled future) frees it.

use std::sync::atomic::{AtomicBool, Ordering};

/// A boolean in-flight flag with RAII release.
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: AtomicBool,
}

impl SingleFlight {
    /// Create an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` if an invocation is already outstanding.
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit { flight: self })
    }

    /// True while a permit is held.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the guard. Releases it on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    flight: &'a SingleFlight,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.flight.in_flight.store(false, Ordering::Release);
    }
}
