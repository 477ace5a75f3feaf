//! Liveness tokens and request ordering for suspendable tasks.
//!
//! Tasks are never cancelled. Instead, each task takes a token when it starts
//! and checks it before applying its result. Deactivating (or re-activating)
//! the view bumps the generation, which turns every outstanding token stale.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Snapshot of the activation generation a task started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessToken(u64);

impl LivenessToken {
    /// The generation this token belongs to.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Activation lifetime of a view.
#[derive(Debug, Default)]
pub struct Liveness {
    generation: AtomicU64,
    active: AtomicBool,
}

impl Liveness {
    /// Create an inactive lifetime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new activation, invalidating every earlier token.
    pub fn activate(&self) -> LivenessToken {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.active.store(true, Ordering::Release);
        LivenessToken(generation)
    }

    /// End the current activation, invalidating every outstanding token.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Token for a task starting now.
    pub fn token(&self) -> LivenessToken {
        LivenessToken(self.generation.load(Ordering::Acquire))
    }

    /// True if a result produced under `token` may still be applied.
    pub fn is_live(&self, token: LivenessToken) -> bool {
        self.active.load(Ordering::Acquire) && self.generation.load(Ordering::Acquire) == token.0
    }

    /// True between [`activate`](Self::activate) and [`deactivate`](Self::deactivate).
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Orders overlapping requests for the same resource.
///
/// Each request takes a sequence number when it is issued. A result is only
/// applied if no later-issued request has already applied its own, so a slow
/// older response cannot overwrite a newer one.
#[derive(Debug, Default)]
pub struct RequestSeq {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSeq {
    /// Create a sequence with nothing issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for a request issued now.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Claim the right to apply the result of request `seq`.
    ///
    /// Returns false if a later request's result was already applied.
    pub fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::AcqRel) < seq
    }
}
