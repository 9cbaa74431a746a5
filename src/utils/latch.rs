//! Warn-once latching.
//!
//! A condition like "segmentation mask missing" can persist for hundreds of
//! frames; logging it every frame drowns the log. A [`WarnLatch`] fires once
//! per *transition* into the bad state and is re-armed when the state clears.

/// One-shot latch for per-transition warnings.
///
/// [`fire`](Self::fire) returns `true` only on the first call after
/// construction or [`reset`](Self::reset); callers log exactly when it
/// returns `true`.
#[derive(Debug, Default, Clone)]
pub struct WarnLatch {
    fired: bool,
}

impl WarnLatch {
    /// Creates an armed latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the latch. Returns `true` if it was armed (i.e. the caller
    /// should log), `false` on every subsequent call until reset.
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    /// Re-arms the latch; the next [`fire`](Self::fire) will return `true`.
    pub fn reset(&mut self) {
        self.fired = false;
    }

    /// Whether the latch has already fired.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
