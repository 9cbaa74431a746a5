//! Pass Lifecycle State Machine
//!
//! The host invokes setup, execute and cleanup serially, once per camera per
//! frame, on its rendering thread. Instead of relying on the host's implied
//! call ordering, the pass tracks an explicit state and refuses to execute
//! unless the frame's setup actually completed — a transient allocation
//! failure leaves the pass in [`PassState::SetupPending`] and that frame's
//! execute degrades to a no-op.

/// Per-frame lifecycle state of the overlay pass.
///
/// `Uninitialized → SetupPending → SetupComplete → Executed → CleanedUp`
/// cycles every frame; `CleanedUp` is an end-of-frame reset, not pass
/// destruction. Disposal is tracked separately and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// No frame has started yet.
    Uninitialized,
    /// Camera setup started but the scratch target is not (yet) usable.
    SetupPending,
    /// Scratch target ready; execute may run.
    SetupComplete,
    /// This frame's commands were recorded (possibly as a pass-through).
    Executed,
    /// End-of-frame reset; the next frame must run setup again.
    CleanedUp,
}

/// Tracks the frame cycle and the one-shot disposal latch.
#[derive(Debug)]
pub struct PassLifecycle {
    state: PassState,
    disposed: bool,
}

impl Default for PassLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl PassLifecycle {
    /// Fresh lifecycle in [`PassState::Uninitialized`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PassState::Uninitialized,
            disposed: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Camera setup started; the pass is not executable until
    /// [`finish_setup`](Self::finish_setup).
    pub fn begin_setup(&mut self) {
        if !self.disposed {
            self.state = PassState::SetupPending;
        }
    }

    /// Marks setup complete. Ignored unless setup is actually pending, so a
    /// stray call cannot fabricate readiness.
    pub fn finish_setup(&mut self) {
        if !self.disposed && self.state == PassState::SetupPending {
            self.state = PassState::SetupComplete;
        }
    }

    /// Whether execute may record commands this frame.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        !self.disposed && self.state == PassState::SetupComplete
    }

    /// Records that this frame's execute ran.
    pub fn mark_executed(&mut self) {
        if !self.disposed && self.state == PassState::SetupComplete {
            self.state = PassState::Executed;
        }
    }

    /// End-of-frame reset; readiness is dropped until the next setup.
    pub fn cleanup(&mut self) {
        if !self.disposed {
            self.state = PassState::CleanedUp;
        }
    }

    /// Trips the disposal latch. Returns `true` exactly once; the caller
    /// releases resources (and logs) only on that first call.
    pub fn dispose(&mut self) -> bool {
        !std::mem::replace(&mut self.disposed, true)
    }

    /// Whether the pass has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
