//! Pass Lifecycle and Resource Policy Tests
//!
//! Tests for:
//! - PassLifecycle: frame-cycle transitions, execute gating, idempotent dispose
//! - needs_reallocation: scratch target reuse vs. reallocation decisions
//! - WarnLatch: warn-once-per-transition behavior

use overpaint::pass::lifecycle::PassLifecycle;
use overpaint::pass::needs_reallocation;
use overpaint::{OverlayPass, PassState, TargetDescriptor, WarnLatch};

// ============================================================================
// PassLifecycle
// ============================================================================

#[test]
fn lifecycle_starts_uninitialized() {
    let lc = PassLifecycle::new();
    assert_eq!(lc.state(), PassState::Uninitialized);
    assert!(!lc.can_execute());
}

#[test]
fn full_frame_cycle() {
    let mut lc = PassLifecycle::new();

    lc.begin_setup();
    assert_eq!(lc.state(), PassState::SetupPending);
    assert!(!lc.can_execute());

    lc.finish_setup();
    assert_eq!(lc.state(), PassState::SetupComplete);
    assert!(lc.can_execute());

    lc.mark_executed();
    assert_eq!(lc.state(), PassState::Executed);
    assert!(!lc.can_execute());

    lc.cleanup();
    assert_eq!(lc.state(), PassState::CleanedUp);

    // Next frame restarts the cycle
    lc.begin_setup();
    assert_eq!(lc.state(), PassState::SetupPending);
}

#[test]
fn finish_setup_requires_pending_setup() {
    let mut lc = PassLifecycle::new();
    // A stray call cannot fabricate readiness
    lc.finish_setup();
    assert_eq!(lc.state(), PassState::Uninitialized);
    assert!(!lc.can_execute());
}

#[test]
fn failed_setup_blocks_execute() {
    let mut lc = PassLifecycle::new();
    lc.begin_setup();
    // Allocation failed: finish_setup never runs
    assert!(!lc.can_execute());
    lc.mark_executed();
    assert_eq!(lc.state(), PassState::SetupPending, "no-op when not ready");
}

#[test]
fn cleanup_drops_readiness_until_next_setup() {
    let mut lc = PassLifecycle::new();
    lc.begin_setup();
    lc.finish_setup();
    lc.cleanup();
    assert!(!lc.can_execute());
}

#[test]
fn dispose_is_idempotent() {
    let mut lc = PassLifecycle::new();
    assert!(lc.dispose(), "first dispose releases");
    assert!(!lc.dispose(), "second dispose is a no-op");
    assert!(!lc.dispose());
    assert!(lc.is_disposed());
}

#[test]
fn disposed_lifecycle_ignores_frame_calls() {
    let mut lc = PassLifecycle::new();
    lc.dispose();
    lc.begin_setup();
    lc.finish_setup();
    assert!(!lc.can_execute());
    assert_eq!(lc.state(), PassState::Uninitialized);
}

// ============================================================================
// Execute gating
// ============================================================================

#[test]
fn fresh_pass_reports_incomplete_setup() {
    let pass = OverlayPass::new();
    assert_eq!(pass.skip_reason(true), Some("setup incomplete"));
    assert_eq!(pass.skip_reason(false), Some("setup incomplete"));
}

#[test]
fn disposed_pass_never_becomes_executable() {
    let mut pass = OverlayPass::new();
    pass.dispose();
    assert!(pass.skip_reason(true).is_some());
}

#[test]
fn persistent_skip_reason_warns_once() {
    // One latch covers every skip reason; it re-arms only on a frame that
    // actually composites, so a condition that persists logs a single line
    let pass = OverlayPass::new();
    let mut latch = WarnLatch::new();
    let mut warnings = 0;
    for _ in 0..5 {
        if pass.skip_reason(false).is_some() {
            if latch.fire() {
                warnings += 1;
            }
        } else {
            latch.reset();
        }
    }
    assert_eq!(warnings, 1);
}

// ============================================================================
// needs_reallocation
// ============================================================================

fn desc(w: u32, h: u32) -> TargetDescriptor {
    TargetDescriptor::new(w, h, wgpu::TextureFormat::Bgra8UnormSrgb)
}

#[test]
fn first_frame_always_allocates() {
    assert!(needs_reallocation(None, &desc(1920, 1080)));
}

#[test]
fn identical_descriptor_reuses_target() {
    let current = desc(1920, 1080);
    assert!(!needs_reallocation(Some(&current), &desc(1920, 1080)));
}

#[test]
fn resize_triggers_reallocation() {
    let current = desc(1920, 1080);
    assert!(needs_reallocation(Some(&current), &desc(1280, 720)));
    assert!(needs_reallocation(Some(&current), &desc(1920, 1088)));
}

#[test]
fn format_change_triggers_reallocation() {
    let current = desc(1920, 1080);
    let hdr = TargetDescriptor::new(1920, 1080, wgpu::TextureFormat::Rgba16Float);
    assert!(needs_reallocation(Some(&current), &hdr));
}

// ============================================================================
// WarnLatch
// ============================================================================

#[test]
fn latch_fires_exactly_once() {
    let mut latch = WarnLatch::new();
    assert!(latch.fire());
    assert!(!latch.fire());
    assert!(!latch.fire());
    assert!(latch.has_fired());
}

#[test]
fn latch_rearms_on_reset() {
    // Mask missing for many frames: one warning. Mask returns, then
    // disappears again: exactly one new warning.
    let mut latch = WarnLatch::new();
    let mut warnings = 0;
    for _ in 0..100 {
        if latch.fire() {
            warnings += 1;
        }
    }
    assert_eq!(warnings, 1);

    latch.reset();
    for _ in 0..100 {
        if latch.fire() {
            warnings += 1;
        }
    }
    assert_eq!(warnings, 2);
}
