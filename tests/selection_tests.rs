//! Material Selection and Blend Policy Tests
//!
//! Tests for:
//! - effective_blend: opacity clamp when the mask is absent
//! - select_material: primary/fallback/skip decision table
//! - MaterialState: primary eligibility rules
//! - OverlaySettings: min-transparency clamping
//! - OverlayUniforms: GPU layout size

use overpaint::pass::OverlayUniforms;
use overpaint::{
    BLEND_EPSILON, MaterialSelection, MaterialState, OverlayFeature, OverlayMaterial,
    OverlaySettings, effective_blend, select_material,
};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn state(main: bool, mask: bool, uses_mask: bool, blend: f32) -> MaterialState {
    MaterialState {
        has_main_texture: main,
        has_mask_texture: mask,
        uses_mask,
        blend_factor: blend,
    }
}

// ============================================================================
// effective_blend
// ============================================================================

#[test]
fn blend_passes_through_when_mask_present() {
    assert!(approx(effective_blend(0.7, true, 0.3), 0.7));
    assert!(approx(effective_blend(1.0, true, 0.3), 1.0));
}

#[test]
fn blend_clamped_when_mask_absent() {
    // Requested 1.0 with a 0.3 floor must leave 30% of the feed visible
    assert!(approx(effective_blend(1.0, false, 0.3), 0.7));
    // Below the cap, the request passes through
    assert!(approx(effective_blend(0.5, false, 0.3), 0.5));
}

#[test]
fn blend_clamp_holds_for_all_inputs() {
    // effective <= 1 - min_transparency whenever the mask is absent
    for b in 0..=20 {
        for m in 0..=20 {
            let requested = b as f32 / 20.0;
            let floor = m as f32 / 20.0;
            let effective = effective_blend(requested, false, floor);
            assert!(
                effective <= 1.0 - floor + EPSILON,
                "requested={requested} floor={floor} effective={effective}"
            );
        }
    }
}

#[test]
fn blend_sanitizes_out_of_range_inputs() {
    assert!(approx(effective_blend(3.0, true, 0.0), 1.0));
    assert!(approx(effective_blend(-1.0, true, 0.0), 0.0));
    // An out-of-range floor is clamped before the cap is applied
    assert!(approx(effective_blend(1.0, false, 2.0), 0.0));
}

#[test]
fn epsilon_blend_takes_the_identity_path() {
    // At or below the epsilon the effect is skipped and the frame is an
    // identity copy; the clamp must not push a tiny request above it
    assert!(effective_blend(BLEND_EPSILON, true, 0.0) <= BLEND_EPSILON);
    assert!(effective_blend(0.0, false, 0.05) <= BLEND_EPSILON);
}

// ============================================================================
// select_material
// ============================================================================

#[test]
fn selects_primary_when_fully_ready() {
    let sel = select_material(Some(state(true, true, true, 1.0)), true, true);
    assert_eq!(sel, MaterialSelection::Primary);
}

#[test]
fn primary_without_mask_usage_needs_only_main_texture() {
    let sel = select_material(Some(state(true, false, false, 1.0)), false, false);
    assert_eq!(sel, MaterialSelection::Primary);
}

#[test]
fn no_primary_with_fallback_selects_fallback() {
    // Configure(null, _, fallbackEnabled=true) -> fallback, no skip
    let sel = select_material(None, true, true);
    assert_eq!(sel, MaterialSelection::Fallback);
}

#[test]
fn missing_main_texture_with_fallback_selects_fallback() {
    let sel = select_material(Some(state(false, true, true, 1.0)), true, true);
    assert_eq!(sel, MaterialSelection::Fallback);
}

#[test]
fn mask_declared_but_missing_disqualifies_primary() {
    // Main texture bound, mask declared, mask missing, fallback disabled:
    // nothing is selected and the frame passes through
    let sel = select_material(Some(state(true, false, true, 1.0)), false, false);
    assert_eq!(sel, MaterialSelection::Skip);
}

#[test]
fn fallback_disabled_means_skip() {
    let sel = select_material(None, false, false);
    assert_eq!(sel, MaterialSelection::Skip);
}

#[test]
fn fallback_enabled_but_unbuildable_means_skip() {
    let sel = select_material(None, true, false);
    assert_eq!(sel, MaterialSelection::Skip);
}

// ============================================================================
// MaterialState
// ============================================================================

#[test]
fn eligibility_requires_main_texture() {
    assert!(!state(false, true, true, 1.0).primary_eligible());
    assert!(state(true, true, true, 1.0).primary_eligible());
}

#[test]
fn eligibility_requires_mask_only_when_declared() {
    assert!(!state(true, false, true, 1.0).primary_eligible());
    assert!(state(true, false, false, 1.0).primary_eligible());
}

// ============================================================================
// OverlayFeature evaluation
// ============================================================================

#[test]
fn unconfigured_feature_falls_back_without_panicking() {
    let mut feature = OverlayFeature::new();
    feature.configure(None, 0.05, true);
    assert_eq!(feature.evaluate(), MaterialSelection::Fallback);
}

#[test]
fn disabled_feature_skips_silently() {
    let mut feature = OverlayFeature::new();
    feature.configure(None, 0.05, true);
    feature.settings_mut().enabled = false;
    assert_eq!(feature.evaluate(), MaterialSelection::Skip);
    assert!(
        !feature.skip_warning_active(),
        "an intentional skip is not a warning"
    );
}

#[test]
fn skip_warning_rearms_when_a_material_becomes_usable() {
    let mut feature = OverlayFeature::new();
    feature.configure(None, 0.05, false);

    // No primary, fallback disabled: warn once, then stay quiet
    assert_eq!(feature.evaluate(), MaterialSelection::Skip);
    assert!(feature.skip_warning_active());
    feature.evaluate();
    assert!(feature.skip_warning_active());

    feature.settings_mut().fallback_enabled = true;
    assert_eq!(feature.evaluate(), MaterialSelection::Fallback);
    assert!(
        !feature.skip_warning_active(),
        "a selected material re-arms the skip warning"
    );
}

#[test]
fn mask_warning_fires_once_per_absence_transition() {
    let mut feature = OverlayFeature::new();
    // Standard material declares mask usage but has nothing bound yet
    feature.configure(Some(OverlayMaterial::standard()), 0.05, true);

    feature.evaluate();
    assert!(feature.mask_warning_active());
    feature.evaluate();
    assert!(feature.mask_warning_active(), "latched across frames");

    // Condition clears: the latch re-arms
    feature.primary_material_mut().unwrap().set_uses_mask(false);
    feature.evaluate();
    assert!(!feature.mask_warning_active());

    // A second absence warns again
    feature.primary_material_mut().unwrap().set_uses_mask(true);
    feature.evaluate();
    assert!(feature.mask_warning_active());
}

// ============================================================================
// OverlaySettings
// ============================================================================

#[test]
fn settings_clamp_min_transparency() {
    let mut settings = OverlaySettings::new();
    settings.set_min_transparency(1.5);
    assert!(approx(settings.min_transparency(), 1.0));
    settings.set_min_transparency(-0.5);
    assert!(approx(settings.min_transparency(), 0.0));
    settings.set_min_transparency(0.3);
    assert!(approx(settings.min_transparency(), 0.3));
}

#[test]
fn settings_default_to_enabled_with_fallback() {
    let settings = OverlaySettings::default();
    assert!(settings.enabled);
    assert!(settings.fallback_enabled);
    assert!(settings.min_transparency() > 0.0);
}

// ============================================================================
// OverlayUniforms
// ============================================================================

#[test]
fn uniform_block_is_32_bytes() {
    // vec4 tint + f32 + u32 + 2x u32 padding
    assert_eq!(std::mem::size_of::<OverlayUniforms>(), 32);
}

#[test]
fn uniform_block_packs_current_values() {
    let u = OverlayUniforms::new(glam::Vec4::new(1.0, 0.5, 0.25, 0.2), 0.6, true);
    assert!(approx(u.tint[1], 0.5));
    assert!(approx(u.blend_factor, 0.6));
    assert_eq!(u.use_mask, 1);
}
