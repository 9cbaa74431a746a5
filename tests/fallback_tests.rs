//! Fallback Material Builder Tests
//!
//! The builder's candidate resolution is pure CPU work (naga parse +
//! validate), so it is fully testable without a GPU adapter.

use overpaint::fallback::{FallbackBuilder, validate_wgsl};
use overpaint::{OverpaintError, OverlayShader};

const VALID_SHADER: &str = "\
@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 1.0, 0.2);
}
";

// ============================================================================
// validate_wgsl
// ============================================================================

#[test]
fn valid_wgsl_passes() {
    assert!(validate_wgsl("test/valid", VALID_SHADER).is_ok());
}

#[test]
fn garbage_wgsl_is_rejected_with_shader_name() {
    let err = validate_wgsl("test/garbage", "this is not wgsl").unwrap_err();
    match err {
        OverpaintError::ShaderInvalid { name, .. } => assert_eq!(name, "test/garbage"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn type_error_fails_validation_not_parsing() {
    // Parses fine, but the fragment return type is wrong
    let source = "\
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return 1.0;
}
";
    assert!(validate_wgsl("test/type_error", source).is_err());
}

// ============================================================================
// Candidate resolution
// ============================================================================

#[test]
fn first_valid_skips_broken_candidates() {
    let chosen = FallbackBuilder::first_valid(&[
        ("bad/one", "not wgsl at all"),
        ("good/one", VALID_SHADER),
        ("good/two", VALID_SHADER),
    ]);
    assert_eq!(chosen.map(|(name, _)| name), Some("good/one"));
}

#[test]
fn first_valid_returns_none_when_all_fail() {
    let chosen = FallbackBuilder::first_valid(&[("bad/one", "x"), ("bad/two", "y")]);
    assert!(chosen.is_none());
}

// ============================================================================
// FallbackBuilder
// ============================================================================

#[test]
fn builder_produces_translucent_material() {
    let mut builder = FallbackBuilder::new();
    let material = builder.get_or_build().expect("built-in candidates must validate");

    assert!(material.is_translucent());
    assert!(!material.uses_mask());
    // Soft pink, mostly transparent
    assert!(material.tint().w <= 0.25);
    assert!(material.blend_factor() > 0.0);
}

#[test]
fn builder_prefers_the_soft_tint_candidate() {
    let mut builder = FallbackBuilder::new();
    let material = builder.get_or_build().unwrap();
    assert_eq!(material.shader().name(), "fallback/soft_tint");
}

#[test]
fn builder_caches_until_invalidated() {
    let mut builder = FallbackBuilder::new();
    assert!(builder.get().is_none(), "nothing built before first use");

    builder.get_or_build().unwrap();
    assert!(builder.get().is_some(), "cached after first build");

    builder.invalidate();
    assert!(builder.get().is_none(), "invalidate drops the cache");
    assert!(builder.get_or_build().is_some(), "rebuilds on demand");
}

#[test]
fn builtin_shader_sources_validate() {
    // Every shader the crate can feed to wgpu must pass CPU validation
    let standard = OverlayShader::Standard;
    assert!(validate_wgsl(standard.name(), standard.source()).is_ok());
}
