//! Overlay Materials
//!
//! An [`OverlayMaterial`] bundles a shader, a tint, a blend factor and two
//! optional texture slots: the *main* texture (the paint pattern) and the
//! *mask* texture (a per-pixel wall/non-wall classification produced by an
//! external inference component, consumed here as an opaque single-channel
//! texture).
//!
//! The upstream effect controller mutates the material between frames
//! (blend factor, freshly inferred mask), so the pass never caches material
//! properties across frames — it captures a [`MaterialState`] snapshot at
//! evaluate time and again at execute time.

use std::borrow::Cow;

use glam::Vec4;

use crate::utils::Tracked;

/// Blend factors below this are treated as "fully transparent, nothing to
/// draw" and the composite degrades to an identity copy.
pub const BLEND_EPSILON: f32 = 1e-3;

/// Shader driving an overlay composite.
#[derive(Debug, Clone)]
pub enum OverlayShader {
    /// Built-in masked tint shader (`shaders/overlay.wgsl`).
    Standard,
    /// Caller- or fallback-provided WGSL.
    Custom {
        /// Logical name, used for pipeline caching and diagnostics.
        name: &'static str,
        /// WGSL source.
        source: Cow<'static, str>,
    },
}

impl OverlayShader {
    /// Logical shader name (pipeline cache key).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "overlay/standard",
            Self::Custom { name, .. } => name,
        }
    }

    /// WGSL source text.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Standard => include_str!("shaders/overlay.wgsl"),
            Self::Custom { source, .. } => source,
        }
    }
}

/// A compositing material: shader + tunables + texture slots.
#[derive(Debug)]
pub struct OverlayMaterial {
    shader: OverlayShader,
    tint: Vec4,
    blend_factor: f32,
    uses_mask: bool,
    translucent: bool,
    main_texture: Option<Tracked<wgpu::TextureView>>,
    mask_texture: Option<Tracked<wgpu::TextureView>>,
}

impl OverlayMaterial {
    /// The standard masked paint material: samples the camera feed, the main
    /// texture and the segmentation mask, and mixes in the shader.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            shader: OverlayShader::Standard,
            tint: Vec4::ONE,
            blend_factor: 1.0,
            uses_mask: true,
            translucent: false,
            main_texture: None,
            mask_texture: None,
        }
    }

    /// A translucent material that alpha-blends its tint directly over the
    /// camera target without sampling any texture. Used by the fallback
    /// builder; also handy for diagnostic washes.
    #[must_use]
    pub fn translucent(shader: OverlayShader, tint: Vec4, blend_factor: f32) -> Self {
        Self {
            shader,
            tint,
            blend_factor: blend_factor.clamp(0.0, 1.0),
            uses_mask: false,
            translucent: true,
            main_texture: None,
            mask_texture: None,
        }
    }

    /// The shader this material renders with.
    #[must_use]
    pub fn shader(&self) -> &OverlayShader {
        &self.shader
    }

    /// Paint tint (linear RGBA).
    #[must_use]
    pub fn tint(&self) -> Vec4 {
        self.tint
    }

    /// Sets the paint tint.
    pub fn set_tint(&mut self, tint: Vec4) {
        self.tint = tint;
    }

    /// Requested blend factor in `[0, 1]`.
    #[must_use]
    pub fn blend_factor(&self) -> f32 {
        self.blend_factor
    }

    /// Sets the requested blend factor, clamped to `[0, 1]`.
    pub fn set_blend_factor(&mut self, factor: f32) {
        self.blend_factor = factor.clamp(0.0, 1.0);
    }

    /// Whether this material declares segmentation-mask usage.
    #[must_use]
    pub fn uses_mask(&self) -> bool {
        self.uses_mask
    }

    /// Declares (or retracts) segmentation-mask usage.
    pub fn set_uses_mask(&mut self, uses_mask: bool) {
        self.uses_mask = uses_mask;
    }

    /// Whether this material alpha-blends directly over the target instead
    /// of going through the two-stage scratch composite.
    #[must_use]
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    /// Binds or clears the main (paint pattern) texture.
    pub fn set_main_texture(&mut self, view: Option<wgpu::TextureView>) {
        self.main_texture = view.map(Tracked::new);
    }

    /// Binds or clears the segmentation mask texture.
    pub fn set_mask_texture(&mut self, view: Option<wgpu::TextureView>) {
        self.mask_texture = view.map(Tracked::new);
    }

    /// Main texture view, if bound.
    #[must_use]
    pub fn main_texture(&self) -> Option<&Tracked<wgpu::TextureView>> {
        self.main_texture.as_ref()
    }

    /// Mask texture view, if bound.
    #[must_use]
    pub fn mask_texture(&self) -> Option<&Tracked<wgpu::TextureView>> {
        self.mask_texture.as_ref()
    }
}

// ─── Readiness Snapshot ───────────────────────────────────────────────────────

/// Derived readiness snapshot of a material, recomputed every frame.
///
/// Captured twice per frame: at evaluate time (material selection) and at
/// execute time (the controller may have mutated the material in between).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    /// Whether a main texture is bound.
    pub has_main_texture: bool,
    /// Whether a mask texture is bound.
    pub has_mask_texture: bool,
    /// Whether the material declares mask usage.
    pub uses_mask: bool,
    /// Current requested blend factor.
    pub blend_factor: f32,
}

impl MaterialState {
    /// Snapshots the current state of a material.
    #[must_use]
    pub fn capture(material: &OverlayMaterial) -> Self {
        Self {
            has_main_texture: material.main_texture.is_some(),
            has_mask_texture: material.mask_texture.is_some(),
            uses_mask: material.uses_mask,
            blend_factor: material.blend_factor,
        }
    }

    /// Whether the material qualifies as the frame's primary: it must have a
    /// main texture, and a mask texture if it declares mask usage.
    #[must_use]
    pub fn primary_eligible(&self) -> bool {
        self.has_main_texture && (!self.uses_mask || self.has_mask_texture)
    }
}

// ─── Per-Frame Selection ──────────────────────────────────────────────────────

/// Which material drives a given frame's composite.
///
/// At most one material is active per frame — primary or fallback, never
/// both. If neither is usable the pass is skipped entirely (no partial
/// composite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSelection {
    /// The user-configured primary material.
    Primary,
    /// The translucent placeholder material.
    Fallback,
    /// Nothing usable; the frame renders untouched.
    Skip,
}

/// Decides which material is eligible for the frame.
///
/// `primary` is `None` when no primary material is configured.
#[must_use]
pub fn select_material(
    primary: Option<MaterialState>,
    fallback_enabled: bool,
    fallback_available: bool,
) -> MaterialSelection {
    if primary.is_some_and(|state| state.primary_eligible()) {
        return MaterialSelection::Primary;
    }
    if fallback_enabled && fallback_available {
        return MaterialSelection::Fallback;
    }
    MaterialSelection::Skip
}

/// Computes the blend factor actually applied this frame.
///
/// Without a mask the overlay would cover the whole screen uniformly, so the
/// factor is capped at `1 - min_transparency`: the camera feed can never be
/// fully painted over by an unmasked material.
#[must_use]
pub fn effective_blend(requested: f32, has_mask: bool, min_transparency: f32) -> f32 {
    let requested = requested.clamp(0.0, 1.0);
    if has_mask {
        requested
    } else {
        requested.min(1.0 - min_transparency.clamp(0.0, 1.0))
    }
}
