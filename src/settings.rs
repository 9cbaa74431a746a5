//! Overlay Pass Configuration
//!
//! Pure data, no GPU state. The owning [`OverlayFeature`](crate::OverlayFeature)
//! reads these settings once per frame when deciding which material drives the
//! composite.

/// User-facing settings for the overlay composite.
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    /// Master switch. When `false`, evaluation always selects nothing and the
    /// frame renders untouched (silently — this is an intentional skip, not
    /// a degraded one).
    pub enabled: bool,

    /// Whether the translucent placeholder material may stand in for an
    /// unusable primary material.
    pub fallback_enabled: bool,

    /// Minimum fraction of the camera feed that must remain visible when no
    /// segmentation mask is bound. Kept in `[0, 1]` by the setter.
    min_transparency: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_enabled: true,
            min_transparency: 0.05,
        }
    }
}

impl OverlaySettings {
    /// Creates settings with default values (enabled, fallback on, 5% floor).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the minimum-transparency floor.
    #[inline]
    #[must_use]
    pub fn min_transparency(&self) -> f32 {
        self.min_transparency
    }

    /// Sets the minimum-transparency floor, clamped to `[0, 1]`.
    ///
    /// Without a mask the composite's effective blend factor is capped at
    /// `1 - min_transparency`, so a full-screen opaque overlay can never
    /// hide the camera feed.
    pub fn set_min_transparency(&mut self, value: f32) {
        self.min_transparency = value.clamp(0.0, 1.0);
    }
}
