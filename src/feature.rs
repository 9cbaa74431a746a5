//! Pass Configuration Owner
//!
//! [`OverlayFeature`] is the host-facing entry point: it holds the
//! user-editable primary material and settings, owns the pass instance, and
//! decides once per frame which material — primary or fallback — is eligible
//! to drive the composite. If neither is usable, the frame's pass is skipped
//! entirely (never a partial composite), with a warn-once log.

use crate::fallback::FallbackBuilder;
use crate::material::{MaterialSelection, MaterialState, OverlayMaterial, select_material};
use crate::pass::{FrameContext, OverlayPass};
use crate::settings::OverlaySettings;
use crate::utils::WarnLatch;

/// The three per-frame injection points a host pipeline drives, in order.
///
/// All three run serially on the host's rendering thread, once per camera
/// per frame. None of them can fail; degraded frames render as pass-through.
pub trait RenderHook {
    /// Invoked at camera setup, before any commands are recorded.
    fn on_camera_setup(&mut self, ctx: &FrameContext<'_>);

    /// Invoked to append this pass's commands to the frame's stream.
    fn execute(&mut self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder);

    /// Invoked at end of camera rendering.
    fn on_camera_cleanup(&mut self);
}

/// Owns the overlay configuration and the pass it drives.
pub struct OverlayFeature {
    settings: OverlaySettings,
    primary: Option<OverlayMaterial>,
    fallback: FallbackBuilder,
    pass: OverlayPass,

    /// Fires once per missing-mask transition.
    mask_warned: WarnLatch,
    /// Fires once per skipped-frame transition.
    skip_warned: WarnLatch,

    /// This frame's selection, decided at setup and consumed at execute.
    selection: MaterialSelection,
}

impl Default for OverlayFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayFeature {
    /// Creates the feature with default settings and no primary material.
    /// No GPU resources are created until the first camera setup.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: OverlaySettings::default(),
            primary: None,
            fallback: FallbackBuilder::new(),
            pass: OverlayPass::new(),
            mask_warned: WarnLatch::new(),
            skip_warned: WarnLatch::new(),
            selection: MaterialSelection::Skip,
        }
    }

    /// Replaces the primary material and tunables in one call.
    ///
    /// `None` is legal — the primary simply becomes ineligible and the
    /// fallback (if enabled) takes over. Re-verification latches reset so
    /// the next frame re-checks texture presence and may warn again.
    pub fn configure(
        &mut self,
        material: Option<OverlayMaterial>,
        min_transparency: f32,
        fallback_enabled: bool,
    ) {
        self.primary = material;
        self.settings.set_min_transparency(min_transparency);
        self.settings.fallback_enabled = fallback_enabled;
        self.mask_warned.reset();
        self.skip_warned.reset();
        self.selection = MaterialSelection::Skip;
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Mutable settings access (the setters keep values in range).
    pub fn settings_mut(&mut self) -> &mut OverlaySettings {
        &mut self.settings
    }

    /// The primary material, if configured. The upstream effect controller
    /// uses this to push per-frame updates (blend factor, fresh mask).
    pub fn primary_material_mut(&mut self) -> Option<&mut OverlayMaterial> {
        self.primary.as_mut()
    }

    /// The owned pass, for state inspection.
    #[must_use]
    pub fn pass(&self) -> &OverlayPass {
        &self.pass
    }

    /// Whether the missing-mask warning has fired for the current absence.
    /// Re-arms (returns `false` again) once the condition clears.
    #[must_use]
    pub fn mask_warning_active(&self) -> bool {
        self.mask_warned.has_fired()
    }

    /// Whether the skipped-frame warning has fired for the current skip
    /// streak. Re-arms once a material is selected again.
    #[must_use]
    pub fn skip_warning_active(&self) -> bool {
        self.skip_warned.has_fired()
    }

    /// Decides which material drives this frame's composite.
    ///
    /// The primary qualifies when its main texture is bound and, if it
    /// declares mask usage, a mask texture is bound too. Otherwise the
    /// fallback steps in when enabled and buildable; otherwise the frame is
    /// skipped. Warnings fire once per transition, not per frame.
    pub fn evaluate(&mut self) -> MaterialSelection {
        if !self.settings.enabled {
            return MaterialSelection::Skip;
        }

        let state = self.primary.as_ref().map(MaterialState::capture);

        if let Some(state) = state {
            if state.uses_mask && !state.has_mask_texture {
                if self.mask_warned.fire() {
                    log::warn!("overlay primary material has no segmentation mask bound");
                }
            } else {
                self.mask_warned.reset();
            }
        }

        let fallback_available =
            self.settings.fallback_enabled && self.fallback.get_or_build().is_some();
        let selection = select_material(state, self.settings.fallback_enabled, fallback_available);

        if selection == MaterialSelection::Skip {
            if self.skip_warned.fire() {
                log::warn!("no usable overlay material; pass skipped");
            }
        } else {
            self.skip_warned.reset();
        }

        selection
    }

    /// Releases pass resources. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.pass.dispose();
    }
}

impl RenderHook for OverlayFeature {
    fn on_camera_setup(&mut self, ctx: &FrameContext<'_>) {
        self.selection = self.evaluate();
        if self.selection == MaterialSelection::Skip {
            // Nothing to enqueue; the pass stays out of this frame entirely.
            return;
        }
        self.pass
            .on_camera_setup(ctx.device, &ctx.target_descriptor());
    }

    fn execute(&mut self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder) {
        let material = match self.selection {
            MaterialSelection::Primary => self.primary.as_ref(),
            MaterialSelection::Fallback => self.fallback.get(),
            MaterialSelection::Skip => return,
        };
        self.pass.execute(ctx, encoder, material, &self.settings);
    }

    fn on_camera_cleanup(&mut self) {
        self.pass.on_camera_cleanup();
        self.selection = MaterialSelection::Skip;
    }
}
