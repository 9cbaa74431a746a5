//! Overlay Render Pass
//!
//! Owns the scratch target's lifecycle and records the frame's blit chain.
//! The host pipeline drives [`OverlayPass::on_camera_setup`],
//! [`OverlayPass::execute`] and [`OverlayPass::on_camera_cleanup`] in that
//! order, once per camera per frame, on its rendering thread.
//!
//! Every boundary degrades instead of failing: a setup that cannot allocate
//! leaves the pass unexecutable for the frame, an execute whose material or
//! pipeline is unusable falls back to an identity copy, and an identity copy
//! that itself cannot be recorded falls back to raw texture copies. No error
//! propagates to the host; a frame-render failure would be fatal there.

pub mod blit;
pub mod lifecycle;
pub mod scratch;

pub use blit::{Blitter, OverlayUniforms};
pub use lifecycle::{PassLifecycle, PassState};
pub use scratch::{ScratchTarget, TargetDescriptor, needs_reallocation};

use crate::material::{BLEND_EPSILON, MaterialState, OverlayMaterial, effective_blend};
use crate::settings::OverlaySettings;
use crate::utils::{Tracked, WarnLatch};

/// Per-frame inputs handed to the pass by the host.
///
/// `source_view` should be wrapped in [`Tracked`] once and reused while the
/// underlying target is alive; a fresh wrap per frame works too, it just
/// defeats bind-group caching.
pub struct FrameContext<'a> {
    /// Device for (re)creating pipelines and the scratch target.
    pub device: &'a wgpu::Device,
    /// Queue for uniform and placeholder uploads.
    pub queue: &'a wgpu::Queue,
    /// The camera's current color target.
    pub source_texture: &'a wgpu::Texture,
    /// Default view of `source_texture`.
    pub source_view: &'a Tracked<wgpu::TextureView>,
}

impl FrameContext<'_> {
    /// Descriptor of the camera target: its size and format, zero depth
    /// bits, no multisampling.
    #[must_use]
    pub fn target_descriptor(&self) -> TargetDescriptor {
        TargetDescriptor::of_texture(self.source_texture)
    }
}

/// The compositing render pass.
pub struct OverlayPass {
    lifecycle: PassLifecycle,
    scratch: Option<ScratchTarget>,
    blitter: Option<Blitter>,

    alloc_warned: WarnLatch,
    execute_warned: WarnLatch,
    blit_warned: WarnLatch,
}

impl Default for OverlayPass {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPass {
    /// Creates the pass. No GPU resources exist yet: the blitter is built at
    /// the first camera setup and the scratch target whenever the camera
    /// descriptor changes, so construction needs no device.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lifecycle: PassLifecycle::new(),
            scratch: None,
            blitter: None,
            alloc_warned: WarnLatch::new(),
            execute_warned: WarnLatch::new(),
            blit_warned: WarnLatch::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PassState {
        self.lifecycle.state()
    }

    /// Descriptor of the live scratch target, if one is allocated.
    #[must_use]
    pub fn scratch_descriptor(&self) -> Option<&TargetDescriptor> {
        self.scratch.as_ref().map(ScratchTarget::descriptor)
    }

    /// Why this frame's execute would be skipped, if it would be.
    ///
    /// All skip conditions share one warn-once latch in [`execute`](Self::execute);
    /// the latch re-arms only when a frame actually composites, so a
    /// persistent condition logs once no matter which gate it trips.
    #[must_use]
    pub fn skip_reason(&self, has_material: bool) -> Option<&'static str> {
        if !self.lifecycle.can_execute() {
            return Some("setup incomplete");
        }
        if self.scratch.is_none() {
            return Some("no scratch target");
        }
        if self.blitter.is_none() {
            return Some("gpu resources not initialized");
        }
        if !has_material {
            return Some("no material selected");
        }
        None
    }

    /// Camera setup: (re)allocate the scratch target if the camera target's
    /// descriptor changed since last frame.
    ///
    /// On allocation failure one alternate construction strategy is tried;
    /// if that also fails the pass stays in [`PassState::SetupPending`] and
    /// this frame's execute no-ops. Allocation failure never panics.
    pub fn on_camera_setup(&mut self, device: &wgpu::Device, desc: &TargetDescriptor) {
        self.lifecycle.begin_setup();
        if self.lifecycle.is_disposed() {
            return;
        }

        if self.blitter.is_none() {
            self.blitter = Some(Blitter::new(device));
        }

        if needs_reallocation(self.scratch_descriptor(), desc) {
            let allocated = ScratchTarget::allocate(device, desc).or_else(|err| {
                log::debug!("scratch allocation failed ({err}), trying direct path");
                ScratchTarget::allocate_direct(device, desc)
            });
            match allocated {
                Ok(target) => {
                    self.scratch = Some(target);
                    self.alloc_warned.reset();
                }
                Err(err) => {
                    self.scratch = None;
                    if self.alloc_warned.fire() {
                        log::warn!("overlay pass disabled for this frame: {err}");
                    }
                    return;
                }
            }
        }

        if self.scratch.is_some() {
            self.lifecycle.finish_setup();
        }
    }

    /// Records this frame's composite.
    ///
    /// Re-reads the material's current properties (the upstream controller
    /// may have mutated them earlier in the frame). With no usable material,
    /// or a blend factor below [`BLEND_EPSILON`], the camera image passes
    /// through unmodified.
    pub fn execute(
        &mut self,
        frame: &FrameContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        material: Option<&OverlayMaterial>,
        settings: &OverlaySettings,
    ) {
        if let Some(reason) = self.skip_reason(material.is_some()) {
            if self.execute_warned.fire() {
                log::warn!("overlay execute skipped: {reason}");
            }
            return;
        }
        self.execute_warned.reset();

        let (Some(scratch), Some(blitter), Some(material)) =
            (self.scratch.as_ref(), self.blitter.as_mut(), material)
        else {
            return;
        };

        let state = MaterialState::capture(material);
        let effective = effective_blend(
            state.blend_factor,
            state.has_mask_texture,
            settings.min_transparency(),
        );
        let skip_effect = effective <= BLEND_EPSILON;

        blitter.write_uniforms(
            frame.queue,
            &OverlayUniforms::new(
                material.tint(),
                effective,
                state.uses_mask && state.has_mask_texture,
            ),
        );

        let outcome = if skip_effect {
            blitter.identity_chain(frame.device, encoder, frame.source_view, scratch)
        } else if material.is_translucent() {
            blitter.translucent_draw(
                frame.device,
                encoder,
                frame.source_view,
                scratch.descriptor().format,
                material,
            )
        } else {
            blitter.effect_chain(
                frame.device,
                frame.queue,
                encoder,
                frame.source_view,
                scratch,
                material,
            )
        };

        if let Err(err) = outcome {
            if self.blit_warned.fire() {
                log::warn!("overlay composite failed, passing frame through: {err}");
            }
            if let Err(copy_err) =
                blitter.identity_chain(frame.device, encoder, frame.source_view, scratch)
            {
                log::debug!("identity copy failed ({copy_err}), trying raw copy");
                if let Err(raw_err) = blitter.raw_identity(encoder, frame.source_texture, scratch)
                {
                    // Last level exhausted; the frame renders without the
                    // effect via the host's own path.
                    log::debug!("raw copy unavailable ({raw_err}); frame skipped");
                }
            }
        } else {
            self.blit_warned.reset();
        }

        self.lifecycle.mark_executed();
    }

    /// Camera teardown: drops readiness until the next setup. The scratch
    /// target is kept; only a descriptor change reallocates it.
    pub fn on_camera_cleanup(&mut self) {
        self.lifecycle.cleanup();
    }

    /// Releases the scratch target and the blitter. Idempotent: the release
    /// (and its log line) happens exactly once, no matter how often this is
    /// called.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            self.scratch = None;
            self.blitter = None;
            log::debug!("overlay pass disposed, gpu resources released");
        }
    }
}

// Backstop if explicit disposal was skipped.
impl Drop for OverlayPass {
    fn drop(&mut self) {
        self.dispose();
    }
}
