//! Scratch Color Target
//!
//! The composite stages through a temporary color target matching the camera
//! target's size and format (no depth, no MSAA). The target persists across
//! frames; only a descriptor change (resize, format switch) triggers a
//! reallocation, so steady-state rendering allocates nothing.

use crate::errors::{OverpaintError, Result};
use crate::utils::Tracked;

/// Usages for the normal allocation path: render into it, sample it for the
/// restore blit, and copy either way for the raw-copy fallback.
const SCRATCH_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

/// Usages for the last-resort allocation path. Dropping the copy usages
/// keeps the target renderable and sampleable, which is all the two-stage
/// blit strictly needs.
const SCRATCH_USAGES_DIRECT: wgpu::TextureUsages =
    wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::TEXTURE_BINDING);

/// Size/format description of the camera color target, minus depth and
/// multisampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color format of the camera target.
    pub format: wgpu::TextureFormat,
}

impl TargetDescriptor {
    /// Creates a descriptor from explicit values.
    #[must_use]
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Derives a descriptor from an existing texture (the camera target).
    #[must_use]
    pub fn of_texture(texture: &wgpu::Texture) -> Self {
        Self {
            width: texture.width(),
            height: texture.height(),
            format: texture.format(),
        }
    }
}

/// Reallocate only when no target exists or the descriptor changed.
///
/// Factored out of the pass's camera setup so the no-churn policy is a
/// plain function of descriptors.
#[must_use]
pub fn needs_reallocation(
    current: Option<&TargetDescriptor>,
    requested: &TargetDescriptor,
) -> bool {
    current != Some(requested)
}

/// The temporary per-camera color target staging the two-step composite.
#[derive(Debug)]
pub struct ScratchTarget {
    texture: wgpu::Texture,
    view: Tracked<wgpu::TextureView>,
    desc: TargetDescriptor,
}

impl ScratchTarget {
    /// Normal allocation path: validate against device limits, then create
    /// with the full usage set.
    pub fn allocate(device: &wgpu::Device, desc: &TargetDescriptor) -> Result<Self> {
        Self::validate(desc, &device.limits())?;
        Ok(Self::create(device, desc, SCRATCH_USAGES))
    }

    /// Last-resort allocation path: clamp dimensions into device limits and
    /// drop the copy usages. Still fails on a zero-sized request.
    pub fn allocate_direct(device: &wgpu::Device, desc: &TargetDescriptor) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(OverpaintError::AllocationFailed {
                width: desc.width,
                height: desc.height,
                reason: "zero-sized target".into(),
            });
        }
        let max = device.limits().max_texture_dimension_2d;
        let clamped = TargetDescriptor {
            width: desc.width.min(max),
            height: desc.height.min(max),
            format: desc.format,
        };
        Ok(Self::create(device, &clamped, SCRATCH_USAGES_DIRECT))
    }

    fn validate(desc: &TargetDescriptor, limits: &wgpu::Limits) -> Result<()> {
        if desc.width == 0 || desc.height == 0 {
            return Err(OverpaintError::AllocationFailed {
                width: desc.width,
                height: desc.height,
                reason: "zero-sized target".into(),
            });
        }
        let max = limits.max_texture_dimension_2d;
        if desc.width > max || desc.height > max {
            return Err(OverpaintError::AllocationFailed {
                width: desc.width,
                height: desc.height,
                reason: format!("exceeds max_texture_dimension_2d ({max})"),
            });
        }
        Ok(())
    }

    fn create(device: &wgpu::Device, desc: &TargetDescriptor, usage: wgpu::TextureUsages) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("overpaint scratch"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage,
            view_formats: &[],
        });

        let view = Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));

        Self {
            texture,
            view,
            desc: *desc,
        }
    }

    /// The raw texture, for `copy_texture_to_texture` fallbacks.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Default full-texture view.
    #[must_use]
    pub fn view(&self) -> &Tracked<wgpu::TextureView> {
        &self.view
    }

    /// The descriptor this target was allocated with.
    #[must_use]
    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.desc
    }
}
