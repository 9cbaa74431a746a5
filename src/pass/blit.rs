//! Blit Recording
//!
//! Owns the GPU-side machinery of the composite: pipelines (cached per
//! shader and target format), bind groups (cached by resource identity), the
//! shared uniform buffer, the linear sampler and the synthesized 4×4 white
//! placeholder texture.
//!
//! Three recording entry points mirror the pass's degradation ladder:
//!
//! 1. [`Blitter::effect_chain`] / [`Blitter::translucent_draw`] — the real
//!    composite.
//! 2. [`Blitter::identity_chain`] — pass-through copy (source → scratch →
//!    source), used when the effect is skipped or its pipeline is unusable.
//! 3. [`Blitter::raw_identity`] — encoder-level `copy_texture_to_texture`,
//!    the last resort when even the copy pipeline cannot be built.

use rustc_hash::FxHashMap;

use glam::Vec4;

use crate::errors::{OverpaintError, Result};
use crate::fallback::validate_wgsl;
use crate::material::{OverlayMaterial, OverlayShader};
use crate::pass::scratch::ScratchTarget;
use crate::utils::Tracked;

/// Bind-group caches are cleared once they grow past this; steady state is
/// one or two entries, growth only happens when the host rotates source
/// views (e.g. a swapchain), and a periodic clear keeps that bounded.
const BIND_GROUP_CACHE_CAP: usize = 8;

/// Uniform block shared by every overlay shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniforms {
    /// Paint tint (linear RGBA).
    pub tint: [f32; 4],
    /// Effective blend factor for this frame (already clamped).
    pub blend_factor: f32,
    /// 1 when a mask texture is bound and declared, 0 otherwise.
    pub use_mask: u32,
    /// Std140 padding.
    pub _pad: [u32; 2],
}

impl OverlayUniforms {
    /// Packs the per-frame uniform block.
    #[must_use]
    pub fn new(tint: Vec4, blend_factor: f32, use_mask: bool) -> Self {
        Self {
            tint: tint.to_array(),
            blend_factor,
            use_mask: u32::from(use_mask),
            _pad: [0; 2],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    /// Samples source/main/mask, writes the mixed result. REPLACE blend.
    Effect,
    /// Uniform-only tint draw over the live target. Alpha blend.
    Translucent,
    /// Plain copy. REPLACE blend.
    Copy,
}

/// Records the composite's draw and copy commands.
pub struct Blitter {
    sampler: Tracked<wgpu::Sampler>,
    uniforms: wgpu::Buffer,

    effect_layout: Tracked<wgpu::BindGroupLayout>,
    translucent_layout: Tracked<wgpu::BindGroupLayout>,
    copy_layout: Tracked<wgpu::BindGroupLayout>,
    translucent_bind_group: wgpu::BindGroup,

    /// Pipelines keyed by (shader name, target format).
    pipelines: FxHashMap<(&'static str, wgpu::TextureFormat), wgpu::RenderPipeline>,
    /// Copy bind groups keyed by source view id.
    copy_bind_groups: FxHashMap<u64, wgpu::BindGroup>,
    /// Effect bind groups keyed by (source, main, mask) view ids.
    effect_bind_groups: FxHashMap<(u64, u64, u64), wgpu::BindGroup>,

    /// Lazily synthesized 4×4 opaque white texture, bound wherever a main or
    /// mask texture is missing so sampling never reads garbage.
    placeholder: Option<(wgpu::Texture, Tracked<wgpu::TextureView>)>,
}

impl Blitter {
    /// Creates the blitter's persistent GPU resources. No pipelines are
    /// compiled here; they are built lazily per (shader, format).
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("overpaint sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overpaint uniforms"),
            size: std::mem::size_of::<OverlayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let effect_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overpaint effect layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                texture_entry(3),
                uniform_entry(4),
            ],
        });

        let translucent_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("overpaint translucent layout"),
                entries: &[uniform_entry(0)],
            });

        let copy_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overpaint copy layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let translucent_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overpaint translucent bindgroup"),
            layout: &translucent_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        Self {
            sampler: Tracked::new(sampler),
            uniforms,
            effect_layout: Tracked::new(effect_layout),
            translucent_layout: Tracked::new(translucent_layout),
            copy_layout: Tracked::new(copy_layout),
            translucent_bind_group,
            pipelines: FxHashMap::default(),
            copy_bind_groups: FxHashMap::default(),
            effect_bind_groups: FxHashMap::default(),
            placeholder: None,
        }
    }

    /// Uploads the frame's uniform block.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &OverlayUniforms) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));
    }

    // ── Recording entry points ─────────────────────────────────────────────

    /// Two-stage composite: source → scratch with the material's shader,
    /// then scratch → source plain copy.
    pub fn effect_chain(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source_view: &Tracked<wgpu::TextureView>,
        scratch: &ScratchTarget,
        material: &OverlayMaterial,
    ) -> Result<()> {
        let format = scratch.descriptor().format;
        let pipeline =
            self.get_or_create_pipeline(device, material.shader(), format, PipelineKind::Effect)?;

        self.ensure_placeholder(device, queue);
        let placeholder_view = match self.placeholder.as_ref() {
            Some((_, view)) => view.clone(),
            None => return Err(OverpaintError::MissingResource("placeholder texture")),
        };
        let main_view = material
            .main_texture()
            .cloned()
            .unwrap_or_else(|| placeholder_view.clone());
        let mask_view = material.mask_texture().cloned().unwrap_or(placeholder_view);

        let key = (source_view.id(), main_view.id(), mask_view.id());
        let bind_group = if let Some(cached) = self.effect_bind_groups.get(&key) {
            cached.clone()
        } else {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("overpaint effect bindgroup"),
                layout: &self.effect_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&main_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(&mask_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: self.uniforms.as_entire_binding(),
                    },
                ],
            });
            if self.effect_bind_groups.len() >= BIND_GROUP_CACHE_CAP {
                self.effect_bind_groups.clear();
            }
            self.effect_bind_groups.insert(key, bind_group.clone());
            bind_group
        };

        Self::fullscreen_draw(
            encoder,
            "overpaint effect",
            scratch.view(),
            &pipeline,
            &bind_group,
        );
        self.copy_draw(device, encoder, scratch.view(), source_view, format)
    }

    /// Single alpha-blended tint draw over the live target. Used by
    /// translucent (fallback) materials; samples no textures.
    pub fn translucent_draw(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        target_view: &Tracked<wgpu::TextureView>,
        format: wgpu::TextureFormat,
        material: &OverlayMaterial,
    ) -> Result<()> {
        let pipeline = self.get_or_create_pipeline(
            device,
            material.shader(),
            format,
            PipelineKind::Translucent,
        )?;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overpaint translucent"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &self.translucent_bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    /// Identity pass-through: source → scratch → source, both plain copies.
    /// The camera image is left visually unchanged.
    pub fn identity_chain(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source_view: &Tracked<wgpu::TextureView>,
        scratch: &ScratchTarget,
    ) -> Result<()> {
        let format = scratch.descriptor().format;
        self.copy_draw(device, encoder, source_view, scratch.view(), format)?;
        self.copy_draw(device, encoder, scratch.view(), source_view, format)
    }

    /// Encoder-level identity: round-trips the camera target through the
    /// scratch texture with raw copies. Requires matching formats and copy
    /// usages on both textures.
    pub fn raw_identity(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::Texture,
        scratch: &ScratchTarget,
    ) -> Result<()> {
        let scratch_tex = scratch.texture();
        if source.format() != scratch_tex.format() {
            return Err(OverpaintError::CopyUnsupported(format!(
                "format mismatch: {:?} vs {:?}",
                source.format(),
                scratch_tex.format()
            )));
        }
        if source.width() != scratch_tex.width() || source.height() != scratch_tex.height() {
            return Err(OverpaintError::CopyUnsupported("size mismatch".into()));
        }
        let copyable = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
        if !source.usage().contains(copyable) || !scratch_tex.usage().contains(copyable) {
            return Err(OverpaintError::CopyUnsupported(
                "missing COPY_SRC/COPY_DST usage".into(),
            ));
        }

        let extent = wgpu::Extent3d {
            width: source.width(),
            height: source.height(),
            depth_or_array_layers: 1,
        };
        encoder.copy_texture_to_texture(
            Self::copy_info(source),
            Self::copy_info(scratch_tex),
            extent,
        );
        encoder.copy_texture_to_texture(
            Self::copy_info(scratch_tex),
            Self::copy_info(source),
            extent,
        );
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn copy_info(texture: &wgpu::Texture) -> wgpu::TexelCopyTextureInfo<'_> {
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        }
    }

    fn copy_draw(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        src: &Tracked<wgpu::TextureView>,
        dst: &Tracked<wgpu::TextureView>,
        format: wgpu::TextureFormat,
    ) -> Result<()> {
        let pipeline = self.get_or_create_pipeline(
            device,
            &OverlayShader::Custom {
                name: "blit/copy",
                source: include_str!("../shaders/blit.wgsl").into(),
            },
            format,
            PipelineKind::Copy,
        )?;

        let bind_group = if let Some(cached) = self.copy_bind_groups.get(&src.id()) {
            cached.clone()
        } else {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("overpaint copy bindgroup"),
                layout: &self.copy_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(src),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            if self.copy_bind_groups.len() >= BIND_GROUP_CACHE_CAP {
                self.copy_bind_groups.clear();
            }
            self.copy_bind_groups.insert(src.id(), bind_group.clone());
            bind_group
        };

        Self::fullscreen_draw(encoder, "overpaint copy", dst, &pipeline, &bind_group);
        Ok(())
    }

    fn fullscreen_draw(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &Tracked<wgpu::TextureView>,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn get_or_create_pipeline(
        &mut self,
        device: &wgpu::Device,
        shader: &OverlayShader,
        format: wgpu::TextureFormat,
        kind: PipelineKind,
    ) -> Result<wgpu::RenderPipeline> {
        let cache_key = (shader.name(), format);
        if let Some(pipeline) = self.pipelines.get(&cache_key) {
            return Ok(pipeline.clone());
        }

        // Vet the WGSL on the CPU so a broken shader surfaces as a Result
        // here instead of a device error mid-frame.
        validate_wgsl(shader.name(), shader.source())?;

        log::debug!(
            "compiling overlay pipeline for shader '{}', format {format:?}",
            shader.name(),
        );

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.name()),
            source: wgpu::ShaderSource::Wgsl(shader.source().into()),
        });

        let layout: &wgpu::BindGroupLayout = match kind {
            PipelineKind::Effect => &self.effect_layout,
            PipelineKind::Translucent => &self.translucent_layout,
            PipelineKind::Copy => &self.copy_layout,
        };
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overpaint pipeline layout"),
            bind_group_layouts: &[Some(layout)],
            immediate_size: 0,
        });

        // Translucent materials blend over the live target; depth is never
        // written (there is no depth attachment at all).
        let blend = match kind {
            PipelineKind::Translucent => wgpu::BlendState::ALPHA_BLENDING,
            PipelineKind::Effect | PipelineKind::Copy => wgpu::BlendState::REPLACE,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(cache_key, pipeline.clone());
        Ok(pipeline)
    }

    fn ensure_placeholder(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.placeholder.is_some() {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("overpaint white placeholder"),
            size: wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // 4x4 RGBA8, opaque white
        let pixels = [0xFFu8; 4 * 4 * 4];
        queue.write_texture(
            Self::copy_info(&texture),
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16),
                rows_per_image: Some(4),
            },
            wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
        );

        let view = Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.placeholder = Some((texture, view));
    }
}
