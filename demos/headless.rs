//! Headless demo: drives the overlay feature for a few frames against an
//! offscreen camera target, exercising the primary material, the missing-mask
//! fallback, and a mid-run resize.
//!
//! Run with `RUST_LOG=debug cargo run --example headless` to watch the
//! pass's decisions.

use anyhow::Context;
use glam::Vec4;

use overpaint::{FrameContext, OverlayFeature, OverlayMaterial, RenderHook, Tracked};

const CAMERA_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .context("no compatible GPU adapter")?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: None,
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::Performance,
        ..Default::default()
    }))
    .context("device creation failed")?;

    // Offscreen stand-in for the camera color target
    let camera = create_camera_target(&device, 640, 480);
    let camera_view = Tracked::new(camera.create_view(&wgpu::TextureViewDescriptor::default()));

    // Primary material: terracotta paint over a solid pattern, masked
    let mut material = OverlayMaterial::standard();
    material.set_tint(Vec4::new(0.89, 0.45, 0.36, 1.0));
    material.set_blend_factor(0.85);
    material.set_main_texture(Some(solid_texture_view(
        &device,
        &queue,
        wgpu::TextureFormat::Rgba8Unorm,
        &[220, 140, 100, 255],
    )));
    material.set_mask_texture(Some(solid_texture_view(
        &device,
        &queue,
        wgpu::TextureFormat::Rgba8Unorm,
        &[255, 255, 255, 255],
    )));

    let mut feature = OverlayFeature::new();
    feature.configure(Some(material), 0.05, true);

    // Frame 1: fully configured primary material
    run_frame(&mut feature, &device, &queue, &camera, &camera_view);

    // Frame 2: mask disappears mid-run; the pass warns once and the
    // translucent fallback takes over
    if let Some(primary) = feature.primary_material_mut() {
        primary.set_mask_texture(None);
    }
    run_frame(&mut feature, &device, &queue, &camera, &camera_view);

    // Frame 3: resize — the scratch target is reallocated to match
    let camera = create_camera_target(&device, 1280, 720);
    let camera_view = Tracked::new(camera.create_view(&wgpu::TextureViewDescriptor::default()));
    run_frame(&mut feature, &device, &queue, &camera, &camera_view);

    feature.dispose();
    println!("three frames recorded; pass state: {:?}", feature.pass().state());
    Ok(())
}

fn run_frame(
    feature: &mut OverlayFeature,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    camera: &wgpu::Texture,
    camera_view: &Tracked<wgpu::TextureView>,
) {
    let ctx = FrameContext {
        device,
        queue,
        source_texture: camera,
        source_view: camera_view,
    };

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("demo frame"),
    });

    feature.on_camera_setup(&ctx);
    feature.execute(&ctx, &mut encoder);
    feature.on_camera_cleanup();

    queue.submit(Some(encoder.finish()));
}

fn create_camera_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("demo camera target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: CAMERA_USAGES,
        view_formats: &[],
    })
}

fn solid_texture_view(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
    rgba: &[u8; 4],
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("demo solid texture"),
        size: wgpu::Extent3d {
            width: 4,
            height: 4,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let mut pixels = [0u8; 4 * 4 * 4];
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.copy_from_slice(rgba);
    }
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
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

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
