//! Fallback Material Builder
//!
//! Produces a renderable placeholder material without depending on the
//! primary shader or its textures. Candidates are tried in priority order;
//! each one's WGSL is parsed and validated on the CPU (naga) before it is
//! accepted, so a bad candidate is skipped instead of tripping a GPU
//! validation error mid-frame. A trivially simple "error shader" is the last
//! resort, so in practice the builder never comes up empty.
//!
//! The result is built once and cached for the feature's lifetime;
//! [`FallbackBuilder::invalidate`] forces a rebuild.

use glam::Vec4;

use crate::errors::{OverpaintError, Result};
use crate::material::{OverlayMaterial, OverlayShader};

/// Candidate shaders, in priority order.
const CANDIDATES: &[(&str, &str)] = &[
    (
        "fallback/soft_tint",
        include_str!("shaders/fallback_soft.wgsl"),
    ),
    (
        "fallback/flat_tint",
        include_str!("shaders/fallback_flat.wgsl"),
    ),
];

/// Last-resort shader: solid magenta at low alpha, no bindings at all.
const ERROR_SHADER_NAME: &str = "fallback/error";
const ERROR_SHADER: &str = "\
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(vertex_index) / 2) * 4.0 - 1.0;
    let y = f32(i32(vertex_index) & 1) * 4.0 - 1.0;
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 1.0, 0.2);
}
";

/// Soft pink, mostly transparent. Chosen to be obviously "not a paint
/// result" while leaving the camera feed readable.
const FALLBACK_TINT: Vec4 = Vec4::new(1.0, 0.6, 0.7, 0.2);
const FALLBACK_BLEND: f32 = 1.0;

/// Parses and validates a WGSL source on the CPU.
///
/// Used for every fallback candidate and for caller-provided custom shaders
/// before any `wgpu` shader module is created from them.
pub fn validate_wgsl(name: &str, source: &str) -> Result<()> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|err| OverpaintError::ShaderInvalid {
            name: name.to_owned(),
            reason: err.message().to_owned(),
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|err| OverpaintError::ShaderInvalid {
            name: name.to_owned(),
            reason: err.as_inner().to_string(),
        })?;

    Ok(())
}

/// Lazily builds and caches the translucent placeholder material.
#[derive(Debug, Default)]
pub struct FallbackBuilder {
    built: bool,
    material: Option<OverlayMaterial>,
}

impl FallbackBuilder {
    /// Creates a builder with nothing constructed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fallback material, constructing it on first use.
    ///
    /// `None` means every candidate including the error shader failed
    /// validation; the owner must skip rendering rather than crash.
    pub fn get_or_build(&mut self) -> Option<&OverlayMaterial> {
        if !self.built {
            self.material = Self::build();
            self.built = true;
        }
        self.material.as_ref()
    }

    /// Returns the cached fallback material without building.
    #[must_use]
    pub fn get(&self) -> Option<&OverlayMaterial> {
        self.material.as_ref()
    }

    /// Drops the cached material; the next access rebuilds it.
    pub fn invalidate(&mut self) {
        self.built = false;
        self.material = None;
    }

    /// Returns the first candidate from `candidates` whose WGSL validates.
    ///
    /// Exposed so the candidate-resolution policy can be exercised with
    /// arbitrary lists; the builder itself calls this with [`CANDIDATES`].
    #[must_use]
    pub fn first_valid(
        candidates: &[(&'static str, &'static str)],
    ) -> Option<(&'static str, &'static str)> {
        for &(name, source) in candidates {
            match validate_wgsl(name, source) {
                Ok(()) => return Some((name, source)),
                Err(err) => {
                    log::warn!("fallback candidate rejected: {err}");
                }
            }
        }
        None
    }

    fn build() -> Option<OverlayMaterial> {
        let (name, source) = match Self::first_valid(CANDIDATES) {
            Some(chosen) => chosen,
            None => {
                // Every real candidate failed; the error shader keeps the
                // pipeline from ever holding a null material.
                match validate_wgsl(ERROR_SHADER_NAME, ERROR_SHADER) {
                    Ok(()) => (ERROR_SHADER_NAME, ERROR_SHADER),
                    Err(err) => {
                        log::error!("no usable fallback shader: {err}");
                        return None;
                    }
                }
            }
        };

        log::debug!("fallback material built from shader '{name}'");
        Some(OverlayMaterial::translucent(
            OverlayShader::Custom {
                name,
                source: source.into(),
            },
            FALLBACK_TINT,
            FALLBACK_BLEND,
        ))
    }
}
