#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! A defensive masked-overlay compositing pass for wgpu hosts.
//!
//! `overpaint` composites a translucent "paint" layer onto a camera (or scene)
//! color target, modulated by an externally produced segmentation mask. The
//! host render loop drives three callbacks per camera per frame — setup,
//! execute, cleanup — and the library guarantees that the camera feed stays
//! visible under every failure mode: missing textures, unusable materials,
//! allocation failures and copy failures all degrade to a pass-through frame
//! rather than a crash or an opaque overlay.
//!
//! # Architecture
//!
//! - [`OverlayFeature`] owns the user-facing configuration and decides once
//!   per frame which material (primary or fallback) drives the composite.
//! - [`fallback::FallbackBuilder`] lazily constructs an always-renderable
//!   translucent placeholder material from a prioritized list of shader
//!   candidates, each validated on the CPU before use.
//! - [`OverlayPass`] owns the scratch color target and records the blit
//!   chain (source → scratch with effect, scratch → source restore), with
//!   nested fallbacks at every blit boundary.

pub mod errors;
pub mod fallback;
pub mod feature;
pub mod material;
pub mod pass;
pub mod settings;
pub mod utils;

pub use errors::{OverpaintError, Result};
pub use fallback::FallbackBuilder;
pub use feature::{OverlayFeature, RenderHook};
pub use material::{
    BLEND_EPSILON, MaterialSelection, MaterialState, OverlayMaterial, OverlayShader,
    effective_blend, select_material,
};
pub use pass::{FrameContext, OverlayPass, PassState, ScratchTarget, TargetDescriptor};
pub use settings::OverlaySettings;
pub use utils::{Tracked, WarnLatch};
