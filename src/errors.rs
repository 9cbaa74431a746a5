//! Error Types
//!
//! All public APIs that can fail return [`Result<T>`], an alias for
//! `std::result::Result<T, OverpaintError>`.
//!
//! Note that frame-boundary entry points (`on_camera_setup`, `execute`,
//! `on_camera_cleanup`) deliberately do *not* return errors: a failing frame
//! degrades to a pass-through copy or a skipped composite, and the error is
//! logged instead of propagated. These types cover the internal stages those
//! entry points recover from.

use thiserror::Error;

/// The main error type for the overpaint pass.
#[derive(Error, Debug)]
pub enum OverpaintError {
    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// A WGSL source failed CPU-side parsing or validation.
    #[error("shader '{name}' failed validation: {reason}")]
    ShaderInvalid {
        /// Logical shader name (e.g. a fallback candidate).
        name: String,
        /// Parser or validator message.
        reason: String,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The scratch color target could not be allocated.
    #[error("scratch target allocation failed ({width}x{height}): {reason}")]
    AllocationFailed {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Why the allocation was rejected.
        reason: String,
    },

    /// A resource required by the current blit stage is missing.
    #[error("required resource missing: {0}")]
    MissingResource(&'static str),

    /// A raw texture-to-texture copy is not possible between the given
    /// targets (format mismatch or missing copy usages).
    #[error("raw copy unsupported: {0}")]
    CopyUnsupported(String),
}

/// Alias for `Result<T, OverpaintError>`.
pub type Result<T> = std::result::Result<T, OverpaintError>;
