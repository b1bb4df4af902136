//! Error types for the gesture particle engine.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Landmark set has the wrong shape or carries non-finite coordinates
    #[error("Invalid landmarks: {0}")]
    InvalidLandmarks(String),

    /// Smoothing filter initialization or update error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Shape generation failed for the active configuration
    #[error("Shape error: {0}")]
    ShapeError(String),

    /// Font loading or text rasterization failed
    #[error("Glyph error: {0}")]
    GlyphError(String),

    /// The external landmark source failed to produce a result
    #[error("Detection error: {0}")]
    DetectionError(String),

    /// The external frame sink rejected a frame
    #[error("Render error: {0}")]
    RenderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
