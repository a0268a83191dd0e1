use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid escape radius: {0} (must be > 0.0)")]
    InvalidEscapeRadius(f64),

    #[error("invalid convergence tolerance: {0} (must be > 0.0)")]
    InvalidTolerance(f64),

    #[error("invalid precision: {0} bits (must be >= 1)")]
    InvalidPrecision(usize),

    #[error("unknown backend: {0:?} (expected fixed32, fixed64, bigfloat or rational)")]
    UnknownBackend(String),

    #[error("invalid rational backend: {reason}")]
    InvalidRational { reason: String },

    #[error("invalid polynomial: {reason}")]
    InvalidPolynomial { reason: String },

    #[error("invalid plane window: {reason}")]
    InvalidWindow { reason: String },

    #[error("invalid raster: {width}×{height} (both dimensions must be > 0)")]
    InvalidRaster { width: u32, height: u32 },

    #[error("{backend} value grew to {bits} bits, exceeding the {limit}-bit limit")]
    ResourceExhausted {
        backend: &'static str,
        bits: u64,
        limit: u64,
    },
}
