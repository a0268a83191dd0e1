pub mod backend;
pub mod big_float;
pub mod complex;
pub mod error;
pub mod fixed;
pub mod fractal;
pub mod mandelbrot;
pub mod newton;
pub mod rational;
pub mod real;
pub mod window;

// Re-export primary types for convenience.
pub use backend::Backend;
pub use big_float::BigFloatContext;
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{Classifier, EscapeParams, IterationResult};
pub use mandelbrot::Mandelbrot;
pub use newton::{Newton, NewtonParams, Polynomial, Root, RootSet};
pub use rational::RationalContext;
pub use real::Real;
pub use window::{PlaneWindow, RasterSpec};

/// Re-exported so downstream crates can name the backend types without
/// depending on the numeric crates directly.
pub use dashu_float::FBig;
pub use num::BigRational;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
