use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A real-number representation usable as the component type of
/// [`Complex`](crate::Complex).
///
/// Arithmetic goes through the standard operators on owned values, so the
/// iteration loops read the same for `f32` as for a 256-bit float.
/// Everything precision-related lives in the associated [`Context`](Self::Context):
/// values must only be combined with values created from the same context.
///
/// Classifiers are generic over `T: Real` and monomorphised per backend;
/// nothing in the hot loop branches on the representation.
pub trait Real:
    Clone
    + PartialOrd
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Parameters needed to create values (precision, scale, limits).
    type Context: Copy + Debug + Send + Sync;

    /// Short label used in logs and export metadata.
    const NAME: &'static str;

    /// Convert a decimal plane coordinate into this representation.
    fn from_f64(value: f64, ctx: &Self::Context) -> Self;

    /// Convert a parameter (tolerance, bound, coefficient, root) rather
    /// than a plane coordinate.
    ///
    /// Thresholds such as `1e-24` must survive the conversion; backends
    /// that snap coordinates to a grid override this to keep the value.
    fn from_f64_exact(value: f64, ctx: &Self::Context) -> Self {
        Self::from_f64(value, ctx)
    }

    /// The ratio `num / den`.
    ///
    /// Used for pixel fractions, so exact representations should keep it
    /// exact. `den` must be non-zero.
    fn from_ratio(num: u64, den: u64, ctx: &Self::Context) -> Self {
        Self::from_f64(num as f64, ctx) / Self::from_f64(den as f64, ctx)
    }

    fn is_zero(&self) -> bool;

    /// Lossy conversion, for diagnostics and tests only.
    fn to_f64(&self) -> f64;

    /// Fail once the value's representation has grown past what the
    /// context allows. Fixed-size representations never fail.
    fn check_footprint(&self, _ctx: &Self::Context) -> crate::Result<()> {
        Ok(())
    }
}
