//! Fixed-width backends: native `f32` and `f64` arithmetic.
//!
//! These are the fast paths. They stop resolving neighbouring pixels once
//! the window width approaches the type's epsilon (`~1e-7` for `f32`,
//! `~1e-16` for `f64`), which shows up as banding at deep zoom.

use crate::real::Real;

impl Real for f32 {
    type Context = ();

    const NAME: &'static str = "fixed32";

    #[inline]
    fn from_f64(value: f64, _ctx: &()) -> Self {
        value as f32
    }

    /// Computed in `f64` and narrowed once, so the pixel fraction is as
    /// accurate as the narrowing allows.
    #[inline]
    fn from_ratio(num: u64, den: u64, _ctx: &()) -> Self {
        (num as f64 / den as f64) as f32
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl Real for f64 {
    type Context = ();

    const NAME: &'static str = "fixed64";

    #[inline]
    fn from_f64(value: f64, _ctx: &()) -> Self {
        value
    }

    #[inline]
    fn from_ratio(num: u64, den: u64, _ctx: &()) -> Self {
        num as f64 / den as f64
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }
}
