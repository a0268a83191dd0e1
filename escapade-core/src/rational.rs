//! Exact rational backend built on `num::BigRational`.
//!
//! A plane coordinate enters as `trunc(value * scale) / scale`; after that
//! every operation is exact. The price is growth: each squaring roughly
//! doubles the numerator and denominator sizes, so only short orbits are
//! affordable. [`RationalContext::max_bits`] caps that growth and turns a
//! runaway sample into [`CoreError::ResourceExhausted`].

use num::bigint::BigInt;
use num::{BigRational, FromPrimitive, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::real::Real;
use crate::window::PlaneWindow;

/// Conversion scale and growth limit for the [`BigRational`] backend.
///
/// `scale` bounds how finely a decimal coordinate is captured: two window
/// coordinates closer than `1 / scale` collapse onto the same rational.
/// The default of `10^10` therefore stops resolving detail once the window
/// width drops to around `width_px / 10^10`. At the other end, a coordinate
/// times `scale` must stay finite as an `f64`; [`check_window`](Self::check_window)
/// enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationalContext {
    scale: u64,
    max_bits: u64,
}

impl RationalContext {
    pub const DEFAULT_SCALE: u64 = 10_000_000_000;
    pub const DEFAULT_MAX_BITS: u64 = 1 << 16;

    pub fn new(scale: u64, max_bits: u64) -> crate::Result<Self> {
        if scale == 0 {
            return Err(CoreError::InvalidRational {
                reason: "scale must be >= 1".into(),
            });
        }
        if max_bits == 0 {
            return Err(CoreError::InvalidRational {
                reason: "max_bits must be >= 1".into(),
            });
        }
        Ok(Self { scale, max_bits })
    }

    #[inline]
    pub fn scale(&self) -> u64 {
        self.scale
    }

    #[inline]
    pub fn max_bits(&self) -> u64 {
        self.max_bits
    }

    /// Reject windows whose bounds or extents overflow once scaled.
    pub fn check_window(&self, window: &PlaneWindow) -> crate::Result<()> {
        let values = [
            window.xmin,
            window.ymin,
            window.xmax,
            window.ymax,
            window.width(),
            window.height(),
        ];
        match values.iter().find(|v| !(*v * self.scale as f64).is_finite()) {
            Some(v) => Err(CoreError::InvalidWindow {
                reason: format!("{v} overflows at rational scale {}", self.scale),
            }),
            None => Ok(()),
        }
    }
}

impl Default for RationalContext {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            max_bits: Self::DEFAULT_MAX_BITS,
        }
    }
}

impl Real for BigRational {
    type Context = RationalContext;

    const NAME: &'static str = "rational";

    fn from_f64(value: f64, ctx: &RationalContext) -> Self {
        let scaled = (value * ctx.scale as f64).trunc();
        let numer = BigInt::from_f64(scaled).unwrap_or_else(BigInt::zero);
        BigRational::new(numer, BigInt::from(ctx.scale))
    }

    /// The binary value of `value`, with no truncation. Non-finite input
    /// maps to zero; parameters are validated finite before they get here.
    fn from_f64_exact(value: f64, _ctx: &RationalContext) -> Self {
        BigRational::from_float(value).unwrap_or_else(BigRational::zero)
    }

    fn from_ratio(num: u64, den: u64, _ctx: &RationalContext) -> Self {
        BigRational::new(BigInt::from(num), BigInt::from(den))
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn check_footprint(&self, ctx: &RationalContext) -> crate::Result<()> {
        let bits = self.numer().bits() + self.denom().bits();
        if bits > ctx.max_bits {
            return Err(CoreError::ResourceExhausted {
                backend: Self::NAME,
                bits,
                limit: ctx.max_bits,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RationalContext {
        RationalContext::default()
    }

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn invalid_context_rejected() {
        assert!(RationalContext::new(0, 64).is_err());
        assert!(RationalContext::new(10, 0).is_err());
        assert!(RationalContext::new(10, 64).is_ok());
    }

    #[test]
    fn from_f64_truncates_at_scale() {
        let c = RationalContext::new(1000, 1 << 10).unwrap();
        assert_eq!(<BigRational as Real>::from_f64(0.5, &c), rat(1, 2));
        assert_eq!(<BigRational as Real>::from_f64(-0.1234, &c), rat(-123, 1000));
        assert_eq!(<BigRational as Real>::from_f64(0.0009, &c), rat(0, 1));
    }

    #[test]
    fn parameters_are_not_truncated() {
        let c = RationalContext::new(1000, 1 << 10).unwrap();
        assert!(Real::is_zero(&<BigRational as Real>::from_f64(1e-12, &c)));
        let tol = <BigRational as Real>::from_f64_exact(1e-12, &c);
        assert!(!Real::is_zero(&tol));
        assert_eq!(Real::to_f64(&tol), 1e-12);
        assert_eq!(<BigRational as Real>::from_f64_exact(-0.75, &c), rat(-3, 4));
    }

    #[test]
    fn huge_windows_are_rejected() {
        let c = ctx();
        assert!(c.check_window(&PlaneWindow::FULL).is_ok());
        let far = PlaneWindow::new(-1e300, -1.0, 1e300, 1.0).unwrap();
        assert!(matches!(
            c.check_window(&far),
            Err(CoreError::InvalidWindow { .. })
        ));
        // Finite bounds whose width alone overflows.
        let wide = PlaneWindow::new(-1e308, -1.0, 1e308, 1.0).unwrap();
        assert!(RationalContext::new(1, 64).unwrap().check_window(&wide).is_err());
    }

    #[test]
    fn ratios_are_exact() {
        let q = <BigRational as Real>::from_ratio(3, 64, &ctx());
        assert_eq!(q, rat(3, 64));
    }

    #[test]
    fn arithmetic_is_exact() {
        let third = <BigRational as Real>::from_ratio(1, 3, &ctx());
        let three = <BigRational as Real>::from_ratio(3, 1, &ctx());
        assert_eq!(third * three, rat(1, 1));
    }

    #[test]
    fn footprint_limit_reports_growth() {
        let c = RationalContext::new(10, 64).unwrap();
        let mut v = rat(1, 3);
        let mut err = None;
        for _ in 0..16 {
            v = v.clone() * v.clone() + rat(1, 7);
            if let Err(e) = v.check_footprint(&c) {
                err = Some(e);
                break;
            }
        }
        match err {
            Some(CoreError::ResourceExhausted { backend, limit, bits }) => {
                assert_eq!(backend, "rational");
                assert_eq!(limit, 64);
                assert!(bits > 64);
            }
            other => panic!("expected ResourceExhausted, got {other:?}"),
        }
    }

    #[test]
    fn conversion_back_to_f64() {
        assert_eq!(Real::to_f64(&rat(-3, 4)), -0.75);
        assert!(Real::is_zero(&rat(0, 5)));
    }
}
