//! Arbitrary-precision floating backend built on `dashu_float::FBig`.
//!
//! Every value is created at the context's precision, including constants
//! like the escape bound. `FBig` arithmetic rounds to the larger operand
//! precision, so a whole classification call runs at exactly that many bits.

use dashu_float::FBig;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::real::Real;

/// Precision parameters for the [`FBig`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigFloatContext {
    precision_bits: usize,
}

impl BigFloatContext {
    pub const DEFAULT_PRECISION_BITS: usize = 256;

    pub fn new(precision_bits: usize) -> crate::Result<Self> {
        if precision_bits == 0 {
            return Err(CoreError::InvalidPrecision(precision_bits));
        }
        Ok(Self { precision_bits })
    }

    #[inline]
    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }
}

impl Default for BigFloatContext {
    fn default() -> Self {
        Self {
            precision_bits: Self::DEFAULT_PRECISION_BITS,
        }
    }
}

impl Real for FBig {
    type Context = BigFloatContext;

    const NAME: &'static str = "bigfloat";

    fn from_f64(value: f64, ctx: &BigFloatContext) -> Self {
        // Non-finite input is rejected by `PlaneWindow`; map it to zero
        // rather than panic.
        Self::try_from(value)
            .unwrap_or(Self::ZERO)
            .with_precision(ctx.precision_bits)
            .value()
    }

    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    fn to_f64(&self) -> f64 {
        FBig::to_f64(self).value()
    }
}
