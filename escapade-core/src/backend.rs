use std::fmt;
use std::str::FromStr;

use dashu_float::FBig;
use num::BigRational;
use serde::{Deserialize, Serialize};

use crate::big_float::BigFloatContext;
use crate::error::CoreError;
use crate::rational::RationalContext;
use crate::real::Real;
use crate::window::PlaneWindow;

/// Which numeric representation a render pass runs on.
///
/// Chosen once per render; the renderer matches on it and instantiates the
/// generic pipeline for the corresponding [`Real`] type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    Fixed32,
    #[default]
    Fixed64,
    #[serde(rename = "bigfloat")]
    BigFloat {
        #[serde(default = "default_precision_bits")]
        precision_bits: usize,
    },
    Rational {
        #[serde(default = "default_scale")]
        scale: u64,
        #[serde(default = "default_max_bits")]
        max_bits: u64,
    },
}

fn default_precision_bits() -> usize {
    BigFloatContext::DEFAULT_PRECISION_BITS
}

fn default_scale() -> u64 {
    RationalContext::DEFAULT_SCALE
}

fn default_max_bits() -> u64 {
    RationalContext::DEFAULT_MAX_BITS
}

impl Backend {
    /// Every backend with its default context, fastest first.
    pub const ALL: [Backend; 4] = [
        Backend::Fixed32,
        Backend::Fixed64,
        Backend::BigFloat {
            precision_bits: BigFloatContext::DEFAULT_PRECISION_BITS,
        },
        Backend::Rational {
            scale: RationalContext::DEFAULT_SCALE,
            max_bits: RationalContext::DEFAULT_MAX_BITS,
        },
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed32 => <f32 as Real>::NAME,
            Self::Fixed64 => <f64 as Real>::NAME,
            Self::BigFloat { .. } => <FBig as Real>::NAME,
            Self::Rational { .. } => <BigRational as Real>::NAME,
        }
    }

    /// Check the backend's context parameters without building anything.
    pub fn validate(&self) -> crate::Result<()> {
        match *self {
            Self::Fixed32 | Self::Fixed64 => Ok(()),
            Self::BigFloat { precision_bits } => BigFloatContext::new(precision_bits).map(|_| ()),
            Self::Rational { scale, max_bits } => RationalContext::new(scale, max_bits).map(|_| ()),
        }
    }

    /// Check that `window` is representable on this backend.
    ///
    /// Only the rational backend has a limit: its bounds are scaled into
    /// integers, which fails for coordinates near `f64::MAX`.
    pub fn check_window(&self, window: &PlaneWindow) -> crate::Result<()> {
        match *self {
            Self::Rational { scale, max_bits } => {
                RationalContext::new(scale, max_bits)?.check_window(window)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigFloat { precision_bits } => write!(f, "{} ({precision_bits} bits)", self.name()),
            Self::Rational { scale, max_bits } => {
                write!(f, "{} (scale {scale}, max {max_bits} bits)", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Parses a backend name; parameterised backends get their default context.
impl FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownBackend(s.to_string()))
    }
}
