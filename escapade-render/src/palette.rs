use escapade_core::{IterationResult, RootSet};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Opaque black, the color of every sample that never terminated.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Maps an [`IterationResult`] to an opaque RGBA color.
///
/// The first three palettes shade escape-time results by escape speed; the
/// last one colors Newton results by root and darkens them with convergence
/// time against the classifier's iteration budget. Color mapping is pure
/// and total: any result, including ones from the other formula, gets a
/// color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Palette {
    /// `gray = 255 − contrast·n`, saturating at black.
    Grayscale {
        #[serde(default = "default_contrast")]
        contrast: u8,
    },

    /// `R = 255 − n`, `G = 2n`, `B = 3n`, each clamped.
    Rgb,

    /// `Y = 255 − n`, `Cb = 128 + n/2`, `Cr = 128 + n`, then converted to RGB.
    #[serde(rename = "ycbcr")]
    YCbCr,

    /// Base color of the converged root, scaled by `255 − n·255/budget`.
    RootShaded { colors: Vec<[u8; 3]> },
}

fn default_contrast() -> u8 {
    Palette::DEFAULT_CONTRAST
}

impl Palette {
    pub const DEFAULT_CONTRAST: u8 = 15;

    pub fn grayscale() -> Self {
        Self::Grayscale {
            contrast: Self::DEFAULT_CONTRAST,
        }
    }

    /// A root-shaded palette using each root's declared color.
    pub fn root_shaded(roots: &RootSet) -> Self {
        Self::RootShaded {
            colors: roots.colors(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale { .. } => "grayscale",
            Self::Rgb => "rgb",
            Self::YCbCr => "ycbcr",
            Self::RootShaded { .. } => "root_shaded",
        }
    }

    /// `true` for palettes that color Newton results.
    pub fn is_root_palette(&self) -> bool {
        matches!(self, Self::RootShaded { .. })
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        match self {
            Self::RootShaded { colors } if colors.is_empty() => Err(RenderError::InvalidPalette {
                reason: "root_shaded needs at least one color".into(),
            }),
            _ => Ok(()),
        }
    }

    /// Map a single result to an RGBA color.
    ///
    /// `budget` is the iteration limit of the classifier that produced
    /// `result`; root shading darkens against it.
    pub fn color(&self, result: IterationResult, budget: u32) -> [u8; 4] {
        match (self, result) {
            (Self::Grayscale { contrast }, IterationResult::Escaped { iterations }) => {
                let gray = 255u32.saturating_sub((*contrast as u32).saturating_mul(iterations));
                let g = gray as u8;
                [g, g, g, 255]
            }
            (Self::Rgb, IterationResult::Escaped { iterations: n }) => [
                clamp_u8(255u32.saturating_sub(n)),
                clamp_u8(n.saturating_mul(2)),
                clamp_u8(n.saturating_mul(3)),
                255,
            ],
            (Self::YCbCr, IterationResult::Escaped { iterations: n }) => {
                let y = clamp_u8(255u32.saturating_sub(n));
                let cb = clamp_u8(128u32.saturating_add(n / 2));
                let cr = clamp_u8(128u32.saturating_add(n));
                let [r, g, b] = ycbcr_to_rgb(y, cb, cr);
                [r, g, b, 255]
            }
            (Self::RootShaded { colors }, IterationResult::Converged { iterations, root }) => {
                match colors.get(root) {
                    Some(base) => {
                        let shade = root_shade(iterations, budget);
                        [
                            scale_channel(base[0], shade),
                            scale_channel(base[1], shade),
                            scale_channel(base[2], shade),
                            255,
                        ]
                    }
                    None => BLACK,
                }
            }
            _ => BLACK,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[inline]
fn clamp_u8(v: u32) -> u8 {
    v.min(255) as u8
}

/// `255 − n·255/budget`, floored at zero for counts past the budget.
#[inline]
fn root_shade(iterations: u32, budget: u32) -> u32 {
    let budget = budget.max(1) as u64;
    let dim = (iterations as u64 * 255 / budget).min(255);
    255 - dim as u32
}

#[inline]
fn scale_channel(base: u8, shade: u32) -> u8 {
    (base as u32 * shade / 255) as u8
}

/// Full-range (JFIF) YCbCr to RGB.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f64;
    let cb = cb as f64 - 128.0;
    let cr = cr as f64 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [to_channel(r), to_channel(g), to_channel(b)]
}

#[inline]
fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
