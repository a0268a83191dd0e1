use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::real::Real;

/// The rectangular region of the complex plane to render.
///
/// Pixel `(0, 0)` maps to `(xmin, ymin)`; increasing pixel-y increases the
/// imaginary part. There is no axis flip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneWindow {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl PlaneWindow {
    /// The whole Mandelbrot set and all four roots of `z⁴ − 1`: `[-2, 2]²`.
    pub const FULL: Self = Self {
        xmin: -2.0,
        ymin: -2.0,
        xmax: 2.0,
        ymax: 2.0,
    };

    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> crate::Result<Self> {
        let window = Self {
            xmin,
            ymin,
            xmax,
            ymax,
        };
        window.validate()?;
        Ok(window)
    }

    /// Check the window invariants. Deserialized windows skip [`new`](Self::new),
    /// so the renderer calls this before any pixel work.
    pub fn validate(&self) -> crate::Result<()> {
        let all_finite = [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(CoreError::InvalidWindow {
                reason: format!("bounds must be finite, got {self:?}"),
            });
        }
        if self.xmax <= self.xmin {
            return Err(CoreError::InvalidWindow {
                reason: format!("xmax ({}) must exceed xmin ({})", self.xmax, self.xmin),
            });
        }
        if self.ymax <= self.ymin {
            return Err(CoreError::InvalidWindow {
                reason: format!("ymax ({}) must exceed ymin ({})", self.ymax, self.ymin),
            });
        }
        Ok(())
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `plane = pixel / dimension * (max - min) + min`, evaluated in the
    /// backend's own arithmetic.
    #[inline]
    pub fn pixel_to_point<T: Real>(
        &self,
        raster: &RasterSpec,
        px: u32,
        py: u32,
        ctx: &T::Context,
    ) -> Complex<T> {
        self.subpixel_to_point(raster, px as u64, py as u64, 1, ctx)
    }

    /// Map a fractional pixel coordinate `(x_num / den, y_num / den)` to a
    /// complex-plane point.
    ///
    /// Sub-pixel offsets are passed as exact ratios so the rational backend
    /// does not pick up rounding from the sampling grid. The supersampler
    /// uses `den = 4` with numerators `4p + 1` and `4p + 3`.
    pub fn subpixel_to_point<T: Real>(
        &self,
        raster: &RasterSpec,
        x_num: u64,
        y_num: u64,
        den: u64,
        ctx: &T::Context,
    ) -> Complex<T> {
        let fx = T::from_ratio(x_num, den * raster.width as u64, ctx);
        let fy = T::from_ratio(y_num, den * raster.height as u64, ctx);
        Complex::new(
            fx * T::from_f64(self.width(), ctx) + T::from_f64(self.xmin, ctx),
            fy * T::from_f64(self.height(), ctx) + T::from_f64(self.ymin, ctx),
        )
    }

    /// Plane units between horizontally adjacent pixel samples.
    ///
    /// Compare against a backend's epsilon to predict banding.
    pub fn pixel_spacing(&self, raster: &RasterSpec) -> f64 {
        self.width() / raster.width as f64
    }
}

impl Default for PlaneWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// The pixel grid of one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSpec {
    pub width: u32,
    pub height: u32,
}

impl RasterSpec {
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        let raster = Self { width, height };
        raster.validate()?;
        Ok(raster)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidRaster {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
