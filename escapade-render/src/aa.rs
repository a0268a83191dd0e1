//! Per-pixel sampling: one sample at the pixel corner, or a 2×2 supersample.

use escapade_core::{Classifier, PlaneWindow, RasterSpec, Real};

use crate::palette::Palette;

/// Sub-pixel grid denominator. Offsets are `1/4` and `3/4` of the cell.
const SUBPIXEL_DEN: u64 = 4;

/// Numerator offsets within a cell, in units of `1/SUBPIXEL_DEN`.
const SUBPIXEL_OFFSETS: [u64; 2] = [1, 3];

/// Number of samples averaged per supersampled pixel.
pub const SUPERSAMPLE_COUNT: usize = SUBPIXEL_OFFSETS.len() * SUBPIXEL_OFFSETS.len();

/// Everything a pixel needs besides its coordinates.
///
/// Borrowed by every tile worker; nothing in it is mutated during a render.
pub struct Sampler<'a, T: Real, C> {
    pub classifier: &'a C,
    pub palette: &'a Palette,
    pub window: &'a PlaneWindow,
    pub raster: &'a RasterSpec,
    pub ctx: &'a T::Context,
}

impl<T: Real, C: Classifier<T>> Sampler<'_, T, C> {
    /// Classify and color the point at fractional pixel
    /// `(x_num / den, y_num / den)`.
    #[inline]
    pub fn sample(&self, x_num: u64, y_num: u64, den: u64) -> escapade_core::Result<[u8; 4]> {
        let point = self
            .window
            .subpixel_to_point::<T>(self.raster, x_num, y_num, den, self.ctx);
        let result = self.classifier.classify(point)?;
        Ok(self.palette.color(result, self.classifier.max_iterations()))
    }

    /// One sample at the pixel's top-left corner.
    #[inline]
    pub fn single(&self, px: u32, py: u32) -> escapade_core::Result<[u8; 4]> {
        self.sample(px as u64, py as u64, 1)
    }

    /// Four samples at `(0.25, 0.75) × (0.25, 0.75)` of the cell, averaged.
    pub fn supersampled(&self, px: u32, py: u32) -> escapade_core::Result<[u8; 4]> {
        let mut samples = [[0u8; 4]; SUPERSAMPLE_COUNT];
        let mut i = 0;
        for dy in SUBPIXEL_OFFSETS {
            for dx in SUBPIXEL_OFFSETS {
                samples[i] = self.sample(
                    px as u64 * SUBPIXEL_DEN + dx,
                    py as u64 * SUBPIXEL_DEN + dy,
                    SUBPIXEL_DEN,
                )?;
                i += 1;
            }
        }
        Ok(average_colors(&samples))
    }

    pub fn pixel(&self, px: u32, py: u32, supersample: bool) -> escapade_core::Result<[u8; 4]> {
        if supersample {
            self.supersampled(px, py)
        } else {
            self.single(px, py)
        }
    }
}

/// Per-channel mean with truncating integer division.
pub fn average_colors(colors: &[[u8; 4]]) -> [u8; 4] {
    if colors.is_empty() {
        return crate::palette::BLACK;
    }
    let mut sum = [0u32; 4];
    for c in colors {
        for (acc, &ch) in sum.iter_mut().zip(c) {
            *acc += ch as u32;
        }
    }
    let n = colors.len() as u32;
    sum.map(|s| (s / n) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use escapade_core::{Mandelbrot, Newton};

    #[test]
    fn average_truncates() {
        let colors = [
            [255, 0, 0, 255],
            [0, 0, 0, 255],
            [0, 0, 0, 255],
            [0, 0, 1, 255],
        ];
        assert_eq!(average_colors(&colors), [63, 0, 0, 255]);
    }

    #[test]
    fn average_of_identical_colors_is_unchanged() {
        let c = [12, 34, 56, 255];
        assert_eq!(average_colors(&[c; 4]), c);
    }

    #[test]
    fn supersample_is_mean_of_quartile_samples() {
        let classifier = Mandelbrot::<f64>::default();
        let palette = Palette::Rgb;
        let window = PlaneWindow::FULL;
        let raster = RasterSpec::new(16, 16).unwrap();
        let sampler = Sampler::<f64, _> {
            classifier: &classifier,
            palette: &palette,
            window: &window,
            raster: &raster,
            ctx: &(),
        };

        for (px, py) in [(0, 0), (5, 9), (10, 7), (15, 15)] {
            let quartiles: Vec<[u8; 4]> = [(1, 1), (3, 1), (1, 3), (3, 3)]
                .iter()
                .map(|&(dx, dy)| sampler.sample(px * 4 + dx, py * 4 + dy, 4).unwrap())
                .collect();
            assert_eq!(
                sampler.supersampled(px as u32, py as u32).unwrap(),
                average_colors(&quartiles),
                "pixel ({px}, {py})"
            );
        }
    }

    #[test]
    fn single_sample_uses_pixel_corner() {
        let classifier = Newton::<f64>::default();
        let palette = Palette::root_shaded(&escapade_core::RootSet::unity_quartic());
        let window = PlaneWindow::FULL;
        let raster = RasterSpec::new(4, 4).unwrap();
        let sampler = Sampler::<f64, _> {
            classifier: &classifier,
            palette: &palette,
            window: &window,
            raster: &raster,
            ctx: &(),
        };
        // Pixel (2, 2) maps exactly to z = 0, where f'(z) = 0.
        assert_eq!(sampler.pixel(2, 2, false).unwrap(), crate::palette::BLACK);
        assert_ne!(sampler.pixel(2, 2, true).unwrap(), crate::palette::BLACK);
    }
}
