use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use escapade_core::{
    Backend, BigFloatContext, BigRational, Classifier, EscapeParams, FBig, Mandelbrot, Newton,
    NewtonParams, PlaneWindow, Polynomial, RasterSpec, RationalContext, Real, RootSet,
};

use crate::aa::Sampler;
use crate::buffer::PixelBuffer;
use crate::error::RenderError;
use crate::palette::Palette;
use crate::tile::{build_tile_grid, Tile, TILE_SIZE};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Which iteration to run per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// Escape-time iteration of `z² + c`.
    Mandelbrot(EscapeParams),

    /// Newton's method on `polynomial`, classified against `roots`.
    Newton {
        #[serde(default)]
        params: NewtonParams,
        #[serde(default)]
        roots: RootSet,
        #[serde(default)]
        polynomial: Polynomial,
    },
}

impl Formula {
    /// The reference Newton scenario: `z⁴ − 1` with the default budget.
    pub fn unity_quartic() -> Self {
        Self::Newton {
            params: NewtonParams::default(),
            roots: RootSet::unity_quartic(),
            polynomial: Polynomial::unity_quartic(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandelbrot(_) => "mandelbrot",
            Self::Newton { .. } => "newton",
        }
    }

    pub fn max_iterations(&self) -> u32 {
        match self {
            Self::Mandelbrot(params) => params.max_iterations,
            Self::Newton { params, .. } => params.max_iterations,
        }
    }

    /// The palette that suits this formula by default.
    pub fn default_palette(&self) -> Palette {
        match self {
            Self::Mandelbrot(_) => Palette::grayscale(),
            Self::Newton { roots, .. } => Palette::root_shaded(roots),
        }
    }

    fn validate(&self) -> crate::Result<()> {
        match self {
            Self::Mandelbrot(params) => params.validate()?,
            Self::Newton { params, .. } => params.validate()?,
        }
        Ok(())
    }
}

impl Default for Formula {
    fn default() -> Self {
        Self::Mandelbrot(EscapeParams::default())
    }
}

/// A complete description of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub window: PlaneWindow,
    pub raster: RasterSpec,
    pub backend: Backend,
    pub formula: Formula,
    pub palette: Palette,
    /// Average a 2×2 grid of samples per pixel.
    pub supersample: bool,
}

impl RenderRequest {
    /// Check every structural parameter before any pixel work.
    pub fn validate(&self) -> crate::Result<()> {
        self.window.validate()?;
        self.raster.validate()?;
        self.backend.validate()?;
        self.backend.check_window(&self.window)?;
        self.formula.validate()?;
        self.palette.validate()?;

        match (&self.formula, &self.palette) {
            (Formula::Mandelbrot(_), p) if p.is_root_palette() => Err(RenderError::PaletteMismatch {
                palette: p.name(),
                formula: self.formula.name(),
            }),
            (Formula::Newton { roots, .. }, Palette::RootShaded { colors }) => {
                if colors.len() < roots.len() {
                    return Err(RenderError::InvalidPalette {
                        reason: format!(
                            "{} colors for {} roots",
                            colors.len(),
                            roots.len()
                        ),
                    });
                }
                Ok(())
            }
            (Formula::Newton { .. }, p) => Err(RenderError::PaletteMismatch {
                palette: p.name(),
                formula: self.formula.name(),
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The result of a full-frame render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub buffer: PixelBuffer,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
}

// ---------------------------------------------------------------------------
// Full-frame render
// ---------------------------------------------------------------------------

/// Render a full frame.
///
/// The request is validated up front. The backend is fixed for the whole
/// pass: this matches on it once and runs the generic pipeline for the
/// corresponding numeric type. The first per-sample error (only the
/// rational size guard can produce one) aborts the render.
pub fn render(request: &RenderRequest) -> crate::Result<RenderOutput> {
    request.validate()?;
    let start = Instant::now();

    let (buffer, tiles_rendered) = match request.backend {
        Backend::Fixed32 => render_formula::<f32>(request, ())?,
        Backend::Fixed64 => render_formula::<f64>(request, ())?,
        Backend::BigFloat { precision_bits } => {
            render_formula::<FBig>(request, BigFloatContext::new(precision_bits)?)?
        }
        Backend::Rational { scale, max_bits } => {
            render_formula::<BigRational>(request, RationalContext::new(scale, max_bits)?)?
        }
    };

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        backend = request.backend.name(),
        formula = request.formula.name(),
        width = request.raster.width,
        height = request.raster.height,
        supersample = request.supersample,
        "Render complete"
    );

    Ok(RenderOutput {
        buffer,
        elapsed,
        tiles_rendered,
    })
}

/// Instantiate the classifier for `T` and run the tiled pipeline.
fn render_formula<T: Real>(
    request: &RenderRequest,
    ctx: T::Context,
) -> crate::Result<(PixelBuffer, usize)> {
    match &request.formula {
        Formula::Mandelbrot(params) => {
            let classifier = Mandelbrot::<T>::new(*params, ctx);
            render_with::<T, _>(&classifier, request, &ctx)
        }
        Formula::Newton {
            params,
            roots,
            polynomial,
        } => {
            let classifier = Newton::<T>::new(polynomial, roots, *params, ctx);
            render_with::<T, _>(&classifier, request, &ctx)
        }
    }
}

/// Render every tile in parallel, then assemble the buffer.
///
/// Generic over the backend and classifier for static dispatch. Tiles write
/// disjoint regions, so workers share nothing mutable; the single assembly
/// step afterwards is the only writer of the buffer.
pub fn render_with<T: Real, C: Classifier<T> + Sync>(
    classifier: &C,
    request: &RenderRequest,
    ctx: &T::Context,
) -> crate::Result<(PixelBuffer, usize)> {
    let sampler = Sampler::<T, C> {
        classifier,
        palette: &request.palette,
        window: &request.window,
        raster: &request.raster,
        ctx,
    };

    let tiles = build_tile_grid(&request.raster, TILE_SIZE);
    debug!(
        tile_count = tiles.len(),
        width = request.raster.width,
        height = request.raster.height,
        backend = T::NAME,
        max_iterations = classifier.max_iterations(),
        "Starting tiled render"
    );

    let tile_data: Vec<Vec<u8>> = tiles
        .par_iter()
        .map(|tile| render_tile(&sampler, tile, request.supersample))
        .collect::<escapade_core::Result<_>>()?;

    let mut buffer = PixelBuffer::new(request.raster.width, request.raster.height);
    for (tile, data) in tiles.iter().zip(&tile_data) {
        buffer.blit_tile(tile, data);
    }
    Ok((buffer, tiles.len()))
}

/// Compute one tile's RGBA bytes, row-major within the tile.
fn render_tile<T: Real, C: Classifier<T>>(
    sampler: &Sampler<'_, T, C>,
    tile: &Tile,
    supersample: bool,
) -> escapade_core::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(tile.pixel_count() * 4);
    for (px, py) in tile.pixels() {
        data.extend_from_slice(&sampler.pixel(px, py, supersample)?);
    }
    Ok(data)
}
