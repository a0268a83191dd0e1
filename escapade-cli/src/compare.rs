use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use escapade_core::{Backend, CoreError, EscapeParams, PlaneWindow, RasterSpec};
use escapade_render::{export_png, render, ExportMetadata, Formula, RenderError, RenderRequest};

use crate::cli::{BackendArgs, CompareArgs};
use crate::error::AppError;
use crate::settings::palette_for;

/// Successively deeper windows into the seahorse valley.
///
/// The last one is narrower than `f32` can resolve at 256 pixels, so the
/// fixed32 image bands while the others stay sharp.
pub const ZOOM_LEVELS: [PlaneWindow; 4] = [
    PlaneWindow::FULL,
    PlaneWindow {
        xmin: -0.8,
        ymin: -0.2,
        xmax: -0.4,
        ymax: 0.2,
    },
    PlaneWindow {
        xmin: -0.7463,
        ymin: 0.1102,
        xmax: -0.7453,
        ymax: 0.1112,
    },
    PlaneWindow {
        xmin: -0.74530,
        ymin: 0.11030,
        xmax: -0.74525,
        ymax: 0.11035,
    },
];

/// How one backend fared on one zoom level.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered { elapsed: Duration },
    /// The rational backend outgrew its size limit.
    Exhausted { bits: u64, limit: u64 },
}

#[derive(Debug, Clone)]
pub struct BackendTiming {
    pub backend: Backend,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct LevelReport {
    pub level: usize,
    pub window: PlaneWindow,
    pub timings: Vec<BackendTiming>,
}

impl LevelReport {
    /// The fixed64 time, the reference for slowdown ratios.
    pub fn baseline(&self) -> Option<Duration> {
        self.timings.iter().find_map(|t| match (t.backend, &t.outcome) {
            (Backend::Fixed64, Outcome::Rendered { elapsed }) => Some(*elapsed),
            _ => None,
        })
    }

    /// `elapsed / fixed64 elapsed`, when both rendered.
    pub fn slowdown(&self, timing: &BackendTiming) -> Option<f64> {
        let base = self.baseline()?.as_secs_f64();
        match timing.outcome {
            Outcome::Rendered { elapsed } if base > 0.0 => Some(elapsed.as_secs_f64() / base),
            _ => None,
        }
    }
}

/// Render every zoom level with every requested backend.
pub fn run(args: &CompareArgs) -> Result<Vec<LevelReport>, AppError> {
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(|source| AppError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }

    let raster = RasterSpec::new(args.width, args.height)?;
    let formula = Formula::Mandelbrot(EscapeParams::default().with_max_iterations(args.max_iterations));
    let palette = palette_for(args.palette, &formula);

    let mut reports = Vec::with_capacity(ZOOM_LEVELS.len());
    for (level, window) in ZOOM_LEVELS.iter().enumerate() {
        info!(
            level,
            ?window,
            pixel_spacing = window.pixel_spacing(&raster),
            "Comparing backends"
        );
        let mut timings = Vec::with_capacity(args.backends.len());

        for &backend in &args.backends {
            let request = RenderRequest {
                window: *window,
                raster,
                backend: tune(backend, &args.backend_args),
                formula: formula.clone(),
                palette: palette.clone(),
                supersample: args.supersample,
            };
            let outcome = match render(&request) {
                Ok(out) => {
                    info!(
                        level,
                        backend = backend.name(),
                        elapsed_ms = out.elapsed.as_millis(),
                        "Backend finished"
                    );
                    if let Some(dir) = &args.output_dir {
                        write_image(dir, level, &request, &out)?;
                    }
                    Outcome::Rendered {
                        elapsed: out.elapsed,
                    }
                }
                Err(RenderError::Core(CoreError::ResourceExhausted { bits, limit, .. })) => {
                    warn!(level, backend = backend.name(), bits, limit, "Backend gave up");
                    Outcome::Exhausted { bits, limit }
                }
                Err(e) => return Err(e.into()),
            };
            timings.push(BackendTiming { backend, outcome });
        }

        reports.push(LevelReport {
            level,
            window: *window,
            timings,
        });
    }
    Ok(reports)
}

/// Apply the precision flags that fit `backend`, ignoring the rest.
fn tune(backend: Backend, args: &BackendArgs) -> Backend {
    match backend {
        Backend::BigFloat { precision_bits } => Backend::BigFloat {
            precision_bits: args.precision_bits.unwrap_or(precision_bits),
        },
        Backend::Rational { scale, max_bits } => Backend::Rational {
            scale: args.rational_scale.unwrap_or(scale),
            max_bits: args.rational_max_bits.unwrap_or(max_bits),
        },
        other => other,
    }
}

fn write_image(
    dir: &Path,
    level: usize,
    request: &RenderRequest,
    out: &escapade_render::RenderOutput,
) -> Result<(), AppError> {
    let path = dir.join(format!("level{level}_{}.png", request.backend.name()));
    let meta = ExportMetadata::from_request(request).with_elapsed_ms(out.elapsed.as_millis());
    export_png(&out.buffer, &path, &meta)?;
    Ok(())
}

/// One line per backend per level, for the terminal.
pub fn format_report(reports: &[LevelReport]) -> String {
    let mut lines = Vec::new();
    for report in reports {
        let w = &report.window;
        lines.push(format!(
            "level {}: ({}, {}) to ({}, {})",
            report.level, w.xmin, w.ymin, w.xmax, w.ymax
        ));
        for timing in &report.timings {
            let detail = match &timing.outcome {
                Outcome::Rendered { elapsed } => {
                    let ms = elapsed.as_secs_f64() * 1000.0;
                    match report.slowdown(timing) {
                        Some(ratio) => format!("{ms:>10.1} ms  {ratio:>8.1}x"),
                        None => format!("{ms:>10.1} ms"),
                    }
                }
                Outcome::Exhausted { bits, limit } => {
                    format!("resource exhausted ({bits} bits > {limit})")
                }
            };
            lines.push(format!("  {:<9} {detail}", timing.backend.name()));
        }
    }
    lines.join("\n")
}
