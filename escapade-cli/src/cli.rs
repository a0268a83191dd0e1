use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use escapade_core::{Backend, PlaneWindow};

#[derive(Debug, Parser)]
#[command(name = "escapade", version, about = "Escape-time and Newton fractal renderer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one image to PNG.
    Render(RenderArgs),

    /// Render a fixed zoom sequence with every backend and report timings.
    Compare(CompareArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormulaKind {
    Mandelbrot,
    Newton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteKind {
    Grayscale,
    Rgb,
    Ycbcr,
    RootShaded,
}

/// Flags shared by both subcommands for tuning the arbitrary-precision
/// backends.
#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// Mantissa bits for the bigfloat backend.
    #[arg(long)]
    pub precision_bits: Option<usize>,

    /// Denominator used when converting decimal bounds to rationals.
    #[arg(long)]
    pub rational_scale: Option<u64>,

    /// Numerator plus denominator bits at which the rational backend gives up.
    #[arg(long)]
    pub rational_max_bits: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
    /// JSON settings file; flags override its values.
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Plane window as `xmin,ymin,xmax,ymax`.
    #[arg(long, value_parser = parse_window, allow_hyphen_values = true)]
    pub window: Option<PlaneWindow>,

    /// fixed32, fixed64, bigfloat or rational.
    #[arg(short, long)]
    pub backend: Option<Backend>,

    #[command(flatten)]
    pub backend_args: BackendArgs,

    #[arg(short, long, value_enum)]
    pub formula: Option<FormulaKind>,

    #[arg(short = 'i', long)]
    pub max_iterations: Option<u32>,

    /// Bailout radius (mandelbrot only).
    #[arg(long)]
    pub escape_radius: Option<f64>,

    /// Convergence tolerance (newton only).
    #[arg(long)]
    pub tolerance: Option<f64>,

    #[arg(short, long, value_enum)]
    pub palette: Option<PaletteKind>,

    /// Gray levels lost per iteration (grayscale only).
    #[arg(long)]
    pub contrast: Option<u8>,

    /// Average a 2×2 grid of samples per pixel.
    #[arg(long)]
    pub supersample: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    #[arg(long, default_value_t = 256)]
    pub width: u32,

    #[arg(long, default_value_t = 256)]
    pub height: u32,

    #[arg(short = 'i', long, default_value_t = 200)]
    pub max_iterations: u32,

    /// Backends to run, comma separated.
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "fixed32,fixed64,bigfloat,rational"
    )]
    pub backends: Vec<Backend>,

    #[command(flatten)]
    pub backend_args: BackendArgs,

    #[arg(short, long, value_enum, default_value = "grayscale")]
    pub palette: PaletteKind,

    #[arg(long)]
    pub supersample: bool,

    /// Write one PNG per backend and zoom level into this directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Parse `xmin,ymin,xmax,ymax` into a validated window.
pub fn parse_window(s: &str) -> Result<PlaneWindow, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in window: {e}"))?;
    match parts.as_slice() {
        &[xmin, ymin, xmax, ymax] => {
            PlaneWindow::new(xmin, ymin, xmax, ymax).map_err(|e| e.to_string())
        }
        _ => Err(format!("expected 4 comma-separated values, got {}", parts.len())),
    }
}
