pub mod aa;
pub mod buffer;
pub mod error;
pub mod export;
pub mod palette;
pub mod renderer;
pub mod tile;

pub use aa::{average_colors, Sampler};
pub use buffer::PixelBuffer;
pub use error::{ExportError, RenderError};
pub use export::{export_png, ExportMetadata};
pub use palette::{ycbcr_to_rgb, Palette};
pub use renderer::{render, render_with, Formula, RenderOutput, RenderRequest};
pub use tile::TILE_SIZE;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
