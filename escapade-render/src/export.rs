//! PNG export with embedded render metadata (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::ExportError;
use crate::renderer::RenderRequest;

const KEY_PREFIX: &str = "Escapade.";

/// Metadata to embed in an exported PNG as tEXt chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub formula: String,
    pub backend: String,
    pub window: [f64; 4],
    pub max_iterations: u32,
    pub palette: String,
    pub supersample: bool,
    pub elapsed_ms: Option<u128>,
}

impl ExportMetadata {
    pub fn from_request(request: &RenderRequest) -> Self {
        let w = &request.window;
        Self {
            formula: request.formula.name().to_string(),
            backend: request.backend.to_string(),
            window: [w.xmin, w.ymin, w.xmax, w.ymax],
            max_iterations: request.formula.max_iterations(),
            palette: request.palette.name().to_string(),
            supersample: request.supersample,
            elapsed_ms: None,
        }
    }

    pub fn with_elapsed_ms(self, elapsed_ms: u128) -> Self {
        Self {
            elapsed_ms: Some(elapsed_ms),
            ..self
        }
    }

    fn description(&self) -> String {
        let [xmin, ymin, xmax, ymax] = self.window;
        format!(
            "{} on {} - Window: ({xmin}, {ymin}) to ({xmax}, {ymax}), Iterations: {}",
            self.formula, self.backend, self.max_iterations,
        )
    }

    fn pairs(&self, width: u32, height: u32) -> Vec<(String, String)> {
        let [xmin, ymin, xmax, ymax] = self.window;
        let mut pairs = vec![
            ("Formula", self.formula.clone()),
            ("Backend", self.backend.clone()),
            ("Window", format!("{xmin},{ymin},{xmax},{ymax}")),
            ("MaxIterations", self.max_iterations.to_string()),
            ("Palette", self.palette.clone()),
            ("Supersample", self.supersample.to_string()),
            ("Resolution", format!("{width}x{height}")),
        ];
        if let Some(ms) = self.elapsed_ms {
            pairs.push(("ElapsedMs", ms.to_string()));
        }
        pairs
            .into_iter()
            .map(|(k, v)| (format!("{KEY_PREFIX}{k}"), v))
            .collect()
    }
}

/// Write a pixel buffer as an RGBA PNG with embedded render metadata.
///
/// Uses the `png` crate directly to inject tEXt chunks readable by
/// exiftool and most image viewers.
pub fn export_png(
    buffer: &PixelBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> Result<(), ExportError> {
    let expected = buffer.width as usize * buffer.height as usize * 4;
    if buffer.pixels.len() != expected {
        return Err(ExportError::BufferSize {
            expected,
            actual: buffer.pixels.len(),
        });
    }

    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "Escapade".to_string())?;
    encoder.add_text_chunk("Description".to_string(), metadata.description())?;
    for (key, value) in metadata.pairs(buffer.width, buffer.height) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.pixels)?;
    png_writer.finish()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}
