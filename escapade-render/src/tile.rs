use escapade_core::RasterSpec;

/// Default tile edge in pixels.
///
/// Small enough that a deep-zoom frame on a slow backend still spreads
/// over every rayon worker.
pub const TILE_SIZE: u32 = 32;

/// A rectangular block of pixels rendered as one unit of parallel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Pixel x of the top-left corner.
    pub x: u32,
    /// Pixel y of the top-left corner.
    pub y: u32,
    /// Tile width in pixels (may be smaller at the right edge).
    pub width: u32,
    /// Tile height in pixels (may be smaller at the bottom edge).
    pub height: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Absolute pixel coordinates covered by this tile, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |py| (self.x..self.x + self.width).map(move |px| (px, py)))
    }
}

/// Split a raster into tiles of at most `tile_size` pixels per edge.
pub fn build_tile_grid(raster: &RasterSpec, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < raster.height {
        let th = tile_size.min(raster.height - y);
        let mut x = 0;
        while x < raster.width {
            let tw = tile_size.min(raster.width - x);
            tiles.push(Tile {
                x,
                y,
                width: tw,
                height: th,
            });
            x += tw;
        }
        y += th;
    }
    tiles
}
