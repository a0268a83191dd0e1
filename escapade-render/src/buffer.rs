use crate::tile::Tile;

/// An RGBA pixel buffer holding a finished render.
///
/// Every pixel is fully opaque. The buffer is written once by the raster
/// driver and is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer filled with black (opaque).
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// The RGBA value at `(x, y)`, or `None` outside the buffer.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Iterate over pixels in row-major order.
    pub fn iter_pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Copy a tile's RGBA data into its position in the buffer.
    pub(crate) fn blit_tile(&mut self, tile: &Tile, tile_pixels: &[u8]) {
        debug_assert_eq!(tile_pixels.len(), tile.pixel_count() * 4);
        let stride = self.width as usize * 4;
        let row_len = tile.width as usize * 4;
        for (row, src) in tile_pixels.chunks_exact(row_len).enumerate() {
            let dst_start = (tile.y as usize + row) * stride + tile.x as usize * 4;
            self.pixels[dst_start..dst_start + row_len].copy_from_slice(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_opaque() {
        let buf = PixelBuffer::new(4, 4);
        assert_eq!(buf.pixels.len(), 4 * 4 * 4);
        assert!(buf.iter_pixels().all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn get_pixel_bounds() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.get_pixel(2, 1), Some([0, 0, 0, 255]));
        assert_eq!(buf.get_pixel(3, 0), None);
        assert_eq!(buf.get_pixel(0, 2), None);
    }

    #[test]
    fn blit_tile_writes_correct_region() {
        let mut buf = PixelBuffer::new(8, 8);
        let tile = Tile {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
        };
        let red = [255, 0, 0, 255].repeat(tile.pixel_count());
        buf.blit_tile(&tile, &red);

        assert_eq!(buf.get_pixel(2, 1), Some([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(4, 2), Some([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(5, 1), Some([0, 0, 0, 255]));
        assert_eq!(buf.get_pixel(0, 0), Some([0, 0, 0, 255]));
    }
}
