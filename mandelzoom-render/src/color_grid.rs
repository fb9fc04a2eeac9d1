use crate::color::Color;
use crate::count_grid::CountGrid;
use crate::error::RenderError;

/// One color per pixel, row-major, same shape as the [`CountGrid`] it was
/// produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGrid {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ColorGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> crate::Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RenderError::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Shape taken from `counts`; caller guarantees one color per count.
    pub(crate) fn from_counts_shape(counts: &CountGrid, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), counts.len());
        Self {
            width: counts.width(),
            height: counts.height(),
            pixels,
        }
    }

    /// A grid of a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Packed `RGBRGB…` bytes, the layout image encoders expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.channels()).collect()
    }

    /// Packed `RGBA` bytes with alpha fixed at 255.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            out.extend_from_slice(&c.channels());
            out.push(255);
        }
        out
    }
}
