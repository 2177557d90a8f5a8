//! Shared types for the capture → LED pipeline.
//!
//! [`PixelBuffer`] is the raw captured surface; [`Region`] addresses a
//! rectangle of it; [`Color`] and [`Frame`] are what the sampler hands to
//! the rest of the pipeline.

use std::ops::Deref;

use crate::error::EdgeError;

// ── Color ────────────────────────────────────────────────────────

/// An 8-bit RGB color. No alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

// ── Frame ────────────────────────────────────────────────────────

/// One color per LED, in canonical (bottom → right → top → left) order
/// until the transformer remaps it to physical order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame(Vec<Color>);

impl Frame {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    pub fn into_inner(self) -> Vec<Color> {
        self.0
    }
}

impl Deref for Frame {
    type Target = [Color];

    fn deref(&self) -> &[Color] {
        &self.0
    }
}

impl From<Vec<Color>> for Frame {
    fn from(colors: Vec<Color>) -> Self {
        Self(colors)
    }
}

impl FromIterator<Color> for Frame {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Region ───────────────────────────────────────────────────────

/// Axis-aligned sampling rectangle in buffer pixel coordinates.
///
/// The origin may lie outside the buffer (oversized margins do that); the
/// sampler clamps. Width and height are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

impl Region {
    /// Returns `None` if either dimension is zero.
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Build a region from unchecked layout arithmetic, forcing each
    /// dimension to at least one pixel and saturating into `i32`.
    pub(crate) fn saturating(left: i64, top: i64, width: i64, height: i64) -> Self {
        let to_i32 = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let to_len = |v: i64| v.clamp(1, i64::from(u32::MAX)) as u32;
        Self {
            left: to_i32(left),
            top: to_i32(top),
            width: to_len(width),
            height: to_len(height),
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.left) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.top) + i64::from(self.height)
    }
}

// ── PixelFormat ──────────────────────────────────────────────────

/// Channel order of a captured surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 bytes per pixel: Blue, Green, Red, Alpha (DXGI default).
    Bgra8,
    /// 4 bytes per pixel: Red, Green, Blue, Alpha.
    Rgba8,
    /// 3 bytes per pixel: Red, Green, Blue.
    Rgb8,
}

impl PixelFormat {
    /// Bytes consumed by a single pixel in this format.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8 | PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }

    fn decode(self, px: &[u8]) -> Color {
        match self {
            PixelFormat::Bgra8 => Color::new(px[2], px[1], px[0]),
            PixelFormat::Rgba8 | PixelFormat::Rgb8 => Color::new(px[0], px[1], px[2]),
        }
    }
}

// ── PixelBuffer ──────────────────────────────────────────────────

/// A raw, uncompressed screen capture.
///
/// The `data` buffer holds `height` rows of `stride` bytes each. `stride`
/// may exceed `width * bytes_per_pixel` because GPU staging textures pad
/// rows. All accessors are bounds-checked; nothing downstream can read
/// outside the allocation.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap captured bytes, checking that the geometry fits the storage.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, EdgeError> {
        let row_bytes = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(EdgeError::InvalidBuffer("row size overflows"))?;
        if stride < row_bytes {
            return Err(EdgeError::InvalidBuffer("stride shorter than one row"));
        }
        let needed = stride
            .checked_mul(height as usize)
            .ok_or(EdgeError::InvalidBuffer("surface size overflows"))?;
        if data.len() < needed {
            return Err(EdgeError::InvalidBuffer("data shorter than stride * height"));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// A tightly packed buffer filled with one color.
    pub fn solid(width: u32, height: u32, format: PixelFormat, color: Color) -> Self {
        let bpp = format.bytes_per_pixel();
        let px: [u8; 4] = match format {
            PixelFormat::Bgra8 => [color.b, color.g, color.r, 0xFF],
            PixelFormat::Rgba8 => [color.r, color.g, color.b, 0xFF],
            PixelFormat::Rgb8 => [color.r, color.g, color.b, 0],
        };
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * bpp);
        for _ in 0..count {
            data.extend_from_slice(&px[..bpp]);
        }
        Self {
            width,
            height,
            stride: width as usize * bpp,
            format,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The visible bytes of row `y` (padding excluded).
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        self.data.get(start..start + len)
    }

    /// Color of the pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = x as usize * bpp;
        self.row(y)?
            .get(offset..offset + bpp)
            .map(|px| self.format.decode(px))
    }

    /// Overwrite one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = y as usize * self.stride + x as usize * bpp;
        let Some(px) = self.data.get_mut(offset..offset + bpp) else {
            return;
        };
        match self.format {
            PixelFormat::Bgra8 => {
                px[0] = color.b;
                px[1] = color.g;
                px[2] = color.r;
            }
            PixelFormat::Rgba8 | PixelFormat::Rgb8 => {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_rejects_zero_size() {
        assert!(Region::new(0, 0, 0, 5).is_none());
        assert!(Region::new(0, 0, 5, 0).is_none());
        let r = Region::new(-3, 2, 4, 1).unwrap();
        assert_eq!(r.right(), 1);
        assert_eq!(r.bottom(), 3);
    }

    #[test]
    fn saturating_region_forces_one_pixel() {
        let r = Region::saturating(10, 10, 0, -7);
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 1);
    }

    #[test]
    fn buffer_rejects_short_data() {
        let err = PixelBuffer::new(4, 4, 16, PixelFormat::Bgra8, vec![0; 63]).unwrap_err();
        assert!(matches!(err, EdgeError::InvalidBuffer(_)));

        let err = PixelBuffer::new(4, 4, 8, PixelFormat::Bgra8, vec![0; 64]).unwrap_err();
        assert!(matches!(err, EdgeError::InvalidBuffer(_)));
    }

    #[test]
    fn bgra_channel_order() {
        let buf = PixelBuffer::new(1, 1, 4, PixelFormat::Bgra8, vec![10, 20, 30, 255]).unwrap();
        assert_eq!(buf.pixel(0, 0), Some(Color::new(30, 20, 10)));
    }

    #[test]
    fn padded_stride_is_respected() {
        // 2×2 RGB with 8-byte rows (2 bytes padding each).
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
            7, 8, 9, 10, 11, 12, 0xEE, 0xEE,
        ];
        let buf = PixelBuffer::new(2, 2, 8, PixelFormat::Rgb8, data).unwrap();
        assert_eq!(buf.pixel(1, 1), Some(Color::new(10, 11, 12)));
        assert_eq!(buf.row(1).unwrap().len(), 6);
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }

    #[test]
    fn set_pixel_roundtrips_through_format() {
        let mut buf = PixelBuffer::solid(3, 3, PixelFormat::Bgra8, Color::BLACK);
        buf.set_pixel(2, 1, Color::new(200, 100, 50));
        assert_eq!(buf.pixel(2, 1), Some(Color::new(200, 100, 50)));
        assert_eq!(buf.pixel(1, 1), Some(Color::BLACK));
        buf.set_pixel(9, 9, Color::new(1, 1, 1));
    }
}
