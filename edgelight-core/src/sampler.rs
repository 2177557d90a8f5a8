//! Reduces the pixels inside a [`Region`] to one representative color.

use crate::types::{Color, PixelBuffer, Region};

/// How densely a region is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    /// Pixel stride in both axes when averaging. `0` is treated as `1`.
    pub sample_step: u32,
    /// Read only the center pixel instead of averaging.
    pub low_resource_mode: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample_step: 4,
            low_resource_mode: false,
        }
    }
}

/// Clamped `[left, right) × [top, bottom)` intersection with the buffer.
struct Bounds {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

fn clamp_to_buffer(buf: &PixelBuffer, region: &Region) -> Option<Bounds> {
    let left = i64::from(region.left()).max(0);
    let top = i64::from(region.top()).max(0);
    let right = region.right().min(i64::from(buf.width()));
    let bottom = region.bottom().min(i64::from(buf.height()));
    if right <= left || bottom <= top {
        return None;
    }
    // All four values now lie in [0, dim], so they fit in u32.
    Some(Bounds {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    })
}

/// Sample `region` of `buf`.
///
/// An empty intersection with the buffer yields black. In low-resource
/// mode the clamped region's center pixel is returned as-is; otherwise
/// every `sample_step`-th pixel in both axes is averaged with truncating
/// integer division.
pub fn sample_region(buf: &PixelBuffer, region: &Region, config: &SampleConfig) -> Color {
    let Some(b) = clamp_to_buffer(buf, region) else {
        return Color::BLACK;
    };

    if config.low_resource_mode {
        let w = (b.right - b.left).max(1);
        let h = (b.bottom - b.top).max(1);
        let x = (b.left + w / 2).min(buf.width() - 1);
        let y = (b.top + h / 2).min(buf.height() - 1);
        return buf.pixel(x, y).unwrap_or(Color::BLACK);
    }

    let step = config.sample_step.max(1) as usize;
    let (mut r, mut g, mut bl, mut count) = (0u64, 0u64, 0u64, 0u64);
    for y in (b.top..b.bottom).step_by(step) {
        for x in (b.left..b.right).step_by(step) {
            if let Some(px) = buf.pixel(x, y) {
                r += u64::from(px.r);
                g += u64::from(px.g);
                bl += u64::from(px.b);
                count += 1;
            }
        }
    }

    if count == 0 {
        return Color::BLACK;
    }
    // Averages of u8 samples always fit back into u8.
    Color::new((r / count) as u8, (g / count) as u8, (bl / count) as u8)
}

// ── Tests ────────────────────────────────────────────────────────
