//! Maps display geometry onto LED-aligned sampling regions.
//!
//! Regions are emitted in **canonical order**, which never depends on the
//! strip's offset or winding:
//!
//! ```text
//!            ◄──── top (right → left) ────
//!          ┌───────────────────────────────┐
//!        │ │                               │ ▲
//!   left │ │                               │ │ right
//! (top → │ │                               │ │ (bottom → top)
//! bottom)▼ │                               │
//!          └───────────────────────────────┘
//!            ──── bottom (left → right) ───►
//! ```
//!
//! Each edge's inner span (capture extent minus margins) is split with
//! floor division; slot `i` starts at `span * i / count` and is
//! `span / count` long. The remainder is not redistributed.

use crate::types::Region;

/// Strip thickness is `1/STRIP_DIVISOR` of the perpendicular screen dimension.
const STRIP_DIVISOR: i64 = 40;

// ── LedLayout ────────────────────────────────────────────────────

/// LED count along each display edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeCounts {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Pixels excluded from each capture edge before partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Physical arrangement of the strip around the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedLayout {
    pub leds: EdgeCounts,
    pub margins: Margins,
}

impl LedLayout {
    pub fn total_leds(&self) -> usize {
        self.leds.top as usize
            + self.leds.bottom as usize
            + self.leds.left as usize
            + self.leds.right as usize
    }
}

// ── Mapping ──────────────────────────────────────────────────────

/// Compute the canonical region list for a `width × height` capture.
///
/// Always returns exactly [`LedLayout::total_leds`] regions. When a span
/// is too short to give every LED a pixel, or margins swallow the whole
/// surface, the affected regions collapse to 1×1 and are left for the
/// sampler to clamp.
pub fn map_regions(layout: &LedLayout, width: u32, height: u32) -> Vec<Region> {
    let w = i64::from(width);
    let h = i64::from(height);
    let m = &layout.margins;
    let (mt, mb, ml, mr) = (
        i64::from(m.top),
        i64::from(m.bottom),
        i64::from(m.left),
        i64::from(m.right),
    );

    let h_span = w - ml - mr;
    let v_span = h - mt - mb;
    let strip_h = (h / STRIP_DIVISOR).max(1);
    let strip_w = (w / STRIP_DIVISOR).max(1);

    let mut regions = Vec::with_capacity(layout.total_leds());

    // Bottom: left → right.
    let count = i64::from(layout.leds.bottom);
    for i in 0..count {
        regions.push(Region::saturating(
            ml + h_span * i / count,
            h - mb - strip_h,
            h_span / count,
            strip_h,
        ));
    }

    // Right: bottom → top.
    let count = i64::from(layout.leds.right);
    for i in 0..count {
        regions.push(Region::saturating(
            w - mr - strip_w,
            h - mb - v_span * (i + 1) / count,
            strip_w,
            v_span / count,
        ));
    }

    // Top: right → left.
    let count = i64::from(layout.leds.top);
    for i in (0..count).rev() {
        regions.push(Region::saturating(
            ml + h_span * i / count,
            mt,
            h_span / count,
            strip_h,
        ));
    }

    // Left: top → bottom.
    let count = i64::from(layout.leds.left);
    for i in 0..count {
        regions.push(Region::saturating(
            ml,
            mt + v_span * i / count,
            strip_w,
            v_span / count,
        ));
    }

    regions
}

// ── LayoutCache ──────────────────────────────────────────────────

/// Memoizes [`map_regions`] for the last seen capture size.
#[derive(Debug, Clone)]
pub struct LayoutCache {
    layout: LedLayout,
    dims: Option<(u32, u32)>,
    regions: Vec<Region>,
}

impl LayoutCache {
    pub fn new(layout: LedLayout) -> Self {
        Self {
            layout,
            dims: None,
            regions: Vec::new(),
        }
    }

    pub fn layout(&self) -> &LedLayout {
        &self.layout
    }

    /// Regions for a `width × height` surface, recomputed only when the
    /// size differs from the previous call.
    pub fn regions_for(&mut self, width: u32, height: u32) -> &[Region] {
        if self.dims != Some((width, height)) {
            self.regions = map_regions(&self.layout, width, height);
            self.dims = Some((width, height));
            tracing::debug!(
                width,
                height,
                regions = self.regions.len(),
                "recomputed sampling regions"
            );
        }
        &self.regions
    }
}

// ── Tests ────────────────────────────────────────────────────────
