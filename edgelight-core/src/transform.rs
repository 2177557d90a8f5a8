//! Canonical → physical LED order.
//!
//! The strip's LED 0 rarely sits at the bottom-left corner, and the strip
//! may run either way round the display. The transformer rotates the
//! canonical frame by `offset` and reverses it for counter-clockwise
//! strips. The reversal is applied to the whole array after the rotation.

use crate::types::{Color, Frame};

/// How canonical order maps onto the physical ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmissionConfig {
    /// Canonical index that becomes physical index 0. May be negative or
    /// larger than the LED count.
    pub offset: i64,
    /// Winding direction of the physical strip.
    pub clockwise: bool,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            offset: 19,
            clockwise: false,
        }
    }
}

impl TransmissionConfig {
    /// `offset` reduced into `[0, len)`. Zero for an empty frame.
    pub fn normalized_offset(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // `len` is an LED count; it always fits in i64.
        self.offset.rem_euclid(len as i64) as usize
    }

    pub fn direction_label(&self) -> &'static str {
        if self.clockwise { "CW" } else { "CCW" }
    }
}

/// Reorder `frame` into transmission order.
pub fn to_physical_order(frame: &[Color], config: &TransmissionConfig) -> Frame {
    let shift = config.normalized_offset(frame.len());
    let mut out = Vec::with_capacity(frame.len());
    out.extend_from_slice(&frame[shift..]);
    out.extend_from_slice(&frame[..shift]);
    if !config.clockwise {
        out.reverse();
    }
    Frame::new(out)
}

// ── Tests ────────────────────────────────────────────────────────
