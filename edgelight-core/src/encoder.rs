//! Wire encoding for the LED controller.
//!
//! ## Wire format
//!
//! ASCII decimal channel values, comma separated, three per LED in
//! transmission order:
//!
//! ```text
//! R0,G0,B0,R1,G1,B1,...,Rn,Gn,Bn
//! ```
//!
//! No header, length prefix, terminator or trailing comma. An empty frame
//! encodes to an empty payload.

use std::fmt::Write;

use crate::types::Color;

/// Worst case bytes per LED: `255,255,255,`.
const MAX_BYTES_PER_LED: usize = 12;

/// Encode `frame` into a datagram payload.
pub fn encode_frame(frame: &[Color]) -> Vec<u8> {
    let mut out = String::with_capacity(frame.len() * MAX_BYTES_PER_LED);
    for (i, c) in frame.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{},{},{}", c.r, c.g, c.b).ok();
    }
    out.into_bytes()
}

// ── Tests ────────────────────────────────────────────────────────
