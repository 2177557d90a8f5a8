//! HSV-domain saturation boost.
//!
//! Dull screen colors look washed out on LEDs. The booster scales HSV
//! saturation while keeping hue and value, and leaves near-black colors
//! alone so capture noise in dark scenes is not amplified.

use crate::types::Color;

/// Saturation boost settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostConfig {
    pub enabled: bool,
    /// Saturation multiplier. `1.0` is a no-op.
    pub factor: f64,
    /// Colors whose HSV value is at or below this (0..1) pass through.
    pub min_value: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 1.35,
            min_value: 0.07,
        }
    }
}

impl BoostConfig {
    /// Apply the boost if enabled.
    pub fn apply(&self, color: Color) -> Color {
        if self.enabled {
            boost_saturation(color, self.factor, self.min_value)
        } else {
            color
        }
    }
}

/// Multiply the saturation of `color` by `factor`, clamped to `[0, 1]`.
///
/// Pure and deterministic: the same inputs always give the same bits.
/// Channels are rounded half-to-even.
pub fn boost_saturation(color: Color, factor: f64, min_value: f64) -> Color {
    let r = f64::from(color.r) / 255.0;
    let g = f64::from(color.g) / 255.0;
    let b = f64::from(color.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    let delta = max - min;

    if v <= min_value {
        return color;
    }

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };
    if h < 0.0 {
        h += 360.0;
    }

    let s = (s * factor).clamp(0.0, 1.0);
    hsv_to_rgb(h, s, v)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Color {
    let c = v * s;
    let x = c * (1.0 - (((h / 60.0) % 2.0) - 1.0).abs());
    let m = v - c;
    let (rp, gp, bp) = match h {
        h if (0.0..60.0).contains(&h) => (c, x, 0.0),
        h if (60.0..120.0).contains(&h) => (x, c, 0.0),
        h if (120.0..180.0).contains(&h) => (0.0, c, x),
        h if (180.0..240.0).contains(&h) => (0.0, x, c),
        h if (240.0..300.0).contains(&h) => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color::new(to_channel(rp + m), to_channel(gp + m), to_channel(bp + m))
}

fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round_ties_even().clamp(0.0, 255.0) as u8
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn within_one(a: Color, b: Color) -> bool {
        a.r.abs_diff(b.r) <= 1 && a.g.abs_diff(b.g) <= 1 && a.b.abs_diff(b.b) <= 1
    }

    fn palette() -> Vec<Color> {
        let mut colors = Vec::new();
        for r in (0..=255u16).step_by(51) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(51) {
                    colors.push(Color::new(r as u8, g as u8, b as u8));
                }
            }
        }
        colors.extend([
            Color::new(255, 0, 0),
            Color::new(12, 200, 77),
            Color::new(90, 91, 92),
            Color::new(1, 250, 249),
        ]);
        colors
    }

    #[test]
    fn unit_factor_is_identity_up_to_rounding() {
        for c in palette() {
            let out = boost_saturation(c, 1.0, 0.07);
            assert!(within_one(out, c), "{c:?} -> {out:?}");
        }
    }

    #[test]
    fn dark_colors_pass_through() {
        // 0.07 * 255 = 17.85 → value 17 is dark, 18 is not.
        let dark = Color::new(17, 2, 9);
        assert_eq!(boost_saturation(dark, 3.0, 0.07), dark);
        assert_eq!(boost_saturation(Color::BLACK, 3.0, 0.0), Color::BLACK);

        let lit = Color::new(18, 2, 9);
        assert_ne!(boost_saturation(lit, 3.0, 0.07), lit);
    }

    #[test]
    fn grey_stays_grey() {
        let grey = Color::new(128, 128, 128);
        assert_eq!(boost_saturation(grey, 2.0, 0.07), grey);
    }

    #[test]
    fn boost_increases_saturation() {
        let dull = Color::new(200, 150, 150);
        let out = boost_saturation(dull, 1.35, 0.07);
        // Value (max channel) is preserved, the others drop.
        assert_eq!(out.r, 200);
        assert!(out.g < 150);
        assert_eq!(out.g, out.b);
    }

    #[test]
    fn saturation_clamps_at_one() {
        let out = boost_saturation(Color::new(200, 100, 100), 10.0, 0.0);
        assert_eq!(out, Color::new(200, 0, 0));
    }

    #[test]
    fn zero_factor_removes_color() {
        let out = boost_saturation(Color::new(30, 200, 90), 0.0, 0.0);
        assert_eq!(out, Color::new(200, 200, 200));
    }

    #[test]
    fn hue_sectors_are_preserved() {
        // Pure secondaries survive any boost unchanged.
        for c in [
            Color::new(255, 255, 0),
            Color::new(0, 255, 255),
            Color::new(255, 0, 255),
        ] {
            assert_eq!(boost_saturation(c, 1.5, 0.07), c);
        }
    }

    #[test]
    fn deterministic() {
        let c = Color::new(123, 45, 210);
        assert_eq!(boost_saturation(c, 1.35, 0.07), boost_saturation(c, 1.35, 0.07));
    }

    #[test]
    fn disabled_config_is_identity() {
        let cfg = BoostConfig {
            enabled: false,
            ..BoostConfig::default()
        };
        let c = Color::new(200, 150, 150);
        assert_eq!(cfg.apply(c), c);
        assert_ne!(BoostConfig::default().apply(c), c);
    }
}
