//! Inter-frame change detection.
//!
//! Consecutive LED frames are compared color by color. An unchanged frame
//! is not re-sent, which keeps the controller from redrawing (and the
//! network from carrying) identical data while the screen is static.

use crate::types::Frame;

/// Remembers the previous [`Frame`] and reports whether the next one differs.
///
/// The first frame seen (or the first after [`reset`](Self::reset)) always
/// counts as changed.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: Option<Frame>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cached frame, forcing the next frame to count as changed.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Whether `current` differs from the cached frame in any channel of
    /// any LED. A length mismatch counts as a change.
    pub fn is_changed(&self, current: &Frame) -> bool {
        match &self.previous {
            None => true,
            Some(prev) => prev != current,
        }
    }

    /// Replace the cached frame.
    pub fn update(&mut self, current: Frame) {
        self.previous = Some(current);
    }

    /// Compare against the cached frame, then cache `current`.
    pub fn observe(&mut self, current: Frame) -> bool {
        let changed = self.is_changed(&current);
        self.update(current);
        changed
    }

    pub fn previous(&self) -> Option<&Frame> {
        self.previous.as_ref()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn frame(colors: &[(u8, u8, u8)]) -> Frame {
        colors.iter().copied().map(Color::from).collect()
    }

    #[test]
    fn first_frame_is_changed() {
        let mut det = ChangeDetector::new();
        assert!(det.observe(frame(&[(0, 0, 0)])));
    }

    #[test]
    fn identical_frame_is_unchanged() {
        let mut det = ChangeDetector::new();
        let f = frame(&[(10, 20, 30), (40, 50, 60)]);
        assert!(det.observe(f.clone()));
        assert!(!det.observe(f.clone()));
        assert!(!det.observe(f));
    }

    #[test]
    fn single_channel_off_by_one_is_changed() {
        let base = [(10, 20, 30), (40, 50, 60), (70, 80, 90)];
        for led in 0..base.len() {
            for channel in 0..3 {
                let mut det = ChangeDetector::new();
                det.observe(frame(&base));

                let mut tweaked = base;
                let c = &mut tweaked[led];
                match channel {
                    0 => c.0 += 1,
                    1 => c.1 += 1,
                    _ => c.2 += 1,
                }
                assert!(det.observe(frame(&tweaked)), "led {led} channel {channel}");
            }
        }
    }

    #[test]
    fn length_change_is_changed() {
        let mut det = ChangeDetector::new();
        det.observe(frame(&[(1, 1, 1)]));
        assert!(det.observe(frame(&[(1, 1, 1), (1, 1, 1)])));
    }

    #[test]
    fn is_changed_does_not_update() {
        let mut det = ChangeDetector::new();
        let f = frame(&[(5, 5, 5)]);
        assert!(det.is_changed(&f));
        assert!(det.is_changed(&f));
        det.update(f.clone());
        assert!(!det.is_changed(&f));
        assert_eq!(det.previous(), Some(&f));
    }

    #[test]
    fn reset_forces_change() {
        let mut det = ChangeDetector::new();
        let f = frame(&[(9, 9, 9)]);
        det.observe(f.clone());
        det.reset();
        assert!(det.observe(f));
    }
}
