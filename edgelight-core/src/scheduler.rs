//! The per-tick pipeline driver.
//!
//! Orchestrates one tick:
//!
//! 1. [`FrameSource`] captures the screen.
//! 2. [`LayoutCache`] supplies the canonical sampling regions.
//! 3. [`sample_region`] and [`BoostConfig::apply`] reduce each region to a color.
//! 4. [`ChangeDetector`] decides whether the frame is worth sending.
//! 5. [`to_physical_order`] and [`encode_frame`] build the datagram.
//! 6. [`LedSink`] sends it.
//!
//! then sleeps out the rest of the frame budget. Ticks that overrun the
//! budget are followed immediately by the next one; nothing is queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::boost::BoostConfig;
use crate::capture::FrameSource;
use crate::delta::ChangeDetector;
use crate::encoder::encode_frame;
use crate::error::EdgeError;
use crate::layout::{LayoutCache, LedLayout};
use crate::sampler::{SampleConfig, sample_region};
use crate::throttle::LogThrottle;
use crate::transform::{TransmissionConfig, to_physical_order};
use crate::transport::LedSink;
use crate::types::{Frame, PixelBuffer};

// ── PipelineConfig ───────────────────────────────────────────────

/// Immutable settings for a [`FrameScheduler`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub layout: LedLayout,
    pub sampling: SampleConfig,
    pub boost: BoostConfig,
    pub transmission: TransmissionConfig,
    /// Target frames per second (≥ 1).
    pub target_fps: u32,
}

impl PipelineConfig {
    /// Time allotted to one tick: `1000 / target_fps` whole milliseconds.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.target_fps.max(1)))
    }
}

// ── TickOutcome ──────────────────────────────────────────────────

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A changed frame was sent.
    Sent { bytes: usize },
    /// The frame matched the previous one; nothing was sent.
    Unchanged,
    /// The frame changed but the send failed. It is dropped.
    SendFailed,
    /// The source had no new surface this tick.
    NoFrame,
}

// ── StopHandle ───────────────────────────────────────────────────

/// Cloneable handle that ends [`FrameScheduler::run`] at the next tick
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── FrameScheduler ───────────────────────────────────────────────

/// Drives capture → sample → boost → detect → transform → encode → send
/// at the configured cadence.
pub struct FrameScheduler<S, K> {
    source: S,
    sink: K,
    config: PipelineConfig,
    regions: LayoutCache,
    detector: ChangeDetector,
    info_log: LogThrottle,
    warn_log: LogThrottle,
    stop: StopHandle,
    sent_since_log: u64,
}

impl<S: FrameSource, K: LedSink> FrameScheduler<S, K> {
    pub fn new(source: S, sink: K, config: PipelineConfig) -> Self {
        Self {
            source,
            sink,
            regions: LayoutCache::new(config.layout),
            config,
            detector: ChangeDetector::new(),
            info_log: LogThrottle::per_second(),
            warn_log: LogThrottle::per_second(),
            stop: StopHandle::default(),
            sent_since_log: 0,
        }
    }

    /// Share an existing stop handle, e.g. one already wired to Ctrl-C.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// A handle that can stop the loop from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The most recently built frame, in canonical order.
    pub fn previous_frame(&self) -> Option<&Frame> {
        self.detector.previous()
    }

    /// Sample and boost every region of `buffer` into a canonical frame.
    pub fn build_frame(&mut self, buffer: &PixelBuffer) -> Frame {
        let sampling = self.config.sampling;
        let boost = self.config.boost;
        self.regions
            .regions_for(buffer.width(), buffer.height())
            .iter()
            .map(|region| boost.apply(sample_region(buffer, region, &sampling)))
            .collect()
    }

    /// Run one tick without pacing.
    ///
    /// A send failure is logged (throttled) and reported as
    /// [`TickOutcome::SendFailed`]; the frame still replaces the cached
    /// previous frame. Only a capture error that is not
    /// [transient](EdgeError::is_transient) is returned as `Err`.
    pub async fn tick(&mut self) -> Result<TickOutcome, EdgeError> {
        let buffer = match self.source.capture_frame() {
            Ok(buffer) => buffer,
            Err(e) if e.is_transient() => {
                debug!("capture skipped: {e}");
                return Ok(TickOutcome::NoFrame);
            }
            Err(e) => return Err(e),
        };
        let frame = self.build_frame(&buffer);
        drop(buffer);

        let payload = self
            .detector
            .is_changed(&frame)
            .then(|| encode_frame(&to_physical_order(&frame, &self.config.transmission)));
        self.detector.update(frame);

        let Some(payload) = payload else {
            return Ok(TickOutcome::Unchanged);
        };

        match self.sink.send_payload(&payload).await {
            Ok(bytes) => {
                self.sent_since_log += 1;
                if self.info_log.allow() {
                    let tx = &self.config.transmission;
                    info!(
                        "sent {} colors to {} (offset {}, direction {}, {} frames since last report)",
                        self.config.layout.total_leds(),
                        self.sink.describe(),
                        tx.offset,
                        tx.direction_label(),
                        self.sent_since_log,
                    );
                    self.sent_since_log = 0;
                }
                Ok(TickOutcome::Sent { bytes })
            }
            Err(e) => {
                if self.warn_log.allow() {
                    let suppressed = self.warn_log.take_suppressed();
                    warn!(suppressed, "UDP send error: {e}");
                }
                Ok(TickOutcome::SendFailed)
            }
        }
    }

    /// Run ticks until the [`StopHandle`] fires or capture fails fatally.
    pub async fn run(&mut self) -> Result<(), EdgeError> {
        let budget = self.config.frame_budget();
        info!(
            leds = self.config.layout.total_leds(),
            fps = self.config.target_fps,
            budget_ms = budget.as_millis() as u64,
            controller = %self.sink.describe(),
            "frame scheduler running"
        );

        while !self.stop.is_stopped() {
            let tick_start = Instant::now();
            self.tick().await?;
            pace(tick_start, budget).await;
        }

        info!("frame scheduler stopped");
        Ok(())
    }
}

/// Sleep for the remainder of the frame budget, if any is left.
async fn pace(tick_start: Instant, budget: Duration) {
    let elapsed = tick_start.elapsed();
    if elapsed < budget {
        tokio::time::sleep(budget - elapsed).await;
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{EdgeCounts, Margins};
    use crate::types::{Color, PixelFormat};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays scripted capture results, then repeats the last buffer.
    struct Scripted {
        script: VecDeque<Result<PixelBuffer, EdgeError>>,
        last: Option<PixelBuffer>,
    }

    impl Scripted {
        fn new(script: Vec<Result<PixelBuffer, EdgeError>>) -> Self {
            Self {
                script: script.into(),
                last: None,
            }
        }
    }

    impl FrameSource for Scripted {
        fn capture_frame(&mut self) -> Result<PixelBuffer, EdgeError> {
            match self.script.pop_front() {
                Some(Ok(buf)) => {
                    self.last = Some(buf.clone());
                    Ok(buf)
                }
                Some(Err(e)) => Err(e),
                None => self.last.clone().ok_or(EdgeError::NoDisplay),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        payloads: Vec<Vec<u8>>,
        fail: bool,
    }

    #[async_trait]
    impl LedSink for Recorder {
        async fn send_payload(&mut self, payload: &[u8]) -> Result<usize, EdgeError> {
            if self.fail {
                return Err(EdgeError::Send(std::io::Error::other("network unreachable")));
            }
            self.payloads.push(payload.to_vec());
            Ok(payload.len())
        }

        fn describe(&self) -> String {
            "recorder".into()
        }
    }

    /// Returns a solid surface after an optional delay, recording when
    /// each capture started, and stops the loop after `limit` captures.
    struct Metronome {
        starts: Vec<Instant>,
        delay: Duration,
        limit: usize,
        stop: StopHandle,
    }

    impl Metronome {
        fn new(limit: usize, delay: Duration, stop: StopHandle) -> Self {
            Self {
                starts: Vec::new(),
                delay,
                limit,
                stop,
            }
        }

        fn gaps(&self) -> Vec<Duration> {
            self.starts.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    impl FrameSource for Metronome {
        fn capture_frame(&mut self) -> Result<PixelBuffer, EdgeError> {
            self.starts.push(Instant::now());
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            if self.starts.len() >= self.limit {
                self.stop.stop();
            }
            Ok(solid(Color::new(5, 5, 5)))
        }
    }

    fn config(fps: u32) -> PipelineConfig {
        PipelineConfig {
            layout: LedLayout {
                leds: EdgeCounts {
                    top: 2,
                    bottom: 2,
                    left: 1,
                    right: 1,
                },
                margins: Margins::default(),
            },
            sampling: SampleConfig {
                sample_step: 1,
                low_resource_mode: false,
            },
            boost: BoostConfig {
                enabled: false,
                ..BoostConfig::default()
            },
            transmission: TransmissionConfig {
                offset: 0,
                clockwise: true,
            },
            target_fps: fps,
        }
    }

    fn solid(c: Color) -> PixelBuffer {
        PixelBuffer::solid(80, 40, PixelFormat::Bgra8, c)
    }

    #[test]
    fn frame_budget_is_whole_milliseconds() {
        assert_eq!(config(60).frame_budget(), Duration::from_millis(16));
        assert_eq!(config(40).frame_budget(), Duration::from_millis(25));
        assert_eq!(config(1).frame_budget(), Duration::from_secs(1));
        assert_eq!(config(0).frame_budget(), Duration::from_secs(1));
    }

    #[test]
    fn built_frame_has_one_color_per_led() {
        let red = Color::new(200, 10, 10);
        let mut s = FrameScheduler::new(Scripted::new(vec![]), Recorder::default(), config(60));
        let frame = s.build_frame(&solid(red));
        assert_eq!(frame.len(), 6);
        assert!(frame.iter().all(|&c| c == red));
    }

    #[tokio::test]
    async fn sends_only_on_change() {
        let a = solid(Color::new(1, 2, 3));
        let b = solid(Color::new(1, 2, 4));
        let source = Scripted::new(vec![Ok(a.clone()), Ok(a), Ok(b)]);
        let mut s = FrameScheduler::new(source, Recorder::default(), config(60));

        assert_eq!(s.tick().await.unwrap(), TickOutcome::Sent { bytes: 6 * 6 - 1 });
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Unchanged);
        assert!(matches!(s.tick().await.unwrap(), TickOutcome::Sent { .. }));

        let sent = &s.sink().payloads;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], b"1,2,3,1,2,3,1,2,3,1,2,3,1,2,3,1,2,3");
        assert_eq!(sent[1], b"1,2,4,1,2,4,1,2,4,1,2,4,1,2,4,1,2,4");
    }

    #[tokio::test]
    async fn send_failure_is_absorbed_and_cache_updates() {
        let a = solid(Color::new(9, 9, 9));
        let sink = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut s = FrameScheduler::new(Scripted::new(vec![Ok(a)]), sink, config(60));

        assert_eq!(s.tick().await.unwrap(), TickOutcome::SendFailed);
        assert!(s.previous_frame().is_some());
        // Same surface again: the failed frame was still cached.
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Unchanged);
    }

    #[tokio::test]
    async fn timeout_is_no_frame() {
        let source = Scripted::new(vec![Err(EdgeError::Timeout(Duration::from_millis(16)))]);
        let mut s = FrameScheduler::new(source, Recorder::default(), config(60));
        assert_eq!(s.tick().await.unwrap(), TickOutcome::NoFrame);
        assert!(s.previous_frame().is_none());
    }

    #[tokio::test]
    async fn capture_failure_ends_run() {
        let source = Scripted::new(vec![Err(EdgeError::Capture("device removed".into()))]);
        let mut s = FrameScheduler::new(source, Recorder::default(), config(60));
        let err = s.run().await.unwrap_err();
        assert!(matches!(err, EdgeError::Capture(_)));
    }

    #[tokio::test]
    async fn stopped_scheduler_does_not_tick() {
        let mut s = FrameScheduler::new(Scripted::new(vec![]), Recorder::default(), config(60));
        s.stop_handle().stop();
        s.run().await.unwrap();
        assert!(s.sink().payloads.is_empty());
    }

    #[test]
    fn stop_handle_is_shared() {
        let s = FrameScheduler::new(Scripted::new(vec![]), Recorder::default(), config(60));
        let h = s.stop_handle();
        assert!(!h.is_stopped());
        h.clone().stop();
        assert!(s.stop_handle().is_stopped());
    }

    #[tokio::test]
    async fn external_stop_handle_is_honoured() {
        let stop = StopHandle::default();
        let mut s = FrameScheduler::new(Scripted::new(vec![]), Recorder::default(), config(60))
            .with_stop_handle(stop.clone());
        stop.stop();
        s.run().await.unwrap();
        assert!(s.previous_frame().is_none());
    }

    #[tokio::test]
    async fn run_sleeps_out_the_frame_budget() {
        let stop = StopHandle::default();
        let source = Metronome::new(5, Duration::ZERO, stop.clone());
        let mut s = FrameScheduler::new(source, Recorder::default(), config(20))
            .with_stop_handle(stop);

        let started = Instant::now();
        s.run().await.unwrap();
        let wall = started.elapsed();

        let ticks = s.source.starts.len();
        assert_eq!(ticks, 5);
        assert!(wall >= Duration::from_millis(50) * (ticks as u32 - 1), "{wall:?}");
        for gap in s.source.gaps() {
            assert!(gap >= Duration::from_millis(45), "{gap:?}");
        }
    }

    #[tokio::test]
    async fn overrunning_tick_is_not_followed_by_a_sleep() {
        // 50 fps = 20 ms budget; every capture takes 40 ms.
        let stop = StopHandle::default();
        let source = Metronome::new(4, Duration::from_millis(40), stop.clone());
        let mut s = FrameScheduler::new(source, Recorder::default(), config(50))
            .with_stop_handle(stop);

        s.run().await.unwrap();

        for gap in s.source.gaps() {
            assert!(gap >= Duration::from_millis(40), "{gap:?}");
            assert!(gap < Duration::from_millis(60), "{gap:?}");
        }
    }

    #[tokio::test]
    async fn pace_returns_at_once_when_over_budget() {
        let tick_start = Instant::now();
        std::thread::sleep(Duration::from_millis(60));
        let before = Instant::now();
        pace(tick_start, Duration::from_millis(50)).await;
        assert!(before.elapsed() < Duration::from_millis(40));
    }

    #[tokio::test]
    async fn pace_waits_for_the_rest_of_the_budget() {
        let tick_start = Instant::now();
        pace(tick_start, Duration::from_millis(30)).await;
        assert!(tick_start.elapsed() >= Duration::from_millis(30));
    }
}
