//! Sender service lifecycle.
//!
//! Opens the capture backend and the UDP transport from a
//! [`SenderConfig`], then hands both to the core [`FrameScheduler`] and
//! runs it until stopped.

use tracing::info;

use edgelight_core::{
    DxgiCapturer, EdgeError, FrameScheduler, FrameSource, LedSink, StopHandle, UdpLedTransport,
};

use crate::config::SenderConfig;

// ── SenderService ────────────────────────────────────────────────

/// The top-level sender service.
pub struct SenderService {
    config: SenderConfig,
    stop: StopHandle,
}

impl SenderService {
    pub fn new(config: SenderConfig) -> Self {
        Self {
            config,
            stop: StopHandle::default(),
        }
    }

    /// Obtain a handle that stops the service from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Signal the service to stop after the current tick.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Open the display and the controller socket, then stream until
    /// stopped.
    ///
    /// Failing to open a display or resolve the controller is fatal.
    pub async fn run(&self) -> Result<(), EdgeError> {
        let capturer =
            DxgiCapturer::open(self.config.display(), self.config.sampling.capture_timeout_ms)?;
        info!("capturing {}x{}", capturer.width(), capturer.height());

        let net = &self.config.network;
        let transport = UdpLedTransport::connect(&net.remote_host, net.remote_port).await?;
        info!("streaming to controller at {}", transport.remote_addr());

        self.run_with(capturer, transport).await
    }

    /// Run the pipeline over an already opened source and sink.
    pub async fn run_with<S, K>(&self, source: S, sink: K) -> Result<(), EdgeError>
    where
        S: FrameSource,
        K: LedSink,
    {
        let mut scheduler = FrameScheduler::new(source, sink, self.config.to_pipeline_config())
            .with_stop_handle(self.stop.clone());
        scheduler.run().await
    }
}

// ── Tests ────────────────────────────────────────────────────────
