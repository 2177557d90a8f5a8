//! # edgelight-core
//!
//! Screen-edge ambient lighting pipeline: samples colors around the border
//! of the primary display and streams them to a UDP LED controller.
//!
//! ## Architecture
//!
//! ```text
//! FrameSource ─► LayoutCache ─► sample_region ─► BoostConfig
//!  (capture)     (regions)      (× region)       (× sample)
//!                                                    │
//!   LedSink ◄── encode_frame ◄── to_physical_order ◄─┤ ChangeDetector
//!  (one UDP datagram per frame)                         (skip if same)
//! ```
//!
//! | Module      | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `types`     | `Color`, `Frame`, `Region`, bounds-checked `PixelBuffer` |
//! | `layout`    | Display geometry → canonical sampling regions      |
//! | `sampler`   | Region → averaged (or center) color                |
//! | `boost`     | HSV saturation boost                               |
//! | `capture`   | `FrameSource` seam and DXGI capture (Windows)      |
//! | `delta`     | Frame-to-frame change detection                    |
//! | `transform` | Canonical → physical LED order                     |
//! | `encoder`   | ASCII `R,G,B,...` wire encoding                    |
//! | `transport` | `LedSink` seam and UDP sender                      |
//! | `throttle`  | Once-per-window log gate                           |
//! | `scheduler` | Paced tick loop tying it all together              |
//! | `error`     | `EdgeError`, `thiserror`-based                     |

pub mod boost;
pub mod capture;
pub mod delta;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod sampler;
pub mod scheduler;
pub mod throttle;
pub mod transform;
pub mod transport;
pub mod types;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use boost::{BoostConfig, boost_saturation};
pub use capture::{Display, DxgiCapturer, FrameSource};
pub use delta::ChangeDetector;
pub use encoder::encode_frame;
pub use error::EdgeError;
pub use layout::{EdgeCounts, LayoutCache, LedLayout, Margins, map_regions};
pub use sampler::{SampleConfig, sample_region};
pub use scheduler::{FrameScheduler, PipelineConfig, StopHandle, TickOutcome};
pub use throttle::LogThrottle;
pub use transform::{TransmissionConfig, to_physical_order};
pub use transport::{LedSink, UdpLedTransport};
pub use types::{Color, Frame, PixelBuffer, PixelFormat, Region};
