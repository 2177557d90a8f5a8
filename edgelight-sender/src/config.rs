//! Configuration for the sender.
//!
//! Loaded once at startup from TOML. Every field has a default, so a
//! partial or missing file is fine. A file that fails to parse yields the
//! defaults and a [`ConfigOrigin::Invalid`] for the caller to report.

use std::path::Path;

use serde::{Deserialize, Serialize};

use edgelight_core::{
    BoostConfig, Display, EdgeCounts, LedLayout, Margins, PipelineConfig, SampleConfig,
    TransmissionConfig,
};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub network: NetworkConfig,
    pub sampling: SamplingConfig,
    pub layout: LayoutConfig,
    pub transmission: TransmissionSection,
    pub pacing: PacingConfig,
    pub boost: BoostSection,
    pub logging: LoggingConfig,
}

/// Where frames are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Controller host name or IP address.
    pub remote_host: String,
    /// Controller UDP port.
    pub remote_port: u16,
}

/// How the screen is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Pixel stride used when averaging a region.
    pub sample_step: u32,
    /// Sample the center pixel only.
    pub low_resource_mode: bool,
    /// DXGI output to capture. Unset means the primary display.
    pub monitor_index: Option<u32>,
    /// How long one capture waits for a new desktop frame.
    pub capture_timeout_ms: u32,
}

/// LED counts per edge and capture margins, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub top_leds: u32,
    pub bottom_leds: u32,
    pub left_leds: u32,
    pub right_leds: u32,
}

/// Mapping from canonical order to the physical strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionSection {
    /// Rotation of logical LED 0.
    pub offset: i64,
    /// Winding direction of the strip.
    pub clockwise: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub target_fps: u32,
}

/// Saturation boost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostSection {
    pub enabled: bool,
    /// 1.0 = no change, > 1 increases saturation.
    pub factor: f64,
    /// Colors with HSV value at or below this are left alone.
    pub min_value: f64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            remote_host: "192.168.0.189".into(),
            remote_port: 7777,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_step: 4,
            low_resource_mode: false,
            monitor_index: None,
            capture_timeout_ms: 100,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_top: 80,
            margin_bottom: 80,
            margin_left: 40,
            margin_right: 40,
            top_leds: 37,
            bottom_leds: 37,
            left_leds: 20,
            right_leds: 21,
        }
    }
}

impl Default for TransmissionSection {
    fn default() -> Self {
        Self {
            offset: 19,
            clockwise: false,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

impl Default for BoostSection {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 1.35,
            min_value: 0.07,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

/// Where a loaded [`SenderConfig`] came from.
///
/// Loading happens before tracing is installed (the log level lives in
/// the file), so the outcome is returned for the caller to log.
#[derive(Debug)]
pub enum ConfigOrigin {
    /// Parsed from the file.
    File,
    /// The file was missing; defaults were used and written out.
    CreatedDefault { write_error: Option<std::io::Error> },
    /// The file could not be parsed; defaults were used.
    Invalid(toml::de::Error),
}

impl SenderConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// A missing file is created with the defaults so there is something
    /// to edit next time. A file that fails to parse is left untouched.
    pub fn load(path: &Path) -> (Self, ConfigOrigin) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => (cfg, ConfigOrigin::File),
                Err(e) => (Self::default(), ConfigOrigin::Invalid(e)),
            },
            Err(_) => {
                let write_error = Self::write_default(path).err();
                (Self::default(), ConfigOrigin::CreatedDefault { write_error })
            }
        }
    }

    /// Write the default configuration to a file.
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, text)
    }

    /// Which display to capture.
    pub fn display(&self) -> Display {
        self.sampling.monitor_index.map_or(Display::Primary, Display::Index)
    }

    /// Validate and convert into the immutable pipeline settings.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let l = &self.layout;
        let factor = if self.boost.factor.is_nan() {
            1.0
        } else {
            self.boost.factor.max(0.0)
        };
        let min_value = if self.boost.min_value.is_nan() {
            0.0
        } else {
            self.boost.min_value.clamp(0.0, 1.0)
        };

        PipelineConfig {
            layout: LedLayout {
                leds: EdgeCounts {
                    top: l.top_leds,
                    bottom: l.bottom_leds,
                    left: l.left_leds,
                    right: l.right_leds,
                },
                margins: Margins {
                    top: l.margin_top,
                    bottom: l.margin_bottom,
                    left: l.margin_left,
                    right: l.margin_right,
                },
            },
            sampling: SampleConfig {
                sample_step: self.sampling.sample_step.max(1),
                low_resource_mode: self.sampling.low_resource_mode,
            },
            boost: BoostConfig {
                enabled: self.boost.enabled,
                factor,
                min_value,
            },
            transmission: TransmissionConfig {
                offset: self.transmission.offset,
                clockwise: self.transmission.clockwise,
            },
            target_fps: self.pacing.target_fps.max(1),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
