//! # edgelight-sender: screen-edge LED streamer
//!
//! Background process that captures the primary display, samples colors
//! along its edges and streams them as UDP datagrams to an LED controller
//! (for example an ESP32 driving a NeoPixel strip behind the monitor).
//!
//! The pipeline itself lives in `edgelight-core`; this crate owns the
//! configuration file and the process lifecycle.

pub mod config;
pub mod service;
