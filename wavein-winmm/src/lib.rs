//! # wavein-winmm
//!
//! Windows waveIn (winmm) backend for wavein-core.
//!
//! Provides:
//! - `WinmmCaptureDevice` — `CaptureDevice` implementation over the waveIn
//!   API, with the free-function callback trampoline isolated here
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use wavein_core::{CaptureEngine, EngineConfig};
//! use wavein_winmm::WinmmCaptureDevice;
//!
//! let device = WinmmCaptureDevice::wave_mapper();
//! let mut engine = CaptureEngine::<_, i16>::new(device, sink, EngineConfig::default())?;
//! engine.start()?;
//! ```

#[cfg(target_os = "windows")]
pub mod winmm_device;

#[cfg(target_os = "windows")]
pub use winmm_device::WinmmCaptureDevice;
