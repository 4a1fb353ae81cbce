//! # wavein-core
//!
//! Platform-agnostic double-buffered audio capture engine.
//!
//! Two fixed-capacity buffers alternate between the OS capture queue and the
//! consumer: while one is being filled by the driver, the other is delivered
//! to the sink and resubmitted, giving gapless continuous capture. Platform
//! backends (Windows waveIn in `wavein-winmm`) implement the `CaptureDevice`
//! trait and plug into the generic `CaptureEngine`.
//!
//! ## Architecture
//!
//! ```text
//! wavein-core (this crate)
//! ├── traits/    ← CaptureDevice, DeviceEventHandler, CaptureSink
//! ├── models/    ← AudioFormat, EngineConfig, CaptureState, CaptureError
//! ├── buffers/   ← Sample, SampleBuffer, BufferDescriptor, BufferPool
//! ├── sync/      ← StopSynchronizer (stop handshake event)
//! └── engine/    ← CaptureEngine, DriverCallbackHandler
//! ```
//!
//! ## Threading
//!
//! The owning thread calls `start()`/`stop()`; a single device-owned worker
//! thread drives `DriverCallbackHandler` and runs the sink. `stop()` blocks
//! on a handshake until the worker acknowledges that no further buffers will
//! be delivered, bounded by a configurable timeout.

pub mod buffers;
pub mod engine;
pub mod models;
pub mod sync;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock_device;

// Re-export key types at crate root for convenience.
pub use buffers::descriptor::{BufferDescriptor, Slot};
pub use buffers::pool::{BufferPool, SampleBuffer};
pub use buffers::sample::Sample;
pub use engine::capture_engine::CaptureEngine;
pub use models::config::EngineConfig;
pub use models::error::{CaptureError, DeviceFault};
pub use models::format::AudioFormat;
pub use models::state::CaptureState;
pub use sync::stop_event::StopSynchronizer;
pub use traits::capture_device::{CaptureDevice, DeviceEvent, DeviceEventHandler};
pub use traits::capture_sink::CaptureSink;
