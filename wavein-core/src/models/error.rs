use thiserror::Error;

use crate::buffers::descriptor::Slot;

/// Failure reported by a `CaptureDevice` call: the name of the OS routine
/// that failed and the status code it returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{op} returned os status {code}")]
pub struct DeviceFault {
    pub op: &'static str,
    pub code: u32,
}

impl DeviceFault {
    pub fn new(op: &'static str, code: u32) -> Self {
        Self { op, code }
    }
}

/// Errors surfaced by the capture engine.
///
/// Each device-stage variant wraps the fault from the failing OS call.
/// Faults that occur on the device worker thread after a successful start
/// (buffer resubmission) are reported through `CaptureSink::on_capture_error`
/// instead of a return value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("failed to open capture device: {0}")]
    DeviceOpen(DeviceFault),

    #[error("failed to prepare buffer {slot:?}: {fault}")]
    BufferPrepare { slot: Slot, fault: DeviceFault },

    #[error("failed to enqueue buffer {slot:?}: {fault}")]
    BufferEnqueue { slot: Slot, fault: DeviceFault },

    #[error("failed to start capture: {0}")]
    DeviceStart(DeviceFault),

    #[error("failed to stop capture cleanly: {0}")]
    DeviceStop(DeviceFault),

    #[error("stop handshake not acknowledged within {waited_ms} ms")]
    StopTimeout { waited_ms: u64 },

    #[error("capture already running")]
    AlreadyRunning,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
