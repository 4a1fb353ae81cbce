use crate::buffers::descriptor::Slot;
use crate::buffers::sample::Sample;
use crate::models::error::CaptureError;

/// Consumer of completed capture buffers.
///
/// Both methods run synchronously on the device worker thread inside a
/// data-ready notification — keep processing minimal, and never call
/// `start()`/`stop()` on the owning engine from inside them.
pub trait CaptureSink<S: Sample>: Send + Sync {
    /// One call per completed, nonzero-length buffer. The view is valid
    /// only for the duration of the call.
    fn on_buffer_ready(&self, slot: Slot, samples: &[S]);

    /// Reports a fault that occurred on the worker thread after a
    /// successful start, such as a buffer resubmission failure. Default:
    /// ignore.
    fn on_capture_error(&self, _error: &CaptureError) {}
}
