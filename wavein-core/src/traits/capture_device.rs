use std::sync::Arc;

use crate::buffers::descriptor::{BufferDescriptor, Slot};
use crate::models::error::DeviceFault;
use crate::models::format::AudioFormat;

/// Notification delivered by the capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The device finished opening.
    Opened,
    /// A queued buffer completed. `byte_count` is the number of bytes the
    /// OS actually recorded into it, possibly zero.
    DataReady { slot: Slot, byte_count: usize },
    /// The device finished closing.
    Closed,
}

/// Receives device notifications.
///
/// Called on a worker thread owned by the device implementation, never on
/// the thread driving the `CaptureDevice` methods.
pub trait DeviceEventHandler: Send + Sync {
    fn on_device_event(&self, event: DeviceEvent);
}

/// Platform seam over the OS audio-capture facility.
///
/// Implemented by:
/// - `WinmmCaptureDevice` (Windows waveIn, in `wavein-winmm`)
/// - the scriptable mock used by the engine tests
///
/// Contract for implementations:
/// - `DataReady` events are delivered asynchronously on a device-owned
///   worker thread; `Opened`/`Closed` may additionally fire synchronously
///   from within `open()`/`close()`, so the handler must not take engine
///   locks for them.
/// - While a descriptor is queued, the device is the only writer to the
///   storage behind its raw pointer, and it writes at most `byte_len` bytes.
/// - After `close()` returns, no further events are delivered.
pub trait CaptureDevice: Send {
    /// Opens the device for the given format and registers the event
    /// handler. The handler registration lasts until `close()`.
    fn open(
        &mut self,
        format: &AudioFormat,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<(), DeviceFault>;

    /// Registers a buffer with the device, making it eligible for queueing.
    fn prepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault>;

    /// Deregisters a prepared buffer. Must not be called while it is queued.
    fn unprepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault>;

    /// Submits a prepared buffer to the capture queue. Completion is
    /// reported through `DeviceEvent::DataReady`.
    fn enqueue(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault>;

    /// Starts filling queued buffers.
    fn start(&mut self) -> Result<(), DeviceFault>;

    /// Flushes in-flight buffers, returning them as completed.
    fn reset(&mut self) -> Result<(), DeviceFault>;

    /// Halts capture without flushing.
    fn stop(&mut self) -> Result<(), DeviceFault>;

    /// Closes the device handle and drops the handler registration.
    fn close(&mut self) -> Result<(), DeviceFault>;
}
