use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::buffers::descriptor::Slot;
use crate::buffers::sample::Sample;
use crate::models::error::CaptureError;
use crate::traits::capture_device::{CaptureDevice, DeviceEvent, DeviceEventHandler};

use super::capture_engine::EngineShared;

/// Handles device notifications on the worker thread.
///
/// The stop check takes priority over delivery: a data-ready notification
/// observed after a stop request signals the handshake and drops the buffer
/// instead of delivering it, so no buffer reaches the sink once `stop()` has
/// been acknowledged.
pub struct DriverCallbackHandler<D, S: Sample> {
    shared: Arc<EngineShared<D, S>>,
}

impl<D: CaptureDevice, S: Sample> DriverCallbackHandler<D, S> {
    pub(crate) fn new(shared: Arc<EngineShared<D, S>>) -> Self {
        Self { shared }
    }

    fn on_data_ready(&self, slot: Slot, byte_count: usize) {
        let shared = &self.shared;

        if shared.stop_requested.load(Ordering::Acquire) {
            log::debug!("worker acknowledging stop; dropping buffer {slot:?}");
            shared.stop_event.set();
            return;
        }

        if byte_count == 0 {
            // Nothing recorded; not worth a sink call.
            return;
        }

        let mut pool = shared.pool.lock();
        pool.descriptor_mut(slot).mark_returned();
        shared.sink.on_buffer_ready(slot, pool.filled(slot, byte_count));

        // Resubmit the same descriptor to sustain double buffering.
        let mut device = shared.device.lock();
        match device.enqueue(pool.descriptor_mut(slot)) {
            Ok(()) => pool.descriptor_mut(slot).mark_queued(),
            Err(fault) => {
                let error = CaptureError::BufferEnqueue { slot, fault };
                log::error!("buffer resubmission failed: {error}");
                shared.sink.on_capture_error(&error);
            }
        }
    }
}

impl<D: CaptureDevice + 'static, S: Sample> DeviceEventHandler for DriverCallbackHandler<D, S> {
    fn on_device_event(&self, event: DeviceEvent) {
        match event {
            DeviceEvent::Opened | DeviceEvent::Closed => {}
            DeviceEvent::DataReady { slot, byte_count } => self.on_data_ready(slot, byte_count),
        }
    }
}
