use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffers::descriptor::Slot;
use crate::buffers::pool::BufferPool;
use crate::buffers::sample::Sample;
use crate::models::config::EngineConfig;
use crate::models::error::{CaptureError, DeviceFault};
use crate::models::state::CaptureState;
use crate::sync::stop_event::StopSynchronizer;
use crate::traits::capture_device::{CaptureDevice, DeviceEventHandler};
use crate::traits::capture_sink::CaptureSink;

use super::callback::DriverCallbackHandler;

/// State shared between the owning thread and the device worker thread.
///
/// The two flags are the only cross-thread signals; the pool and device sit
/// behind mutexes taken in a fixed order (pool, then device) by both sides.
pub(crate) struct EngineShared<D, S: Sample> {
    pub(crate) device: Mutex<D>,
    pub(crate) pool: Mutex<BufferPool<S>>,
    pub(crate) sink: Arc<dyn CaptureSink<S>>,
    pub(crate) stop_requested: AtomicBool,
    pub(crate) running: AtomicBool,
    pub(crate) stop_event: StopSynchronizer,
}

/// Double-buffered asynchronous capture engine.
///
/// Owns the device, the two capture buffers, and the stop handshake. After
/// `start()`, all activity is driven by device notifications handled on the
/// device worker thread until `stop()` requests cessation and waits for the
/// worker's acknowledgment.
///
/// A stopped engine may be started again; each `start()` opens a fresh
/// device session. `start()` and `stop()` are not safe to call concurrently
/// from multiple threads — the caller serializes them.
pub struct CaptureEngine<D: CaptureDevice + 'static, S: Sample = i16> {
    config: EngineConfig,
    shared: Arc<EngineShared<D, S>>,
    handler: Arc<DriverCallbackHandler<D, S>>,
}

impl<D: CaptureDevice + 'static, S: Sample> CaptureEngine<D, S> {
    /// Creates an engine over `device`, delivering completed buffers to
    /// `sink`. The device stays closed until `start()`.
    pub fn new(
        device: D,
        sink: Arc<dyn CaptureSink<S>>,
        config: EngineConfig,
    ) -> Result<Self, CaptureError> {
        config
            .validate()
            .map_err(CaptureError::InvalidConfiguration)?;
        if config.format.bits_per_sample != S::BITS {
            return Err(CaptureError::InvalidConfiguration(format!(
                "format is {} bits per sample but the buffer element is {} bits",
                config.format.bits_per_sample,
                S::BITS
            )));
        }

        let capacity = usize::from(config.format.channels) * config.samples_per_buffer;
        let shared = Arc::new(EngineShared {
            device: Mutex::new(device),
            pool: Mutex::new(BufferPool::new(capacity)),
            sink,
            stop_requested: AtomicBool::new(false),
            running: AtomicBool::new(false),
            stop_event: StopSynchronizer::new(),
        });
        let handler = Arc::new(DriverCallbackHandler::new(Arc::clone(&shared)));

        Ok(Self {
            config,
            shared,
            handler,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        if !self.shared.running.load(Ordering::Acquire) {
            CaptureState::Stopped
        } else if self.shared.stop_requested.load(Ordering::Acquire) {
            CaptureState::StopRequested
        } else {
            CaptureState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Opens the device, prepares and enqueues both buffers, and starts
    /// capture.
    ///
    /// If any stage fails, everything done so far is unwound — queued
    /// buffers flushed, prepared descriptors unprepared, the device closed —
    /// so a failed start never leaves the device open.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.shared.running.load(Ordering::Acquire) {
            return Err(CaptureError::AlreadyRunning);
        }
        self.shared.stop_requested.store(false, Ordering::Release);
        self.shared.stop_event.reset();

        let mut pool = self.shared.pool.lock();
        let mut device = self.shared.device.lock();

        let capacity = usize::from(self.config.format.channels) * self.config.samples_per_buffer;
        pool.reallocate(capacity);

        let handler = Arc::clone(&self.handler) as Arc<dyn DeviceEventHandler>;
        device
            .open(&self.config.format, handler)
            .map_err(CaptureError::DeviceOpen)?;

        for slot in Slot::ALL {
            if let Err(fault) = device.prepare(pool.descriptor_mut(slot)) {
                Self::unwind_start(&mut device, &mut pool);
                return Err(CaptureError::BufferPrepare { slot, fault });
            }
            pool.descriptor_mut(slot).mark_prepared();
        }

        for slot in Slot::ALL {
            if let Err(fault) = device.enqueue(pool.descriptor_mut(slot)) {
                Self::unwind_start(&mut device, &mut pool);
                return Err(CaptureError::BufferEnqueue { slot, fault });
            }
            pool.descriptor_mut(slot).mark_queued();
        }

        if let Err(fault) = device.start() {
            Self::unwind_start(&mut device, &mut pool);
            return Err(CaptureError::DeviceStart(fault));
        }

        drop(device);
        drop(pool);

        self.shared.running.store(true, Ordering::Release);
        log::debug!(
            "capture started: {:?}, {} samples per buffer",
            self.config.format,
            self.config.samples_per_buffer
        );
        Ok(())
    }

    /// Requests cessation and waits for the worker thread to acknowledge,
    /// then tears the session down: flush, halt, unprepare both buffers,
    /// close.
    ///
    /// Idempotent — returns immediately without touching the device when
    /// already stopped. If the worker never acknowledges within the
    /// configured timeout, returns `StopTimeout` and stays in
    /// `StopRequested`; the caller may retry. Teardown faults are reported
    /// as `DeviceStop` but never prevent the engine from reaching `Stopped`.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.shared.running.load(Ordering::Acquire) {
            return Ok(());
        }

        self.shared.stop_requested.store(true, Ordering::Release);
        log::debug!("stop requested; waiting for worker acknowledgment");
        if !self.shared.stop_event.wait_timeout(self.config.stop_timeout) {
            log::warn!(
                "stop handshake not acknowledged within {:?}",
                self.config.stop_timeout
            );
            return Err(CaptureError::StopTimeout {
                waited_ms: self.config.stop_timeout.as_millis() as u64,
            });
        }

        let mut pool = self.shared.pool.lock();
        let mut device = self.shared.device.lock();
        let mut first_fault: Option<DeviceFault> = None;

        if let Err(fault) = device.reset() {
            log::warn!("stop: flush failed: {fault}");
            if first_fault.is_none() {
                first_fault = Some(fault);
            }
        }
        for slot in Slot::ALL {
            pool.descriptor_mut(slot).mark_returned();
        }

        if let Err(fault) = device.stop() {
            log::warn!("stop: halt failed: {fault}");
            if first_fault.is_none() {
                first_fault = Some(fault);
            }
        }

        for slot in Slot::ALL {
            if pool.descriptor(slot).is_prepared() {
                if let Err(fault) = device.unprepare(pool.descriptor_mut(slot)) {
                    log::warn!("stop: unprepare of buffer {slot:?} failed: {fault}");
                    if first_fault.is_none() {
                        first_fault = Some(fault);
                    }
                }
                pool.descriptor_mut(slot).mark_unprepared();
            }
        }

        if let Err(fault) = device.close() {
            log::warn!("stop: close failed: {fault}");
            if first_fault.is_none() {
                first_fault = Some(fault);
            }
        }

        drop(device);
        drop(pool);

        self.shared.running.store(false, Ordering::Release);
        self.shared.stop_requested.store(false, Ordering::Release);
        log::debug!("capture stopped");

        match first_fault {
            Some(fault) => Err(CaptureError::DeviceStop(fault)),
            None => Ok(()),
        }
    }

    /// Best-effort rollback for a failed start. Faults here are logged and
    /// swallowed; the original stage error is what the caller sees.
    fn unwind_start(device: &mut D, pool: &mut BufferPool<S>) {
        if Slot::ALL.iter().any(|slot| pool.descriptor(*slot).is_queued()) {
            if let Err(fault) = device.reset() {
                log::warn!("start unwind: flush failed: {fault}");
            }
            for slot in Slot::ALL {
                pool.descriptor_mut(slot).mark_returned();
            }
        }
        for slot in Slot::ALL {
            if pool.descriptor(slot).is_prepared() {
                if let Err(fault) = device.unprepare(pool.descriptor_mut(slot)) {
                    log::warn!("start unwind: unprepare of buffer {slot:?} failed: {fault}");
                }
                pool.descriptor_mut(slot).mark_unprepared();
            }
        }
        if let Err(fault) = device.close() {
            log::warn!("start unwind: close failed: {fault}");
        }
    }
}
