//! Scriptable in-memory capture device for engine tests.
//!
//! Records every call made against it, fails scripted stages with a chosen
//! status code, and lets the test play the role of the OS worker thread by
//! completing queued buffers.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffers::descriptor::{BufferDescriptor, Slot};
use crate::models::error::DeviceFault;
use crate::models::format::AudioFormat;
use crate::traits::capture_device::{CaptureDevice, DeviceEvent, DeviceEventHandler};

/// One recorded call against the mock device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Open,
    Prepare(Slot),
    Unprepare(Slot),
    Enqueue(Slot),
    Start,
    Reset,
    Stop,
    Close,
}

/// Which stages the mock should fail, and with what status code.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockScript {
    pub fail_open: Option<u32>,
    pub fail_prepare: Option<(Slot, u32)>,
    pub fail_enqueue: Option<(Slot, u32)>,
    pub fail_start: Option<u32>,
    /// Fails enqueue calls issued after `start()` — callback resubmissions.
    pub fail_resubmit: Option<u32>,
}

struct QueuedBuffer {
    slot: Slot,
    data: *mut u8,
    byte_len: usize,
}

#[derive(Default)]
struct MockInner {
    calls: Vec<DeviceCall>,
    handler: Option<Arc<dyn DeviceEventHandler>>,
    open: bool,
    started: bool,
    queue: Vec<QueuedBuffer>,
}

// SAFETY: the queued raw pointers target the engine's buffer pool, which
// outlives the mock, and the mock writes through them only while the buffer
// is queued — the same contract a real driver honors.
unsafe impl Send for MockInner {}

pub struct MockDevice {
    inner: Arc<Mutex<MockInner>>,
    script: MockScript,
}

impl MockDevice {
    pub fn new(script: MockScript) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner::default())),
            script,
        }
    }

    /// Test-side handle observing calls and injecting notifications.
    pub fn controller(&self) -> MockController {
        MockController {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl CaptureDevice for MockDevice {
    fn open(
        &mut self,
        _format: &AudioFormat,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<(), DeviceFault> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Open);
        if let Some(code) = self.script.fail_open {
            return Err(DeviceFault::new("open", code));
        }
        inner.open = true;
        inner.handler = Some(handler);
        Ok(())
    }

    fn prepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let slot = descriptor.slot();
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Prepare(slot));
        match self.script.fail_prepare {
            Some((failing, code)) if failing == slot => Err(DeviceFault::new("prepare", code)),
            _ => Ok(()),
        }
    }

    fn unprepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let slot = descriptor.slot();
        self.inner.lock().calls.push(DeviceCall::Unprepare(slot));
        Ok(())
    }

    fn enqueue(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let slot = descriptor.slot();
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Enqueue(slot));
        if inner.started {
            if let Some(code) = self.script.fail_resubmit {
                return Err(DeviceFault::new("enqueue", code));
            }
        } else if let Some((failing, code)) = self.script.fail_enqueue {
            if failing == slot {
                return Err(DeviceFault::new("enqueue", code));
            }
        }
        inner.queue.push(QueuedBuffer {
            slot,
            data: descriptor.data_ptr(),
            byte_len: descriptor.byte_len(),
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceFault> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Start);
        if let Some(code) = self.script.fail_start {
            return Err(DeviceFault::new("start", code));
        }
        inner.started = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), DeviceFault> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Reset);
        inner.queue.clear();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceFault> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Stop);
        inner.started = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceFault> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeviceCall::Close);
        inner.open = false;
        inner.started = false;
        inner.handler = None;
        inner.queue.clear();
        Ok(())
    }
}

/// Plays the role of the OS worker thread in tests.
///
/// Notifications are silently dropped once the device is closed, matching
/// the `CaptureDevice` contract that no events follow `close()`.
#[derive(Clone)]
pub struct MockController {
    inner: Arc<Mutex<MockInner>>,
}

impl MockController {
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    pub fn queued_slots(&self) -> Vec<Slot> {
        self.inner.lock().queue.iter().map(|q| q.slot).collect()
    }

    /// Fills the oldest queued buffer with `fill` bytes and delivers its
    /// data-ready notification, as the capture driver would. No-op when
    /// closed or when nothing is queued.
    pub fn complete_next(&self, byte_count: usize, fill: u8) {
        let (buffer, handler) = {
            let mut inner = self.inner.lock();
            if !inner.open || inner.queue.is_empty() {
                return;
            }
            let buffer = inner.queue.remove(0);
            let handler = inner.handler.clone().unwrap();
            (buffer, handler)
        };
        let written = byte_count.min(buffer.byte_len);
        unsafe { std::slice::from_raw_parts_mut(buffer.data, written) }.fill(fill);
        handler.on_device_event(DeviceEvent::DataReady {
            slot: buffer.slot,
            byte_count,
        });
    }

    /// Delivers a bare data-ready notification without touching queue
    /// bookkeeping (zero-byte completions, stop acknowledgments).
    pub fn notify_data_ready(&self, slot: Slot, byte_count: usize) {
        let handler = {
            let inner = self.inner.lock();
            if !inner.open {
                return;
            }
            inner.handler.clone()
        };
        if let Some(handler) = handler {
            handler.on_device_event(DeviceEvent::DataReady { slot, byte_count });
        }
    }
}
