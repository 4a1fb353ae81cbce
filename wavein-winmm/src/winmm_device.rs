//! waveIn capture device.
//!
//! Wraps the winmm waveIn API behind the `CaptureDevice` seam. The driver
//! invokes a free-function trampoline on its own thread; the trampoline
//! resolves back to the registered handler through a typed context whose
//! address is passed at open and reclaimed only after close.

use std::mem;
use std::sync::Arc;

use windows::core::PSTR;
use windows::Win32::Media::Audio::{
    waveInAddBuffer, waveInClose, waveInOpen, waveInPrepareHeader, waveInReset, waveInStart,
    waveInStop, waveInUnprepareHeader, CALLBACK_FUNCTION, HWAVEIN, WAVEFORMATEX, WAVEHDR,
    WAVE_FORMAT_PCM, WAVE_MAPPER,
};

use wavein_core::{
    AudioFormat, BufferDescriptor, CaptureDevice, DeviceEvent, DeviceEventHandler, DeviceFault,
    Slot,
};

const MMSYSERR_NOERROR: u32 = 0;
const MMSYSERR_INVALHANDLE: u32 = 5;

const MM_WIM_OPEN: u32 = 0x3BE;
const MM_WIM_CLOSE: u32 = 0x3BF;
const MM_WIM_DATA: u32 = 0x3C0;

fn check(result: u32, op: &'static str) -> Result<(), DeviceFault> {
    if result == MMSYSERR_NOERROR {
        Ok(())
    } else {
        Err(DeviceFault::new(op, result))
    }
}

/// Target of the trampoline's instance pointer. Boxed so its address stays
/// stable from open to close.
struct CallbackContext {
    handler: Arc<dyn DeviceEventHandler>,
}

/// Capture device backed by the winmm waveIn API.
///
/// One WAVEHDR per slot; `dwUser` carries the slot tag so completion
/// notifications resolve back to a buffer without pointer comparison.
pub struct WinmmCaptureDevice {
    device_id: u32,
    handle: Option<HWAVEIN>,
    headers: [Box<WAVEHDR>; 2],
    context: Option<Box<CallbackContext>>,
}

// SAFETY: the handle, headers, and context are only touched from the thread
// driving the CaptureDevice methods. The driver thread reaches them solely
// through the pointers registered with winmm, which stay valid from open to
// close because both the WAVEHDRs and the context are boxed.
unsafe impl Send for WinmmCaptureDevice {}

impl WinmmCaptureDevice {
    /// Captures from a specific device index.
    pub fn new(device_id: u32) -> Self {
        Self {
            device_id,
            handle: None,
            headers: [Box::default(), Box::default()],
            context: None,
        }
    }

    /// Captures from the wave mapper, the system default input.
    pub fn wave_mapper() -> Self {
        Self::new(WAVE_MAPPER)
    }

    fn handle(&self, op: &'static str) -> Result<HWAVEIN, DeviceFault> {
        self.handle
            .ok_or(DeviceFault::new(op, MMSYSERR_INVALHANDLE))
    }
}

impl CaptureDevice for WinmmCaptureDevice {
    fn open(
        &mut self,
        format: &AudioFormat,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<(), DeviceFault> {
        let wave_format = WAVEFORMATEX {
            wFormatTag: WAVE_FORMAT_PCM as u16,
            nChannels: format.channels,
            nSamplesPerSec: format.sample_rate,
            nAvgBytesPerSec: format.avg_bytes_per_sec(),
            nBlockAlign: format.block_align(),
            wBitsPerSample: format.bits_per_sample,
            cbSize: 0,
        };

        let context = Box::new(CallbackContext { handler });
        let mut handle = HWAVEIN::default();
        let result = unsafe {
            waveInOpen(
                Some(&mut handle),
                self.device_id,
                &wave_format,
                wave_in_proc as usize,
                &*context as *const CallbackContext as usize,
                CALLBACK_FUNCTION,
            )
        };
        check(result, "waveInOpen")?;

        self.handle = Some(handle);
        self.context = Some(context);
        Ok(())
    }

    fn prepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInPrepareHeader")?;
        let index = descriptor.slot().index();
        *self.headers[index] = WAVEHDR {
            lpData: PSTR(descriptor.data_ptr()),
            dwBufferLength: descriptor.byte_len() as u32,
            dwBytesRecorded: 0,
            dwUser: index,
            dwFlags: 0,
            dwLoops: 0,
            lpNext: std::ptr::null_mut(),
            reserved: 0,
        };
        let header: &mut WAVEHDR = &mut self.headers[index];
        let result =
            unsafe { waveInPrepareHeader(handle, header, mem::size_of::<WAVEHDR>() as u32) };
        check(result, "waveInPrepareHeader")
    }

    fn unprepare(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInUnprepareHeader")?;
        let header: &mut WAVEHDR = &mut self.headers[descriptor.slot().index()];
        let result =
            unsafe { waveInUnprepareHeader(handle, header, mem::size_of::<WAVEHDR>() as u32) };
        check(result, "waveInUnprepareHeader")
    }

    fn enqueue(&mut self, descriptor: &mut BufferDescriptor) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInAddBuffer")?;
        let header: &mut WAVEHDR = &mut self.headers[descriptor.slot().index()];
        header.dwBytesRecorded = 0;
        let result = unsafe { waveInAddBuffer(handle, header, mem::size_of::<WAVEHDR>() as u32) };
        check(result, "waveInAddBuffer")
    }

    fn start(&mut self) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInStart")?;
        check(unsafe { waveInStart(handle) }, "waveInStart")
    }

    fn reset(&mut self) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInReset")?;
        check(unsafe { waveInReset(handle) }, "waveInReset")
    }

    fn stop(&mut self) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInStop")?;
        check(unsafe { waveInStop(handle) }, "waveInStop")
    }

    fn close(&mut self) -> Result<(), DeviceFault> {
        let handle = self.handle("waveInClose")?;
        check(unsafe { waveInClose(handle) }, "waveInClose")?;
        self.handle = None;
        // MM_WIM_CLOSE fires during waveInClose; only now is the context
        // safe to reclaim.
        self.context = None;
        Ok(())
    }
}

impl Drop for WinmmCaptureDevice {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::warn!("waveIn device dropped while open; closing");
            let _ = self.reset();
            let _ = self.close();
        }
    }
}

/// Free-function trampoline the driver invokes, registered at open time.
///
/// MM_WIM_DATA arrives on the driver's worker thread; MM_WIM_OPEN and
/// MM_WIM_CLOSE arrive synchronously from within waveInOpen/waveInClose.
unsafe extern "system" fn wave_in_proc(
    _hwi: HWAVEIN,
    umsg: u32,
    dwinstance: usize,
    dwparam1: usize,
    _dwparam2: usize,
) {
    if dwinstance == 0 {
        return;
    }
    let context = &*(dwinstance as *const CallbackContext);

    match umsg {
        MM_WIM_OPEN => context.handler.on_device_event(DeviceEvent::Opened),
        MM_WIM_DATA => {
            let header = dwparam1 as *const WAVEHDR;
            if header.is_null() {
                return;
            }
            let header = &*header;
            if let Some(slot) = Slot::from_tag(header.dwUser) {
                context.handler.on_device_event(DeviceEvent::DataReady {
                    slot,
                    byte_count: header.dwBytesRecorded as usize,
                });
            }
        }
        MM_WIM_CLOSE => context.handler.on_device_event(DeviceEvent::Closed),
        _ => {}
    }
}
