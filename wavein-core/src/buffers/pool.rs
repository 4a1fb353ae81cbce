use std::mem;

use super::descriptor::{BufferDescriptor, Slot};
use super::sample::Sample;

/// Fixed-capacity sample storage for one capture slot.
///
/// Backed by a boxed slice so the storage address stays stable while the
/// descriptor's raw pointer is held by the device layer.
#[derive(Debug)]
pub struct SampleBuffer<S: Sample> {
    data: Box<[S]>,
}

impl<S: Sample> SampleBuffer<S> {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![S::default(); capacity].into_boxed_slice(),
        }
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn byte_len(&self) -> usize {
        self.data.len() * mem::size_of::<S>()
    }

    pub fn as_slice(&self) -> &[S] {
        &self.data
    }

    fn as_mut_byte_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr().cast()
    }
}

/// The two sample-buffer / descriptor pairs behind double-buffered capture.
///
/// Owned exclusively by the engine; the device layer sees only raw parts via
/// the descriptors, and the delivery path sees read-only filled views.
#[derive(Debug)]
pub struct BufferPool<S: Sample> {
    buffers: [SampleBuffer<S>; 2],
    descriptors: [BufferDescriptor; 2],
}

// SAFETY: the raw pointers inside the descriptors target the pool's own
// boxed storage, which lives exactly as long as the pool. The only external
// writer through them is the OS capture facility, and only while the
// corresponding descriptor is queued; all pool access goes through the
// engine's mutex.
unsafe impl<S: Sample> Send for BufferPool<S> {}

impl<S: Sample> BufferPool<S> {
    /// Allocates both buffers at `capacity` samples each.
    pub fn new(capacity: usize) -> Self {
        let mut first = SampleBuffer::new(capacity);
        let mut second = SampleBuffer::new(capacity);
        let descriptors = [
            BufferDescriptor::new(Slot::A, first.as_mut_byte_ptr(), first.byte_len()),
            BufferDescriptor::new(Slot::B, second.as_mut_byte_ptr(), second.byte_len()),
        ];
        Self {
            buffers: [first, second],
            descriptors,
        }
    }

    /// Replaces both buffers with fresh ones of `capacity` samples.
    ///
    /// Must not be called while any descriptor is queued.
    pub fn reallocate(&mut self, capacity: usize) {
        debug_assert!(
            !self.descriptors.iter().any(BufferDescriptor::is_queued),
            "reallocating while a buffer is queued"
        );
        *self = Self::new(capacity);
    }

    pub fn descriptor(&self, slot: Slot) -> &BufferDescriptor {
        &self.descriptors[slot.index()]
    }

    pub fn descriptor_mut(&mut self, slot: Slot) -> &mut BufferDescriptor {
        &mut self.descriptors[slot.index()]
    }

    pub fn buffer(&self, slot: Slot) -> &SampleBuffer<S> {
        &self.buffers[slot.index()]
    }

    /// Read-only view of the samples the OS recorded into `slot`, truncated
    /// to the byte count it reported.
    pub fn filled(&self, slot: Slot, byte_count: usize) -> &[S] {
        let buffer = &self.buffers[slot.index()];
        let samples = (byte_count / mem::size_of::<S>()).min(buffer.capacity());
        &buffer.as_slice()[..samples]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_slots_with_matching_descriptors() {
        let pool: BufferPool<i16> = BufferPool::new(512);
        for slot in Slot::ALL {
            assert_eq!(pool.buffer(slot).capacity(), 512);
            assert_eq!(pool.descriptor(slot).slot(), slot);
            assert_eq!(pool.descriptor(slot).byte_len(), 1024);
            assert!(!pool.descriptor(slot).data_ptr().is_null());
        }
    }

    #[test]
    fn filled_view_truncates_to_recorded_bytes() {
        let pool: BufferPool<i16> = BufferPool::new(512);
        assert_eq!(pool.filled(Slot::A, 100).len(), 50);
        assert_eq!(pool.filled(Slot::A, 0).len(), 0);
        // More bytes than the buffer holds clamps to capacity.
        assert_eq!(pool.filled(Slot::B, 4096).len(), 512);
    }

    #[test]
    fn descriptor_sees_os_writes() {
        let mut pool: BufferPool<i16> = BufferPool::new(4);
        let descriptor = pool.descriptor_mut(Slot::A);
        let (ptr, len) = (descriptor.data_ptr(), descriptor.byte_len());

        // The device layer writes through the raw parts, as the OS would.
        unsafe { std::slice::from_raw_parts_mut(ptr, len) }.fill(0x01);

        assert_eq!(pool.filled(Slot::A, len), &[0x0101i16; 4]);
    }

    #[test]
    fn reallocate_resizes_both_slots() {
        let mut pool: BufferPool<i16> = BufferPool::new(4);
        pool.reallocate(8);
        for slot in Slot::ALL {
            assert_eq!(pool.buffer(slot).capacity(), 8);
            assert_eq!(pool.descriptor(slot).byte_len(), 16);
        }
    }
}
