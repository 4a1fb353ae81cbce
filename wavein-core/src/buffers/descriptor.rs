use serde::{Deserialize, Serialize};

/// Identifies one of the two capture buffers.
///
/// The slot tag travels to the OS layer when a buffer is enqueued and comes
/// back with the completion notification, correlating it to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::A, Slot::B];

    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    /// Resolves an OS-side tag back to a slot.
    pub fn from_tag(tag: usize) -> Option<Slot> {
        match tag {
            0 => Some(Slot::A),
            1 => Some(Slot::B),
            _ => None,
        }
    }
}

/// OS-facing bookkeeping for one capture buffer.
///
/// Mirrors the header the audio driver works with: the raw pointer and byte
/// length of the storage, the slot tag, and the prepare/queue lifecycle
/// flags. A descriptor must be prepared before it is enqueued and unprepared
/// before the device is closed, and is never queued twice concurrently.
#[derive(Debug)]
pub struct BufferDescriptor {
    slot: Slot,
    data: *mut u8,
    byte_len: usize,
    prepared: bool,
    queued: bool,
}

impl BufferDescriptor {
    pub(crate) fn new(slot: Slot, data: *mut u8, byte_len: usize) -> Self {
        Self {
            slot,
            data,
            byte_len,
            prepared: false,
            queued: false,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Raw storage pointer handed to the device layer while the buffer is
    /// queued. The OS capture facility is the only writer through it.
    pub fn data_ptr(&self) -> *mut u8 {
        self.data
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    pub(crate) fn mark_prepared(&mut self) {
        self.prepared = true;
    }

    pub(crate) fn mark_unprepared(&mut self) {
        self.prepared = false;
    }

    pub(crate) fn mark_queued(&mut self) {
        debug_assert!(self.prepared, "descriptor queued before being prepared");
        debug_assert!(!self.queued, "descriptor queued twice concurrently");
        self.queued = true;
    }

    /// Marks the buffer as returned by the OS (completion or flush).
    pub(crate) fn mark_returned(&mut self) {
        self.queued = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_tags_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_tag(slot.index()), Some(slot));
        }
        assert_eq!(Slot::from_tag(2), None);
    }

    #[test]
    fn lifecycle_flags() {
        let mut data = [0u8; 4];
        let mut descriptor = BufferDescriptor::new(Slot::A, data.as_mut_ptr(), data.len());

        assert!(!descriptor.is_prepared());
        assert!(!descriptor.is_queued());

        descriptor.mark_prepared();
        descriptor.mark_queued();
        assert!(descriptor.is_queued());

        descriptor.mark_returned();
        assert!(!descriptor.is_queued());
        assert!(descriptor.is_prepared());

        descriptor.mark_unprepared();
        assert!(!descriptor.is_prepared());
    }
}
