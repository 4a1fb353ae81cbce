/// Fixed-layout PCM element stored in a capture buffer.
///
/// The buffer element type is selected at engine construction and must match
/// the bit depth of the `AudioFormat` the device is opened with.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Bits per sample as reported in the wave format.
    const BITS: u16;
}

impl Sample for u8 {
    const BITS: u16 = 8;
}

impl Sample for i16 {
    const BITS: u16 = 16;
}

impl Sample for i32 {
    const BITS: u16 = 32;
}

impl Sample for f32 {
    const BITS: u16 = 32;
}
