use serde::{Deserialize, Serialize};

/// Linear-PCM capture format.
///
/// Only the three primary fields are stored; `block_align` and
/// `avg_bytes_per_sec` are recomputed on every call so they can never drift
/// out of sync with the fields they derive from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub channels: u16,

    /// Bits per sample. Valid values: 8, 16, 24, 32.
    pub bits_per_sample: u16,

    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioFormat {
    pub fn new(channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            bits_per_sample,
            sample_rate,
        }
    }

    /// Bytes per sample frame: channels × bits / 8.
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    /// Bytes per second of audio: sample rate × block align.
    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("channel count must be at least 1".into());
        }
        if ![8, 16, 24, 32].contains(&self.bits_per_sample) {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        Ok(())
    }
}

impl Default for AudioFormat {
    /// Mono 16-bit at 22050 Hz, the layout the engine was built around.
    fn default() -> Self {
        Self {
            channels: 1,
            bits_per_sample: 16,
            sample_rate: 22_050,
        }
    }
}
