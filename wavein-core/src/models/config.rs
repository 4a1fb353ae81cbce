use std::time::Duration;

use super::format::AudioFormat;

/// Configuration for a capture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// PCM layout the device is opened with.
    pub format: AudioFormat,

    /// Samples per channel held by each of the two capture buffers.
    pub samples_per_buffer: usize,

    /// How long `stop()` waits for the worker thread to acknowledge the
    /// stop request before giving up with `CaptureError::StopTimeout`.
    pub stop_timeout: Duration,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.format.validate()?;
        if self.samples_per_buffer == 0 {
            return Err("samples per buffer must be positive".into());
        }
        if self.stop_timeout.is_zero() {
            return Err("stop timeout must be positive".into());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            samples_per_buffer: 512,
            stop_timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_buffers_and_zero_timeout() {
        let mut config = EngineConfig::default();
        config.samples_per_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.stop_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
