mod loader;

use crate::error::{OpenAlError, Result};
use crate::sys::*;
use std::sync::Arc;
use std::time::Duration;

pub use loader::{load_file, load_reader};

/// Immutable PCM sample data, ready to be uploaded to a native buffer.
///
/// Cloning is cheap: clones share the same samples.
#[derive(Debug, Clone)]
pub struct SoundData {
    inner: Arc<SoundDataInner>,
}

#[derive(Debug)]
struct SoundDataInner {
    data: Vec<u8>,
    channels: u16,
    bits: u16,
    frequency: u32,
}

impl SoundData {
    /// Wraps interleaved PCM bytes. 16-bit samples are little-endian.
    pub fn new(data: Vec<u8>, channels: u16, bits: u16, frequency: u32) -> Self {
        Self {
            inner: Arc::new(SoundDataInner {
                data,
                channels,
                bits,
                frequency,
            }),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn bits(&self) -> u16 {
        self.inner.bits
    }

    pub fn frequency(&self) -> u32 {
        self.inner.frequency
    }

    /// Size of the sample data in bytes.
    pub fn size(&self) -> usize {
        self.inner.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    pub fn duration(&self) -> Duration {
        let bytes_per_second = self.inner.channels as u64
            * (self.inner.bits as u64 / 8)
            * self.inner.frequency as u64;
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.inner.data.len() as f64 / bytes_per_second as f64)
    }

    pub fn format(&self) -> Result<BufferFormat> {
        BufferFormat::from_layout(self.inner.channels, self.inner.bits)
    }
}

/// The native buffer formats OpenAL 1.1 accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
    Mono8,
    Mono16,
    Stereo8,
    Stereo16,
}

impl BufferFormat {
    pub fn from_layout(channels: u16, bits: u16) -> Result<Self> {
        match (channels, bits) {
            (1, 8) => Ok(Self::Mono8),
            (1, 16) => Ok(Self::Mono16),
            (2, 8) => Ok(Self::Stereo8),
            (2, 16) => Ok(Self::Stereo16),
            _ => Err(OpenAlError::UnsupportedFormat { channels, bits }),
        }
    }

    pub fn code(self) -> ALenum {
        match self {
            Self::Mono8 => AL_FORMAT_MONO8,
            Self::Mono16 => AL_FORMAT_MONO16,
            Self::Stereo8 => AL_FORMAT_STEREO8,
            Self::Stereo16 => AL_FORMAT_STEREO16,
        }
    }
}
