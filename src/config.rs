//! Configuration for opening a sound sink

use crate::sys::*;
use std::path::PathBuf;

/// How source gain falls off with distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceModel {
    None,
    Inverse,
    InverseClamped,
    Linear,
    LinearClamped,
    Exponent,
    ExponentClamped,
}

impl DistanceModel {
    pub fn code(self) -> ALenum {
        match self {
            Self::None => AL_NONE,
            Self::Inverse => AL_INVERSE_DISTANCE,
            Self::InverseClamped => AL_INVERSE_DISTANCE_CLAMPED,
            Self::Linear => AL_LINEAR_DISTANCE,
            Self::LinearClamped => AL_LINEAR_DISTANCE_CLAMPED,
            Self::Exponent => AL_EXPONENT_DISTANCE,
            Self::ExponentClamped => AL_EXPONENT_DISTANCE_CLAMPED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkConfig {
    /// Output device name; `None` opens the default device.
    pub device_name: Option<String>,
    /// Mixing frequency in Hz.
    pub frequency: Option<i32>,
    /// Refresh intervals per second.
    pub refresh: Option<i32>,
    pub sync: Option<bool>,
    /// Hint for the number of mono sources the context should support.
    pub mono_sources: Option<i32>,
    pub stereo_sources: Option<i32>,
    /// Explicit path of the OpenAL shared library.
    pub library_path: Option<PathBuf>,
    pub distance_model: Option<DistanceModel>,
    pub doppler_factor: Option<f32>,
    pub speed_of_sound: Option<f32>,
}

impl SinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn frequency(mut self, frequency: i32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn refresh(mut self, refresh: i32) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn mono_sources(mut self, count: i32) -> Self {
        self.mono_sources = Some(count);
        self
    }

    pub fn stereo_sources(mut self, count: i32) -> Self {
        self.stereo_sources = Some(count);
        self
    }

    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn distance_model(mut self, model: DistanceModel) -> Self {
        self.distance_model = Some(model);
        self
    }

    pub fn doppler_factor(mut self, factor: f32) -> Self {
        self.doppler_factor = Some(factor);
        self
    }

    pub fn speed_of_sound(mut self, speed: f32) -> Self {
        self.speed_of_sound = Some(speed);
        self
    }

    /// Zero-terminated attribute list for `alcCreateContext`.
    pub fn context_attributes(&self) -> Vec<ALCint> {
        let mut attributes = Vec::new();
        let pairs = [
            (ALC_FREQUENCY, self.frequency),
            (ALC_REFRESH, self.refresh),
            (ALC_SYNC, self.sync.map(ALCint::from)),
            (ALC_MONO_SOURCES, self.mono_sources),
            (ALC_STEREO_SOURCES, self.stereo_sources),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                attributes.push(key);
                attributes.push(value);
            }
        }
        attributes.push(0);
        attributes
    }
}
