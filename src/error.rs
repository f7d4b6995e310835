//! Error types for openal-audio

use crate::property::{EntityKind, Property, ValueKind};
use crate::sink::SourceId;
use crate::sys::*;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenAlError {
    #[error("{entity} has no writable property '{name}'")]
    InvalidProperty { entity: EntityKind, name: String },

    #[error("Property '{property}' expects a {expected} value")]
    PropertyType {
        property: Property,
        expected: ValueKind,
    },

    #[error("OpenAL refused to allocate a {resource} ({})", al_message(.code))]
    ResourceExhausted { resource: &'static str, code: ALenum },

    #[error("{context}: {message}")]
    ExternalOperation {
        context: &'static str,
        code: ALenum,
        message: Cow<'static, str>,
    },

    #[error("{0} is not associated with the sound sink")]
    UnassociatedEntity(SourceId),

    #[error("Could not load the OpenAL library: {0}")]
    LibraryLoad(String),

    #[error("Missing OpenAL symbol: {0}")]
    MissingSymbol(&'static str),

    #[error("Failed to open audio device {}", .0.as_deref().unwrap_or("(default)"))]
    DeviceOpen(Option<String>),

    #[error("Failed to create OpenAL context ({})", alc_message(.0))]
    ContextCreate(ALCenum),

    #[error("Unsupported buffer layout: {channels} channel(s) at {bits} bits")]
    UnsupportedFormat { channels: u16, bits: u16 },

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpenAlError>;

impl OpenAlError {
    /// Wraps an AL error code taken from the sticky error slot.
    pub fn from_al_code(context: &'static str, code: ALenum) -> Self {
        Self::ExternalOperation {
            context,
            code,
            message: al_error_message(code),
        }
    }

    /// Wraps an ALC (device level) error code.
    pub fn from_alc_code(context: &'static str, code: ALCenum) -> Self {
        Self::ExternalOperation {
            context,
            code,
            message: alc_error_message(code),
        }
    }

    /// The native error code carried by this error, if any.
    pub fn code(&self) -> Option<ALenum> {
        match self {
            Self::ExternalOperation { code, .. } | Self::ResourceExhausted { code, .. } => {
                Some(*code)
            }
            Self::ContextCreate(code) => Some(*code),
            _ => None,
        }
    }
}

fn al_message(code: &ALenum) -> Cow<'static, str> {
    al_error_message(*code)
}

fn alc_message(code: &ALCenum) -> Cow<'static, str> {
    alc_error_message(*code)
}

/// Human-readable text for an `alGetError` code.
pub fn al_error_message(code: ALenum) -> Cow<'static, str> {
    match code {
        AL_NO_ERROR => Cow::Borrowed("No Error"),
        AL_INVALID_NAME => Cow::Borrowed("Invalid name"),
        AL_INVALID_ENUM => Cow::Borrowed("Invalid enum"),
        AL_INVALID_VALUE => Cow::Borrowed("Invalid value"),
        AL_INVALID_OPERATION => Cow::Borrowed("Invalid operation"),
        AL_OUT_OF_MEMORY => Cow::Borrowed("Out of memory"),
        other => Cow::Owned(format!("Error code [{}]", other)),
    }
}

/// Human-readable text for an `alcGetError` code.
pub fn alc_error_message(code: ALCenum) -> Cow<'static, str> {
    match code {
        ALC_NO_ERROR => Cow::Borrowed("No Error"),
        ALC_INVALID_DEVICE => Cow::Borrowed("Invalid device"),
        ALC_INVALID_CONTEXT => Cow::Borrowed("Invalid context"),
        ALC_INVALID_ENUM => Cow::Borrowed("Invalid enum"),
        ALC_INVALID_VALUE => Cow::Borrowed("Invalid value"),
        ALC_OUT_OF_MEMORY => Cow::Borrowed("Out of memory"),
        other => Cow::Owned(format!("Error code [{}]", other)),
    }
}
