//! Raw OpenAL types and enumerants.
//!
//! Mirrors `AL/al.h` and `AL/alc.h` of OpenAL 1.1. The numeric values are part
//! of the C ABI and must never change.

#![allow(non_camel_case_types, dead_code)]

use std::ffi;

// === alc.h ===

/// Opaque device handle.
#[repr(C)]
pub struct ALCdevice {
    _private: [u8; 0],
}

/// Opaque context handle.
#[repr(C)]
pub struct ALCcontext {
    _private: [u8; 0],
}

pub type ALCboolean = ffi::c_char;
pub type ALCchar = ffi::c_char;
pub type ALCbyte = ffi::c_schar;
pub type ALCubyte = ffi::c_uchar;
pub type ALCshort = ffi::c_short;
pub type ALCushort = ffi::c_ushort;
pub type ALCint = ffi::c_int;
pub type ALCuint = ffi::c_uint;
pub type ALCsizei = ffi::c_int;
pub type ALCenum = ffi::c_int;
pub type ALCfloat = ffi::c_float;
pub type ALCdouble = ffi::c_double;
pub type ALCvoid = ffi::c_void;

pub const ALC_INVALID: ALCenum = 0;
pub const ALC_FALSE: ALCboolean = 0;
pub const ALC_TRUE: ALCboolean = 1;

pub const ALC_FREQUENCY: ALCenum = 0x1007;
pub const ALC_REFRESH: ALCenum = 0x1008;
pub const ALC_SYNC: ALCenum = 0x1009;

pub const ALC_MONO_SOURCES: ALCenum = 0x1010;
pub const ALC_STEREO_SOURCES: ALCenum = 0x1011;

pub const ALC_NO_ERROR: ALCenum = 0;
pub const ALC_INVALID_DEVICE: ALCenum = 0xA001;
pub const ALC_INVALID_CONTEXT: ALCenum = 0xA002;
pub const ALC_INVALID_ENUM: ALCenum = 0xA003;
pub const ALC_INVALID_VALUE: ALCenum = 0xA004;
pub const ALC_OUT_OF_MEMORY: ALCenum = 0xA005;

pub const ALC_DEFAULT_DEVICE_SPECIFIER: ALCenum = 0x1004;
pub const ALC_DEVICE_SPECIFIER: ALCenum = 0x1005;
pub const ALC_EXTENSIONS: ALCenum = 0x1006;

pub const ALC_MAJOR_VERSION: ALCenum = 0x1000;
pub const ALC_MINOR_VERSION: ALCenum = 0x1001;

pub const ALC_ATTRIBUTES_SIZE: ALCenum = 0x1002;
pub const ALC_ALL_ATTRIBUTES: ALCenum = 0x1003;

pub const ALC_DEFAULT_ALL_DEVICES_SPECIFIER: ALCenum = 0x1012;
pub const ALC_ALL_DEVICES_SPECIFIER: ALCenum = 0x1013;

pub const ALC_CAPTURE_DEVICE_SPECIFIER: ALCenum = 0x310;
pub const ALC_CAPTURE_DEFAULT_DEVICE_SPECIFIER: ALCenum = 0x311;
pub const ALC_CAPTURE_SAMPLES: ALCenum = 0x312;

// === al.h ===

pub type ALboolean = ffi::c_char;
pub type ALchar = ffi::c_char;
pub type ALbyte = ffi::c_schar;
pub type ALubyte = ffi::c_uchar;
pub type ALshort = ffi::c_short;
pub type ALushort = ffi::c_ushort;
pub type ALint = ffi::c_int;
pub type ALuint = ffi::c_uint;
pub type ALsizei = ffi::c_int;
pub type ALenum = ffi::c_int;
pub type ALfloat = ffi::c_float;
pub type ALdouble = ffi::c_double;
pub type ALvoid = ffi::c_void;

pub const AL_INVALID: ALenum = -1;
pub const AL_NONE: ALenum = 0;

pub const AL_FALSE: ALboolean = 0;
pub const AL_TRUE: ALboolean = 1;

pub const AL_SOURCE_RELATIVE: ALenum = 0x202;

pub const AL_CONE_INNER_ANGLE: ALenum = 0x1001;
pub const AL_CONE_OUTER_ANGLE: ALenum = 0x1002;
pub const AL_PITCH: ALenum = 0x1003;
pub const AL_POSITION: ALenum = 0x1004;
pub const AL_DIRECTION: ALenum = 0x1005;
pub const AL_VELOCITY: ALenum = 0x1006;
pub const AL_LOOPING: ALenum = 0x1007;
pub const AL_BUFFER: ALenum = 0x1009;
pub const AL_GAIN: ALenum = 0x100A;
pub const AL_MIN_GAIN: ALenum = 0x100D;
pub const AL_MAX_GAIN: ALenum = 0x100E;
pub const AL_ORIENTATION: ALenum = 0x100F;

pub const AL_CHANNEL_MASK: ALenum = 0x3000;

pub const AL_SOURCE_STATE: ALenum = 0x1010;
pub const AL_INITIAL: ALenum = 0x1011;
pub const AL_PLAYING: ALenum = 0x1012;
pub const AL_PAUSED: ALenum = 0x1013;
pub const AL_STOPPED: ALenum = 0x1014;
pub const AL_BUFFERS_QUEUED: ALenum = 0x1015;
pub const AL_BUFFERS_PROCESSED: ALenum = 0x1016;

pub const AL_SEC_OFFSET: ALenum = 0x1024;
pub const AL_SAMPLE_OFFSET: ALenum = 0x1025;
pub const AL_BYTE_OFFSET: ALenum = 0x1026;
pub const AL_SOURCE_TYPE: ALenum = 0x1027;
pub const AL_STATIC: ALenum = 0x1028;
pub const AL_STREAMING: ALenum = 0x1029;
pub const AL_UNDETERMINED: ALenum = 0x1030;

pub const AL_FORMAT_MONO8: ALenum = 0x1100;
pub const AL_FORMAT_MONO16: ALenum = 0x1101;
pub const AL_FORMAT_STEREO8: ALenum = 0x1102;
pub const AL_FORMAT_STEREO16: ALenum = 0x1103;

pub const AL_REFERENCE_DISTANCE: ALenum = 0x1020;
pub const AL_ROLLOFF_FACTOR: ALenum = 0x1021;
pub const AL_CONE_OUTER_GAIN: ALenum = 0x1022;
pub const AL_MAX_DISTANCE: ALenum = 0x1023;

pub const AL_FREQUENCY: ALenum = 0x2001;
pub const AL_BITS: ALenum = 0x2002;
pub const AL_CHANNELS: ALenum = 0x2003;
pub const AL_SIZE: ALenum = 0x2004;

pub const AL_UNUSED: ALenum = 0x2010;
pub const AL_PENDING: ALenum = 0x2011;
pub const AL_PROCESSED: ALenum = 0x2012;

pub const AL_NO_ERROR: ALenum = 0;
pub const AL_INVALID_NAME: ALenum = 0xA001;
pub const AL_INVALID_ENUM: ALenum = 0xA002;
pub const AL_INVALID_VALUE: ALenum = 0xA003;
pub const AL_INVALID_OPERATION: ALenum = 0xA004;
pub const AL_OUT_OF_MEMORY: ALenum = 0xA005;

pub const AL_VENDOR: ALenum = 0xB001;
pub const AL_VERSION: ALenum = 0xB002;
pub const AL_RENDERER: ALenum = 0xB003;
pub const AL_EXTENSIONS: ALenum = 0xB004;

pub const AL_DOPPLER_FACTOR: ALenum = 0xC000;
pub const AL_DOPPLER_VELOCITY: ALenum = 0xC001;
pub const AL_SPEED_OF_SOUND: ALenum = 0xC003;

pub const AL_DISTANCE_MODEL: ALenum = 0xD000;
pub const AL_INVERSE_DISTANCE: ALenum = 0xD001;
pub const AL_INVERSE_DISTANCE_CLAMPED: ALenum = 0xD002;
pub const AL_LINEAR_DISTANCE: ALenum = 0xD003;
pub const AL_LINEAR_DISTANCE_CLAMPED: ALenum = 0xD004;
pub const AL_EXPONENT_DISTANCE: ALenum = 0xD005;
pub const AL_EXPONENT_DISTANCE_CLAMPED: ALenum = 0xD006;
