//! Audio property identifiers and values.
//!
//! Every [`Property`] carries its OpenAL enumerant as its discriminant, so the
//! derived ordering is the ascending order of the native codes. Sources and the
//! listener each accept a closed subset of properties, described by
//! [`SOURCE_PROPERTIES`] and [`LISTENER_PROPERTIES`].

use crate::error::{OpenAlError, Result};
use crate::math::{Orientation, Vec3};
use crate::sys::*;
use std::fmt;

/// Identifier of a source or listener property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum Property {
    SourceRelative = AL_SOURCE_RELATIVE,
    ConeInnerAngle = AL_CONE_INNER_ANGLE,
    ConeOuterAngle = AL_CONE_OUTER_ANGLE,
    Pitch = AL_PITCH,
    Position = AL_POSITION,
    Direction = AL_DIRECTION,
    Velocity = AL_VELOCITY,
    Looping = AL_LOOPING,
    Buffer = AL_BUFFER,
    Gain = AL_GAIN,
    MinGain = AL_MIN_GAIN,
    MaxGain = AL_MAX_GAIN,
    Orientation = AL_ORIENTATION,
    SourceState = AL_SOURCE_STATE,
    BuffersQueued = AL_BUFFERS_QUEUED,
    BuffersProcessed = AL_BUFFERS_PROCESSED,
    ReferenceDistance = AL_REFERENCE_DISTANCE,
    RolloffFactor = AL_ROLLOFF_FACTOR,
    ConeOuterGain = AL_CONE_OUTER_GAIN,
    MaxDistance = AL_MAX_DISTANCE,
    SecOffset = AL_SEC_OFFSET,
    SampleOffset = AL_SAMPLE_OFFSET,
    ByteOffset = AL_BYTE_OFFSET,
    SourceType = AL_SOURCE_TYPE,
}

impl Property {
    /// The OpenAL enumerant passed to the native setters and getters.
    pub fn code(self) -> ALenum {
        self as ALenum
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SourceRelative => "source_relative",
            Self::ConeInnerAngle => "cone_inner_angle",
            Self::ConeOuterAngle => "cone_outer_angle",
            Self::Pitch => "pitch",
            Self::Position => "position",
            Self::Direction => "direction",
            Self::Velocity => "velocity",
            Self::Looping => "looping",
            Self::Buffer => "buffer",
            Self::Gain => "gain",
            Self::MinGain => "min_gain",
            Self::MaxGain => "max_gain",
            Self::Orientation => "orientation",
            Self::SourceState => "source_state",
            Self::BuffersQueued => "buffers_queued",
            Self::BuffersProcessed => "buffers_processed",
            Self::ReferenceDistance => "reference_distance",
            Self::RolloffFactor => "rolloff_factor",
            Self::ConeOuterGain => "cone_outer_gain",
            Self::MaxDistance => "max_distance",
            Self::SecOffset => "sec_offset",
            Self::SampleOffset => "sample_offset",
            Self::ByteOffset => "byte_offset",
            Self::SourceType => "source_type",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Self::Position | Self::Direction | Self::Velocity => ValueKind::Vector,
            Self::Orientation => ValueKind::Orientation,
            Self::SourceRelative
            | Self::Looping
            | Self::Buffer
            | Self::SampleOffset
            | Self::ByteOffset
            | Self::SourceState
            | Self::BuffersQueued
            | Self::BuffersProcessed
            | Self::SourceType => ValueKind::Int,
            _ => ValueKind::Float,
        }
    }

    /// The property whose enumerant is `code`, if it is one of ours.
    pub fn from_code(code: ALenum) -> Option<Self> {
        SOURCE_PROPERTIES
            .iter()
            .chain(LISTENER_PROPERTIES)
            .map(|spec| spec.property)
            .find(|property| property.code() == code)
    }

    /// Initial value of a freshly generated native source (OpenAL 1.1).
    ///
    /// `None` for read-only properties and for those tied to the buffer queue.
    pub fn source_default(self) -> Option<PropertyValue> {
        let value = match self {
            Self::SourceRelative | Self::Looping => PropertyValue::Int(0),
            Self::ConeInnerAngle | Self::ConeOuterAngle => PropertyValue::Float(360.0),
            Self::Pitch | Self::Gain | Self::MaxGain => PropertyValue::Float(1.0),
            Self::ReferenceDistance | Self::RolloffFactor => PropertyValue::Float(1.0),
            Self::MinGain | Self::ConeOuterGain => PropertyValue::Float(0.0),
            Self::MaxDistance => PropertyValue::Float(f32::MAX),
            Self::Position | Self::Direction | Self::Velocity => PropertyValue::Vector(Vec3::ZERO),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of the value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Int,
    /// Three floats, transferred in one vector call.
    Vector,
    /// Six floats (`at` followed by `up`), transferred in one vector call.
    Orientation,
}

impl ValueKind {
    /// Number of native components.
    pub fn components(self) -> usize {
        match self {
            Self::Float | Self::Int => 1,
            Self::Vector => 3,
            Self::Orientation => 6,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "float",
            Self::Int => "integer",
            Self::Vector => "3-component vector",
            Self::Orientation => "6-component orientation",
        };
        f.write_str(name)
    }
}

/// A typed property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Int(i32),
    Vector(Vec3),
    Orientation([f32; 6]),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Float(_) => ValueKind::Float,
            Self::Int(_) => ValueKind::Int,
            Self::Vector(_) => ValueKind::Vector,
            Self::Orientation(_) => ValueKind::Orientation,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_int().map(|v| v != 0)
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_orientation(&self) -> Option<[f32; 6]> {
        match self {
            Self::Orientation(v) => Some(*v),
            _ => None,
        }
    }

    /// Builds a value of `kind` from raw native components.
    pub(crate) fn from_components(kind: ValueKind, floats: &[f32], int: i32) -> Self {
        match kind {
            ValueKind::Float => Self::Float(floats[0]),
            ValueKind::Int => Self::Int(int),
            ValueKind::Vector => Self::Vector(Vec3::new(floats[0], floats[1], floats[2])),
            ValueKind::Orientation => {
                let mut values = [0.0; 6];
                values.copy_from_slice(&floats[..6]);
                Self::Orientation(values)
            }
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Int(value as i32)
    }
}

impl From<Vec3> for PropertyValue {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<[f32; 3]> for PropertyValue {
    fn from(value: [f32; 3]) -> Self {
        Self::Vector(Vec3::from_array(value))
    }
}

impl From<[f32; 6]> for PropertyValue {
    fn from(value: [f32; 6]) -> Self {
        Self::Orientation(value)
    }
}

impl From<Orientation> for PropertyValue {
    fn from(value: Orientation) -> Self {
        Self::Orientation(value.to_array())
    }
}

/// Which kind of entity a property table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Source,
    Listener,
}

impl EntityKind {
    pub fn properties(self) -> &'static [PropertySpec] {
        match self {
            Self::Source => SOURCE_PROPERTIES,
            Self::Listener => LISTENER_PROPERTIES,
        }
    }

    /// Looks up a property of this entity, writable or not.
    pub fn spec(self, property: Property) -> Option<&'static PropertySpec> {
        self.properties().iter().find(|spec| spec.property == property)
    }

    /// Resolves a property name (`"gain"`, `"cone_outer_angle"`, ...).
    pub fn lookup(self, name: &str) -> Result<Property> {
        self.properties()
            .iter()
            .find(|spec| spec.property.name() == name)
            .map(|spec| spec.property)
            .ok_or_else(|| OpenAlError::InvalidProperty {
                entity: self,
                name: name.to_string(),
            })
    }

    /// Ensures `property` may be written on this entity.
    pub fn check_writable(self, property: Property) -> Result<&'static PropertySpec> {
        match self.spec(property) {
            Some(spec) if spec.writable => Ok(spec),
            _ => Err(OpenAlError::InvalidProperty {
                entity: self,
                name: property.name().to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("SoundSource"),
            Self::Listener => f.write_str("SoundListener"),
        }
    }
}

/// One row of an entity's property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub property: Property,
    pub writable: bool,
}

const fn rw(property: Property) -> PropertySpec {
    PropertySpec {
        property,
        writable: true,
    }
}

const fn ro(property: Property) -> PropertySpec {
    PropertySpec {
        property,
        writable: false,
    }
}

pub const SOURCE_PROPERTIES: &[PropertySpec] = &[
    rw(Property::SourceRelative),
    rw(Property::ConeInnerAngle),
    rw(Property::ConeOuterAngle),
    rw(Property::Pitch),
    rw(Property::Position),
    rw(Property::Direction),
    rw(Property::Velocity),
    rw(Property::Looping),
    rw(Property::Buffer),
    rw(Property::Gain),
    rw(Property::MinGain),
    rw(Property::MaxGain),
    ro(Property::SourceState),
    ro(Property::BuffersQueued),
    ro(Property::BuffersProcessed),
    rw(Property::ReferenceDistance),
    rw(Property::RolloffFactor),
    rw(Property::ConeOuterGain),
    rw(Property::MaxDistance),
    rw(Property::SecOffset),
    rw(Property::SampleOffset),
    rw(Property::ByteOffset),
    ro(Property::SourceType),
];

pub const LISTENER_PROPERTIES: &[PropertySpec] = &[
    rw(Property::Position),
    rw(Property::Velocity),
    rw(Property::Gain),
    rw(Property::Orientation),
];
