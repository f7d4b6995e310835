//! Sound sources.

use crate::error::Result;
use crate::math::Vec3;
use crate::property::{EntityKind, Property, PropertyValue};
use crate::sound_data::SoundData;
use crate::sys::*;
use crate::tracked::TrackedProperties;
use std::collections::VecDeque;

/// Generates a typed getter/setter pair for each listed property.
macro_rules! typed_accessors {
    ($($get:ident, $set:ident => $property:ident: $ty:ty;)*) => {
        $(
            pub fn $get(&self) -> Option<$ty> {
                self.props
                    .get(Property::$property)
                    .and_then(|value| <$ty as $crate::source::AccessorValue>::read(&value))
            }

            pub fn $set(&mut self, value: $ty) -> &mut Self {
                self.props.store(
                    Property::$property,
                    $crate::source::AccessorValue::into_value(value),
                );
                self
            }
        )*
    };
}

pub(crate) use typed_accessors;

/// Conversion between typed accessor values and [`PropertyValue`].
pub(crate) trait AccessorValue: Sized {
    fn read(value: &PropertyValue) -> Option<Self>;
    fn into_value(self) -> PropertyValue;
}

impl AccessorValue for f32 {
    fn read(value: &PropertyValue) -> Option<Self> {
        value.as_float()
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Float(self)
    }
}

impl AccessorValue for i32 {
    fn read(value: &PropertyValue) -> Option<Self> {
        value.as_int()
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Int(self)
    }
}

impl AccessorValue for bool {
    fn read(value: &PropertyValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Int(self as i32)
    }
}

impl AccessorValue for Vec3 {
    fn read(value: &PropertyValue) -> Option<Self> {
        value.as_vec3()
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Vector(self)
    }
}

/// Playback state reported by the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Initial,
    Playing,
    Paused,
    Stopped,
}

impl SourceState {
    pub fn from_code(code: ALint) -> Option<Self> {
        match code {
            AL_INITIAL => Some(Self::Initial),
            AL_PLAYING => Some(Self::Playing),
            AL_PAUSED => Some(Self::Paused),
            AL_STOPPED => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// A positional sound emitter.
///
/// Property writes are recorded locally and delivered by
/// [`SoundSink::update`](crate::SoundSink::update). Read-only values such as
/// [`state`](Self::state) are only known after
/// [`SoundSink::refresh`](crate::SoundSink::refresh).
#[derive(Debug, Clone)]
pub struct SoundSource {
    props: TrackedProperties,
    pending: VecDeque<SoundData>,
}

impl Default for SoundSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundSource {
    /// A source with unit gain and pitch at rest at the origin. All four
    /// defaults are pending delivery.
    pub fn new() -> Self {
        let mut source = Self {
            props: TrackedProperties::new(EntityKind::Source),
            pending: VecDeque::new(),
        };
        source
            .set_gain(1.0)
            .set_pitch(1.0)
            .set_position(Vec3::ZERO)
            .set_velocity(Vec3::ZERO);
        source
    }

    typed_accessors! {
        gain, set_gain => Gain: f32;
        pitch, set_pitch => Pitch: f32;
        min_gain, set_min_gain => MinGain: f32;
        max_gain, set_max_gain => MaxGain: f32;
        reference_distance, set_reference_distance => ReferenceDistance: f32;
        rolloff_factor, set_rolloff_factor => RolloffFactor: f32;
        max_distance, set_max_distance => MaxDistance: f32;
        cone_inner_angle, set_cone_inner_angle => ConeInnerAngle: f32;
        cone_outer_angle, set_cone_outer_angle => ConeOuterAngle: f32;
        cone_outer_gain, set_cone_outer_gain => ConeOuterGain: f32;
        sec_offset, set_sec_offset => SecOffset: f32;
        sample_offset, set_sample_offset => SampleOffset: i32;
        byte_offset, set_byte_offset => ByteOffset: i32;
        position, set_position => Position: Vec3;
        velocity, set_velocity => Velocity: Vec3;
        direction, set_direction => Direction: Vec3;
        looping, set_looping => Looping: bool;
        source_relative, set_source_relative => SourceRelative: bool;
    }

    /// Last state read by a refresh.
    pub fn state(&self) -> Option<SourceState> {
        self.int(Property::SourceState).and_then(SourceState::from_code)
    }

    pub fn buffers_queued(&self) -> Option<i32> {
        self.int(Property::BuffersQueued)
    }

    pub fn buffers_processed(&self) -> Option<i32> {
        self.int(Property::BuffersProcessed)
    }

    fn int(&self, property: Property) -> Option<i32> {
        self.props.get(property).and_then(|value| value.as_int())
    }

    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) -> Result<()> {
        self.props.set(property, value)
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.props.set_by_name(name, value)
    }

    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        self.props.get(property)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<PropertyValue>> {
        self.props.get_by_name(name)
    }

    pub fn unset(&mut self, property: Property) -> Result<Option<PropertyValue>> {
        self.props.unset(property)
    }

    /// Whether property changes are waiting for the next update.
    pub fn changed(&self) -> bool {
        self.props.changed()
    }

    pub fn dirty(&self) -> impl Iterator<Item = Property> + '_ {
        self.props.dirty()
    }

    pub fn properties(&self) -> &TrackedProperties {
        &self.props
    }

    pub(crate) fn properties_mut(&mut self) -> &mut TrackedProperties {
        &mut self.props
    }

    /// Appends `data` to the source's play queue. It is uploaded to a native
    /// buffer on the next update.
    ///
    /// Data without a native buffer format is refused with
    /// [`OpenAlError::UnsupportedFormat`](crate::OpenAlError::UnsupportedFormat)
    /// and never enters the queue.
    pub fn queue(&mut self, data: SoundData) -> Result<()> {
        data.format()?;
        self.pending.push_back(data);
        Ok(())
    }

    /// Sound data queued but not yet uploaded.
    pub fn pending(&self) -> impl Iterator<Item = &SoundData> {
        self.pending.iter()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn pending_mut(&mut self) -> &mut VecDeque<SoundData> {
        &mut self.pending
    }
}
