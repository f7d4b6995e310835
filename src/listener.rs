//! The listener: the point of view sources are rendered for.

use crate::error::Result;
use crate::math::{Orientation, Pose, Vec3};
use crate::property::{EntityKind, Property, PropertyValue};
use crate::source::typed_accessors;
use crate::tracked::TrackedProperties;

#[derive(Debug, Clone)]
pub struct SoundListener {
    props: TrackedProperties,
}

impl Default for SoundListener {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundListener {
    /// A listener at rest at the origin, facing -Z with +Y up.
    pub fn new() -> Self {
        let mut listener = Self {
            props: TrackedProperties::new(EntityKind::Listener),
        };
        listener
            .set_position(Vec3::ZERO)
            .set_velocity(Vec3::ZERO)
            .set_orientation(Orientation::default());
        listener
    }

    typed_accessors! {
        position, set_position => Position: Vec3;
        velocity, set_velocity => Velocity: Vec3;
        gain, set_gain => Gain: f32;
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.props
            .get(Property::Orientation)
            .and_then(|value| value.as_orientation())
            .map(Orientation::from_array)
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> &mut Self {
        self.props
            .store(Property::Orientation, orientation.into());
        self
    }

    /// Moves the listener to `pose`, updating position and orientation.
    pub fn set_pose(&mut self, pose: &Pose) -> &mut Self {
        self.set_position(pose.position)
            .set_orientation(pose.orientation())
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
}
