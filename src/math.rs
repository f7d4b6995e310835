//! Math types for openal-audio

pub use glam::{Quat, Vec3};

/// Listener orientation as OpenAL expects it: an "at" vector followed by an
/// "up" vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub at: Vec3,
    pub up: Vec3,
}

impl Orientation {
    pub fn new(at: Vec3, up: Vec3) -> Self {
        Self { at, up }
    }

    pub fn to_array(&self) -> [f32; 6] {
        [
            self.at.x, self.at.y, self.at.z, self.up.x, self.up.y, self.up.z,
        ]
    }

    pub fn from_array(values: [f32; 6]) -> Self {
        Self {
            at: Vec3::new(values[0], values[1], values[2]),
            up: Vec3::new(values[3], values[4], values[5]),
        }
    }
}

impl Default for Orientation {
    /// Facing -Z with +Y up.
    fn default() -> Self {
        Self {
            at: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

/// Position plus rotation, convertible into a listener orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * (-Vec3::Z)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::new(self.forward(), self.up())
    }

    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize();
        self.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
