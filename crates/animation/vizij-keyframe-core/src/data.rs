//! Keyframe data model.
//!
//! A `Track` is a sparse, frame-ordered map of `Keyframe`s for one animation
//! target. Tracks are only created and mutated through `KeyframeStore`, which
//! guarantees they are never left empty.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ChannelGroup, ChannelHandles};
use crate::error::KeyframeError;
use crate::time::FrameIndex;

/// 2D offset in (time, value) space. `x` is seconds, `y` is channel units.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Local transform of an entity or bone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Pose {
    pub fn new(
        position: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        scale: Vector3<f64>,
    ) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// How the segment starting at a keyframe blends toward the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Hold the left keyframe until the next one.
    Constant,
    #[default]
    Linear,
    /// Per-channel cubic Bezier shaped by the keyframes' handles.
    Bezier,
}

impl Interpolation {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Linear => "linear",
            Self::Bezier => "bezier",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = KeyframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" => Ok(Self::Constant),
            "linear" => Ok(Self::Linear),
            "bezier" => Ok(Self::Bezier),
            _ => Err(KeyframeError::UnknownInterpolation { name: s.to_string() }),
        }
    }
}

/// One sampled transform at a point on the timeline.
///
/// `frame` is derived from `time` whenever this crate sets the time. The
/// rotation is stored both as a quaternion and as cached Euler angles (roll,
/// pitch, yaw about X, Y, Z); the setters keep the two in sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    time: f64,
    frame: FrameIndex,
    pub position: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    rotation_euler: Vector3<f64>,
    pub scale: Vector3<f64>,
    pub interpolation: Interpolation,
    pub handles: ChannelHandles,
}

impl Keyframe {
    /// Capture a pose at `time`, keyed at `round(time * fps)`.
    pub fn new(time: f64, fps: f64, pose: Pose, interpolation: Interpolation) -> Self {
        let mut keyframe = Self {
            time,
            frame: FrameIndex::from_time(time, fps),
            position: pose.position,
            rotation: pose.rotation,
            rotation_euler: Vector3::zeros(),
            scale: pose.scale,
            interpolation,
            handles: ChannelHandles::default(),
        };
        keyframe.set_rotation(pose.rotation);
        keyframe
    }

    pub fn with_handles(mut self, handles: ChannelHandles) -> Self {
        self.handles = handles;
        self
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    #[inline]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    #[inline]
    pub fn rotation_euler(&self) -> Vector3<f64> {
        self.rotation_euler
    }

    /// Write the rotation and refresh the cached Euler decomposition.
    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        let (roll, pitch, yaw) = rotation.euler_angles();
        self.rotation = rotation;
        self.rotation_euler = Vector3::new(roll, pitch, yaw);
    }

    /// Write the rotation from Euler angles (X, Y, Z).
    pub fn set_rotation_euler(&mut self, euler: Vector3<f64>) {
        self.rotation = UnitQuaternion::from_euler_angles(euler.x, euler.y, euler.z);
        self.rotation_euler = euler;
    }

    /// Move the keyframe in time; the frame key follows.
    pub fn retime(&mut self, time: f64, fps: f64) {
        self.time = time;
        self.frame = FrameIndex::from_time(time, fps);
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Scalar value of one channel; rotation channels read the Euler cache.
    pub fn channel_value(&self, channel: Channel) -> f64 {
        let axis = channel.axis().index();
        match channel.group() {
            ChannelGroup::Position => self.position[axis],
            ChannelGroup::Rotation => self.rotation_euler[axis],
            ChannelGroup::Scale => self.scale[axis],
        }
    }
}

/// Frame-ordered keyframes for one target. Never empty while owned by a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    keys: BTreeMap<FrameIndex, Keyframe>,
}

impl Track {
    pub(crate) fn new(first: Keyframe) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(first.frame(), first);
        Self { keys }
    }

    pub(crate) fn insert(&mut self, keyframe: Keyframe) -> Option<Keyframe> {
        self.keys.insert(keyframe.frame(), keyframe)
    }

    pub(crate) fn remove(&mut self, frame: FrameIndex) -> Option<Keyframe> {
        self.keys.remove(&frame)
    }

    pub(crate) fn get_mut(&mut self, frame: FrameIndex) -> Option<&mut Keyframe> {
        self.keys.get_mut(&frame)
    }

    #[inline]
    pub fn get(&self, frame: FrameIndex) -> Option<&Keyframe> {
        self.keys.get(&frame)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.values().next()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.values().next_back()
    }

    /// Keyframes in ascending frame order.
    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.keys.values()
    }

    pub fn sorted_frames(&self) -> Vec<FrameIndex> {
        self.keys.keys().copied().collect()
    }

    /// Last keyframe at or before `frame`.
    pub fn at_or_before(&self, frame: FrameIndex) -> Option<&Keyframe> {
        self.keys.range(..=frame).next_back().map(|(_, k)| k)
    }

    /// First keyframe strictly after `frame`.
    pub fn after(&self, frame: FrameIndex) -> Option<&Keyframe> {
        self.keys
            .range((std::ops::Bound::Excluded(frame), std::ops::Bound::Unbounded))
            .next()
            .map(|(_, k)| k)
    }
}
