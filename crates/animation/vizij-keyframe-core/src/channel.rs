//! Scalar channels of a transform keyframe and their Bezier handles.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::Vec2;
use crate::error::KeyframeError;

/// Transform component group.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    Position,
    Rotation,
    Scale,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One animatable scalar. Rotation channels address the cached Euler angles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "position.x")]
    PositionX,
    #[serde(rename = "position.y")]
    PositionY,
    #[serde(rename = "position.z")]
    PositionZ,
    #[serde(rename = "rotation.x")]
    RotationX,
    #[serde(rename = "rotation.y")]
    RotationY,
    #[serde(rename = "rotation.z")]
    RotationZ,
    #[serde(rename = "scale.x")]
    ScaleX,
    #[serde(rename = "scale.y")]
    ScaleY,
    #[serde(rename = "scale.z")]
    ScaleZ,
}

impl Channel {
    pub const COUNT: usize = 9;

    pub const ALL: [Channel; Self::COUNT] = [
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
    ];

    /// Dense index into per-channel arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn group(self) -> ChannelGroup {
        match self {
            Self::PositionX | Self::PositionY | Self::PositionZ => ChannelGroup::Position,
            Self::RotationX | Self::RotationY | Self::RotationZ => ChannelGroup::Rotation,
            Self::ScaleX | Self::ScaleY | Self::ScaleZ => ChannelGroup::Scale,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Self::PositionX | Self::RotationX | Self::ScaleX => Axis::X,
            Self::PositionY | Self::RotationY | Self::ScaleY => Axis::Y,
            Self::PositionZ | Self::RotationZ | Self::ScaleZ => Axis::Z,
        }
    }

    pub fn from_parts(group: ChannelGroup, axis: Axis) -> Self {
        let base = match group {
            ChannelGroup::Position => 0,
            ChannelGroup::Rotation => 3,
            ChannelGroup::Scale => 6,
        };
        Self::ALL[base + axis.index()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PositionX => "position.x",
            Self::PositionY => "position.y",
            Self::PositionZ => "position.z",
            Self::RotationX => "rotation.x",
            Self::RotationY => "rotation.y",
            Self::RotationZ => "rotation.z",
            Self::ScaleX => "scale.x",
            Self::ScaleY => "scale.y",
            Self::ScaleZ => "scale.z",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = KeyframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| KeyframeError::UnknownChannel { name: s.to_string() })
    }
}

/// Which handle of a keyframe is being edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleSide {
    /// Arrival handle, shapes the segment ending at the keyframe.
    In,
    /// Departure handle, shapes the segment starting at the keyframe.
    Out,
}

/// In/out handle offsets for one channel, relative to the keyframe's own
/// `(time, value)` for that channel.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BezierHandle {
    #[serde(rename = "in")]
    pub in_offset: Vec2,
    #[serde(rename = "out")]
    pub out_offset: Vec2,
}

impl BezierHandle {
    /// Flat handles reaching `dt` seconds to either side.
    pub fn flat(dt: f64) -> Self {
        Self {
            in_offset: Vec2::new(-dt, 0.0),
            out_offset: Vec2::new(dt, 0.0),
        }
    }

    #[inline]
    pub fn side(&self, side: HandleSide) -> Vec2 {
        match side {
            HandleSide::In => self.in_offset,
            HandleSide::Out => self.out_offset,
        }
    }

    #[inline]
    pub fn side_mut(&mut self, side: HandleSide) -> &mut Vec2 {
        match side {
            HandleSide::In => &mut self.in_offset,
            HandleSide::Out => &mut self.out_offset,
        }
    }
}

impl Default for BezierHandle {
    fn default() -> Self {
        Self::flat(0.1)
    }
}

/// Handles for all nine channels, indexed by `Channel`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelHandles([BezierHandle; Channel::COUNT]);

impl ChannelHandles {
    pub fn uniform(handle: BezierHandle) -> Self {
        Self([handle; Channel::COUNT])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &BezierHandle)> {
        Channel::ALL.iter().copied().zip(self.0.iter())
    }
}

impl Default for ChannelHandles {
    fn default() -> Self {
        Self::uniform(BezierHandle::default())
    }
}

impl Index<Channel> for ChannelHandles {
    type Output = BezierHandle;

    fn index(&self, channel: Channel) -> &BezierHandle {
        &self.0[channel.index()]
    }
}

impl IndexMut<Channel> for ChannelHandles {
    fn index_mut(&mut self, channel: Channel) -> &mut BezierHandle {
        &mut self.0[channel.index()]
    }
}
