//! Identifiers for animated scene entities and the targets their tracks drive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::FrameIndex;

/// Opaque scene entity identifier, assigned by the host scene graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// The concrete transform a track writes onto.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationTarget {
    /// The entity's designated root (its own transform or a skeleton-root bone).
    Root { entity: EntityId },
    /// One named bone under a skinned entity.
    Bone { entity: EntityId, bone: String },
}

impl AnimationTarget {
    pub fn root(entity: EntityId) -> Self {
        Self::Root { entity }
    }

    pub fn bone(entity: EntityId, bone: impl Into<String>) -> Self {
        Self::Bone {
            entity,
            bone: bone.into(),
        }
    }

    /// Entity that owns this target.
    #[inline]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Root { entity } | Self::Bone { entity, .. } => *entity,
        }
    }
}

impl fmt::Display for AnimationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { entity } => write!(f, "{entity}/root"),
            Self::Bone { entity, bone } => write!(f, "{entity}/bone:{bone}"),
        }
    }
}

/// Where a root target's pose is read from and written to, fixed when the
/// entity receives its first root keyframe.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "bone", rename_all = "snake_case")]
pub enum RootBinding {
    #[default]
    EntityTransform,
    Bone(String),
}

/// Address of one stored keyframe.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyframeRef {
    pub target: AnimationTarget,
    pub frame: FrameIndex,
}

impl KeyframeRef {
    pub fn new(target: AnimationTarget, frame: FrameIndex) -> Self {
        Self { target, frame }
    }
}
