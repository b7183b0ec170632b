//! Error types for keyframe editing and pose evaluation.
//!
//! Nothing in this crate is fatal: edit operations that hit one of these
//! become no-ops, and evaluation problems are reported as tick diagnostics.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::ids::{AnimationTarget, EntityId};
use crate::time::FrameIndex;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum KeyframeError {
    /// Scene entity not found
    #[error("Entity not found: {entity}")]
    EntityNotFound { entity: EntityId },

    /// Named bone not found under an entity
    #[error("Bone not found: {bone} under {entity}")]
    BoneNotFound { entity: EntityId, bone: String },

    /// No track stored for the target
    #[error("Track not found: {target}")]
    TrackNotFound { target: AnimationTarget },

    /// No keyframe stored at the frame
    #[error("Keyframe not found: frame {frame} in {target}")]
    KeyframeNotFound {
        target: AnimationTarget,
        frame: FrameIndex,
    },

    /// Bezier tangent guard fired; evaluation used the clamped parameter
    #[error("Degenerate curve on {channel} of {target}: flat time tangent at u = {u}")]
    DegenerateCurve {
        target: AnimationTarget,
        channel: Channel,
        u: f64,
    },

    /// Out-of-range input that was clamped
    #[error("Invalid range for {field}: {value} clamped to {clamped}")]
    InvalidRange {
        field: String,
        value: f64,
        clamped: f64,
    },

    /// Frame rate must be finite and positive
    #[error("Invalid frame rate: {fps}")]
    InvalidFrameRate { fps: f64 },

    #[error("Unknown interpolation mode: {name}")]
    UnknownInterpolation { name: String },

    #[error("Unknown channel: {name}")]
    UnknownChannel { name: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl KeyframeError {
    /// NotFound errors mean the requested selection no longer exists.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound { .. }
                | Self::BoneNotFound { .. }
                | Self::TrackNotFound { .. }
                | Self::KeyframeNotFound { .. }
        )
    }

    /// Check if this is a recoverable error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        self.is_not_found()
            || matches!(
                self,
                Self::DegenerateCurve { .. } | Self::InvalidRange { .. }
            )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EntityNotFound { .. }
            | Self::BoneNotFound { .. }
            | Self::TrackNotFound { .. }
            | Self::KeyframeNotFound { .. } => "not_found",
            Self::DegenerateCurve { .. } => "curve",
            Self::InvalidRange { .. } => "range",
            Self::InvalidFrameRate { .. }
            | Self::UnknownInterpolation { .. }
            | Self::UnknownChannel { .. } => "validation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for KeyframeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
