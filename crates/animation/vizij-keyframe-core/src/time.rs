//! Timeline time handling.
//!
//! Keyframes are stored under an integer frame number derived from their time
//! in seconds. `FrameIndex` is the only way to produce that key, so rounding
//! happens in one place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;

/// Integer frame number on the timeline (`round(time * fps)`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FrameIndex(i64);

impl FrameIndex {
    /// Wrap an already-snapped frame number.
    #[inline]
    pub const fn new(frame: i64) -> Self {
        Self(frame)
    }

    /// Snap a time in seconds to the nearest frame boundary.
    #[inline]
    pub fn from_time(seconds: f64, fps: f64) -> Self {
        Self((seconds * fps).round() as i64)
    }

    /// Time of this frame boundary in seconds.
    #[inline]
    pub fn to_time(self, fps: f64) -> f64 {
        self.0 as f64 / fps
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for FrameIndex {
    fn from(frame: i64) -> Self {
        Self(frame)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snap a time to the closest frame boundary, returned in seconds.
#[inline]
pub fn snap_time(seconds: f64, fps: f64) -> f64 {
    FrameIndex::from_time(seconds, fps).to_time(fps)
}

/// Explicit playback clock handed to the resolver and to edit operations.
/// Only built through [`PlaybackContext::new`], so `fps` is always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackContext {
    current_time: f64,
    fps: f64,
}

impl PlaybackContext {
    pub fn new(current_time: f64, fps: f64) -> Result<Self, KeyframeError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(KeyframeError::InvalidFrameRate { fps });
        }
        Ok(Self { current_time, fps })
    }

    /// Absolute timeline time in seconds, unclamped.
    #[inline]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Same clock rate, different position.
    #[inline]
    pub fn at(&self, current_time: f64) -> Self {
        Self {
            current_time,
            fps: self.fps,
        }
    }

    /// Current time with negative or non-finite values clamped to zero.
    #[inline]
    pub fn clamped_time(&self) -> f64 {
        if self.current_time.is_finite() {
            self.current_time.max(0.0)
        } else {
            0.0
        }
    }

    /// Frame under the playhead.
    #[inline]
    pub fn current_frame(&self) -> FrameIndex {
        FrameIndex::from_time(self.clamped_time(), self.fps)
    }

    #[inline]
    pub fn frame_of(&self, seconds: f64) -> FrameIndex {
        FrameIndex::from_time(seconds, self.fps)
    }
}
