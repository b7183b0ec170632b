//! Track sampling and the per-channel read model used by curve editors.
//!
//! Bracketing rules for a frame `f` on a track:
//! - `f <= first` → first keyframe's pose verbatim;
//! - `f >= last` → last keyframe's pose verbatim;
//! - a keyframe exactly at `f` → its pose verbatim;
//! - otherwise blend the segment `[max frame <= f, min frame > f]`.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::config::Config;
use crate::data::{Interpolation, Pose, Track, Vec2};
use crate::interp::{evaluate_traced, DegenerateChannel};
use crate::time::FrameIndex;

/// Sample a track at a frame.
pub fn sample_track(track: &Track, frame: FrameIndex, cfg: &Config) -> Option<Pose> {
    sample_track_traced(track, frame, cfg, &mut Vec::new())
}

/// Sample a track, recording Bezier channels that hit the tangent guard.
/// Returns `None` only for an empty track.
pub fn sample_track_traced(
    track: &Track,
    frame: FrameIndex,
    cfg: &Config,
    degenerate: &mut Vec<DegenerateChannel>,
) -> Option<Pose> {
    let first = track.first()?;
    if frame <= first.frame() {
        return Some(first.pose());
    }
    let last = track.last()?;
    if frame >= last.frame() {
        return Some(last.pose());
    }
    let prev = track.at_or_before(frame)?;
    if prev.frame() == frame {
        return Some(prev.pose());
    }
    let next = track.after(frame)?;
    Some(evaluate_traced(prev, next, frame, cfg, degenerate))
}

/// One keyframe's view of a single channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSample {
    pub frame: FrameIndex,
    pub time: f64,
    pub value: f64,
    pub handle_in: Vec2,
    pub handle_out: Vec2,
    pub interpolation: Interpolation,
}

/// Every keyframe's value and handles for `channel`, sorted by time ascending.
pub fn channel_series(track: &Track, channel: Channel) -> Vec<ChannelSample> {
    let mut out: Vec<ChannelSample> = track
        .iter()
        .map(|kf| {
            let handle = kf.handles[channel];
            ChannelSample {
                frame: kf.frame(),
                time: kf.time(),
                value: kf.channel_value(channel),
                handle_in: handle.in_offset,
                handle_out: handle.out_offset,
                interpolation: kf.interpolation,
            }
        })
        .collect();
    out.sort_by(|a, b| a.time.total_cmp(&b.time));
    out
}
