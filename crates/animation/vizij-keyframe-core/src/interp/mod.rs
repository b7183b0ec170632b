//! Segment evaluation between two keyframes.
//!
//! The interpolation mode of the left keyframe decides how the segment is
//! blended: constant holds, linear uses lerp/slerp, Bezier solves each scalar
//! channel on its own curve. Rotation Bezier curves run on the cached Euler
//! angles and are recombined into a quaternion.

pub mod functions;

use nalgebra::{UnitQuaternion, Vector3};

use crate::channel::{Channel, ChannelGroup};
use crate::config::Config;
use crate::data::{Interpolation, Keyframe, Pose, Vec2};
use crate::time::FrameIndex;
use functions::{lerp_vec3, slerp_quat, BezierSegment, SolverSettings};

impl From<&Config> for SolverSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            iterations: cfg.newton_iterations,
            tangent_epsilon: cfg.tangent_epsilon,
        }
    }
}

/// A channel whose Bezier solve hit the flat-tangent guard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegenerateChannel {
    pub channel: Channel,
    pub u: f64,
}

/// Normalized position of `frame` between two keyframe frames, clamped to [0, 1].
#[inline]
pub fn segment_fraction(prev: FrameIndex, next: FrameIndex, frame: FrameIndex) -> f64 {
    let span = (next.get() - prev.get()) as f64;
    if span <= 0.0 {
        return 0.0;
    }
    ((frame.get() - prev.get()) as f64 / span).clamp(0.0, 1.0)
}

/// Pose between `prev` and `next` at `frame`.
pub fn evaluate(prev: &Keyframe, next: &Keyframe, frame: FrameIndex, cfg: &Config) -> Pose {
    evaluate_traced(prev, next, frame, cfg, &mut Vec::new())
}

/// Same as [`evaluate`], also recording channels whose Bezier solve degenerated.
pub fn evaluate_traced(
    prev: &Keyframe,
    next: &Keyframe,
    frame: FrameIndex,
    cfg: &Config,
    degenerate: &mut Vec<DegenerateChannel>,
) -> Pose {
    if frame == prev.frame() {
        return prev.pose();
    }
    if frame == next.frame() {
        return next.pose();
    }
    let t = segment_fraction(prev.frame(), next.frame(), frame);
    evaluate_fraction(prev, next, t, cfg, degenerate)
}

/// Blend by a normalized segment fraction `t`, dispatching on the left keyframe's mode.
pub fn evaluate_fraction(
    prev: &Keyframe,
    next: &Keyframe,
    t: f64,
    cfg: &Config,
    degenerate: &mut Vec<DegenerateChannel>,
) -> Pose {
    match prev.interpolation {
        Interpolation::Constant => prev.pose(),
        Interpolation::Linear => Pose {
            position: lerp_vec3(&prev.position, &next.position, t),
            rotation: slerp_quat(&prev.rotation(), &next.rotation(), t),
            scale: lerp_vec3(&prev.scale, &next.scale, t),
        },
        Interpolation::Bezier => {
            let settings = SolverSettings::from(cfg);
            let mut eval_group = |group: ChannelGroup| -> Vector3<f64> {
                let mut out = Vector3::zeros();
                for channel in Channel::ALL.into_iter().filter(|c| c.group() == group) {
                    let (value, solve) =
                        channel_segment(prev, next, channel).evaluate(t, &settings);
                    if solve.degenerate {
                        degenerate.push(DegenerateChannel {
                            channel,
                            u: solve.u,
                        });
                    }
                    out[channel.axis().index()] = value;
                }
                out
            };
            let position = eval_group(ChannelGroup::Position);
            let euler = eval_group(ChannelGroup::Rotation);
            let scale = eval_group(ChannelGroup::Scale);
            Pose {
                position,
                rotation: UnitQuaternion::from_euler_angles(euler.x, euler.y, euler.z),
                scale,
            }
        }
    }
}

/// Bezier curve for one channel of the segment `prev -> next`, anchored at the
/// keyframes' absolute times.
pub fn channel_segment(prev: &Keyframe, next: &Keyframe, channel: Channel) -> BezierSegment {
    BezierSegment {
        start: Vec2::new(prev.time(), prev.channel_value(channel)),
        out_handle: prev.handles[channel].out_offset,
        in_handle: next.handles[channel].in_offset,
        end: Vec2::new(next.time(), next.channel_value(channel)),
    }
}
