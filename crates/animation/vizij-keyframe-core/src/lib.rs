//! Vizij Keyframe Core (engine-agnostic)
//!
//! Sparse per-frame keyframe tracks for entity roots and skeleton bones, a
//! curve evaluator (constant, linear/slerp, per-channel Bezier), a layered
//! pose resolver that writes onto a host `SceneGraph` after an optional
//! baseline player, and the edit operations a timeline UI drives (add,
//! delete, batch move/drag, handle edits).

pub mod binding;
pub mod channel;
pub mod config;
pub mod data;
pub mod edit;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interp;
pub mod outputs;
pub mod sampling;
pub mod scene;
pub mod store;
pub mod time;

// Re-exports for consumers (adapters)
pub use binding::{BaselinePlayer, SceneGraph};
pub use channel::{Axis, BezierHandle, Channel, ChannelGroup, ChannelHandles, HandleSide};
pub use config::Config;
pub use data::{Interpolation, Keyframe, Pose, Track, Vec2};
pub use edit::{DragEntry, DragPreview, EditSession, KeyframeMove};
pub use engine::KeyframeEngine;
pub use error::KeyframeError;
pub use ids::{AnimationTarget, EntityId, KeyframeRef, RootBinding};
pub use outputs::{EditReport, TickReport};
pub use sampling::{channel_series, sample_track, ChannelSample};
pub use scene::InMemoryScene;
pub use store::KeyframeStore;
pub use time::{snap_time, FrameIndex, PlaybackContext};

pub type Result<T> = core::result::Result<T, KeyframeError>;
