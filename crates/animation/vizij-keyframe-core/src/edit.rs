//! Edit operations on the keyframe store.
//!
//! Every operation is one synchronous call that either applies completely or
//! leaves the store untouched. Single-target edits return `Err` (also logged
//! as a warning) when their target is missing; batch edits skip missing items
//! and report them in an `EditReport`.
//!
//! Drags are the one multi-call gesture. `begin_drag` snapshots the selection
//! into an `EditSession`, `update_drag` only touches that session, and
//! `commit_drag` writes the whole batch at once: all destinations first, then
//! the old frames that no batch item landed on.

use hashbrown::HashSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::binding::{read_pose, root_binding_for, SceneGraph};
use crate::channel::{BezierHandle, Channel, ChannelHandles, HandleSide};
use crate::data::{Interpolation, Keyframe, Vec2};
use crate::engine::{missing_root, KeyframeEngine};
use crate::error::KeyframeError;
use crate::ids::{AnimationTarget, KeyframeRef, RootBinding};
use crate::outputs::EditReport;
use crate::time::{snap_time, FrameIndex, PlaybackContext};
use crate::Result;

/// Log and return a rejected edit.
fn reject<T>(err: KeyframeError) -> Result<T> {
    warn!("edit ignored: {err}");
    Err(err)
}

/// Clamp an edit time to the start of the timeline.
fn clamp_edit_time(field: &str, time: f64, report: Option<&mut EditReport>) -> f64 {
    let clamped = if time.is_finite() { time.max(0.0) } else { 0.0 };
    if clamped != time {
        let err = KeyframeError::InvalidRange {
            field: field.to_string(),
            value: time,
            clamped,
        };
        match report {
            Some(report) => report.push_warning(err),
            None => warn!("{err}"),
        }
    }
    clamped
}

/// Request to move one stored keyframe to a new time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeMove {
    pub target: AnimationTarget,
    pub from: FrameIndex,
    pub to_time: f64,
}

impl KeyframeMove {
    pub fn new(target: AnimationTarget, from: FrameIndex, to_time: f64) -> Self {
        Self {
            target,
            from,
            to_time,
        }
    }
}

/// A move with its keyframe data already resolved and retimed.
struct PendingMove {
    target: AnimationTarget,
    from: FrameIndex,
    keyframe: Keyframe,
}

/// Snapshot of one dragged keyframe taken at drag start. Used for previews;
/// the commit moves the keyframe's live data.
#[derive(Clone, Debug, PartialEq)]
pub struct DragEntry {
    pub target: AnimationTarget,
    pub original_frame: FrameIndex,
    pub original_time: f64,
    pub keyframe: Keyframe,
}

/// Where a dragged keyframe would land if the drag were committed now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub target: AnimationTarget,
    pub from: FrameIndex,
    pub to_frame: FrameIndex,
    pub to_time: f64,
}

/// Transient state of a multi-keyframe drag. Never touches the store.
#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    /// Primary keyframe first, then the rest of the selection.
    initial_states: Vec<DragEntry>,
    delta_time: f64,
    fps: f64,
    warnings: Vec<KeyframeError>,
}

impl EditSession {
    pub fn initial_states(&self) -> &[DragEntry] {
        &self.initial_states
    }

    /// The keyframe the pointer is holding; its snapped position sets the shared delta.
    pub fn primary(&self) -> &DragEntry {
        &self.initial_states[0]
    }

    /// Shared, snapped time offset applied to every dragged keyframe.
    #[inline]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Selection entries that were missing when the drag started.
    pub fn warnings(&self) -> &[KeyframeError] {
        &self.warnings
    }

    /// Move the pointer by `raw_delta` seconds from the drag origin.
    ///
    /// The primary keyframe snaps to the nearest frame boundary and everything
    /// else follows by the same offset. The offset is limited so no keyframe
    /// moves before time zero. Returns the applied offset.
    pub fn update_drag(&mut self, raw_delta: f64) -> f64 {
        let primary_time = self.primary().original_time;
        let mut delta = if raw_delta.is_finite() {
            snap_time(primary_time + raw_delta, self.fps) - primary_time
        } else {
            0.0
        };
        let earliest = self
            .initial_states
            .iter()
            .map(|e| e.original_time)
            .fold(f64::INFINITY, f64::min);
        if earliest + delta < 0.0 {
            debug!("drag offset {delta} limited by keyframe at {earliest}");
            delta = -earliest;
        }
        self.delta_time = delta;
        delta
    }

    /// Prospective destination of every dragged keyframe.
    pub fn preview(&self) -> Vec<DragPreview> {
        self.initial_states
            .iter()
            .map(|e| {
                let to_time = e.original_time + self.delta_time;
                DragPreview {
                    target: e.target.clone(),
                    from: e.original_frame,
                    to_frame: FrameIndex::from_time(to_time, self.fps),
                    to_time,
                }
            })
            .collect()
    }
}

impl KeyframeEngine {
    /// Capture the live transform of `target` as a keyframe at `time`.
    ///
    /// Overwrites any keyframe already at that frame. The first root keyframe
    /// of an entity fixes its root binding from the scene's skeleton root.
    pub fn add_keyframe(
        &mut self,
        scene: &dyn SceneGraph,
        target: &AnimationTarget,
        time: f64,
        interpolation: Interpolation,
        ctx: &PlaybackContext,
    ) -> Result<FrameIndex> {
        let binding = match target {
            AnimationTarget::Root { entity } => match self.store.root_binding(*entity) {
                Some(existing) => existing.clone(),
                None => root_binding_for(scene, *entity),
            },
            AnimationTarget::Bone { .. } => RootBinding::EntityTransform,
        };
        let Some(pose) = read_pose(scene, target, &binding) else {
            return reject(missing_scene_node(scene, target, binding));
        };

        let time = clamp_edit_time("time", time, None);
        let handles = ChannelHandles::uniform(BezierHandle::flat(self.cfg.default_handle_time));
        let keyframe = Keyframe::new(time, ctx.fps(), pose, interpolation).with_handles(handles);
        let frame = keyframe.frame();
        let replaced = self.store.upsert(target, keyframe).is_some();
        if let AnimationTarget::Root { entity } = target {
            self.store.bind_root(*entity, binding);
        }
        debug!(
            "keyframe {} at {target} frame {frame} ({interpolation})",
            if replaced { "replaced" } else { "added" }
        );
        Ok(frame)
    }

    /// Remove one keyframe. The track disappears with its last keyframe.
    pub fn delete_keyframe(
        &mut self,
        target: &AnimationTarget,
        frame: FrameIndex,
    ) -> Result<Keyframe> {
        match self.store.remove(target, frame) {
            Some(removed) => {
                debug!("keyframe deleted at {target} frame {frame}");
                Ok(removed)
            }
            None => reject(self.missing_keyframe(target, frame)),
        }
    }

    /// Remove every listed keyframe; missing ones are skipped.
    pub fn delete_keyframes(&mut self, refs: &[KeyframeRef]) -> EditReport {
        let mut report = EditReport::default();
        for r in refs {
            match self.store.remove(&r.target, r.frame) {
                Some(_) => report.applied += 1,
                None => report.push_warning(self.missing_keyframe(&r.target, r.frame)),
            }
        }
        debug!("deleted {} of {} keyframes", report.applied, refs.len());
        report
    }

    /// Change how the segment starting at a keyframe blends. Returns the previous mode.
    pub fn set_interpolation(
        &mut self,
        target: &AnimationTarget,
        frame: FrameIndex,
        interpolation: Interpolation,
    ) -> Result<Interpolation> {
        match self.store.keyframe_mut(target, frame) {
            Some(kf) => Ok(std::mem::replace(&mut kf.interpolation, interpolation)),
            None => reject(self.missing_keyframe(target, frame)),
        }
    }

    /// Point one handle of a keyframe's channel at an absolute `(time, value)`.
    ///
    /// The stored offset is relative to the keyframe's own time and channel value.
    pub fn move_handle(
        &mut self,
        target: &AnimationTarget,
        frame: FrameIndex,
        channel: Channel,
        side: HandleSide,
        point: Vec2,
    ) -> Result<BezierHandle> {
        let Some(kf) = self.store.keyframe_mut(target, frame) else {
            return reject(self.missing_keyframe(target, frame));
        };
        let offset = Vec2::new(point.x - kf.time(), point.y - kf.channel_value(channel));
        let handle = &mut kf.handles[channel];
        *handle.side_mut(side) = offset;
        Ok(*handle)
    }

    /// Move a single keyframe; same write-then-delete contract as a drag.
    pub fn move_keyframe(
        &mut self,
        target: &AnimationTarget,
        from: FrameIndex,
        to_time: f64,
        ctx: &PlaybackContext,
    ) -> Result<FrameIndex> {
        if self.store.keyframe(target, from).is_none() {
            return reject(self.missing_keyframe(target, from));
        }
        let to_time = clamp_edit_time("to_time", to_time, None);
        let moved = KeyframeMove::new(target.clone(), from, to_time);
        self.apply_moves(std::slice::from_ref(&moved), ctx);
        Ok(FrameIndex::from_time(to_time, ctx.fps()))
    }

    /// Move many keyframes as one batch. Each keyframe keeps its channel data.
    pub fn apply_moves(&mut self, moves: &[KeyframeMove], ctx: &PlaybackContext) -> EditReport {
        let mut report = EditReport::default();
        let mut pending = Vec::with_capacity(moves.len());
        for m in moves {
            let Some(kf) = self.store.keyframe(&m.target, m.from) else {
                report.push_warning(self.missing_keyframe(&m.target, m.from));
                continue;
            };
            let to_time = clamp_edit_time("to_time", m.to_time, Some(&mut report));
            let mut keyframe = kf.clone();
            keyframe.retime(to_time, ctx.fps());
            pending.push(PendingMove {
                target: m.target.clone(),
                from: m.from,
                keyframe,
            });
        }
        report.applied = self.commit_moves(pending);
        report
    }

    /// Snapshot the selection for a drag. Fails only when the primary keyframe is missing.
    pub fn begin_drag(
        &self,
        selection: &[KeyframeRef],
        primary: &KeyframeRef,
        ctx: &PlaybackContext,
    ) -> Result<EditSession> {
        let Some(primary_kf) = self.store.keyframe(&primary.target, primary.frame) else {
            return reject(self.missing_keyframe(&primary.target, primary.frame));
        };
        let mut initial_states = vec![DragEntry {
            target: primary.target.clone(),
            original_frame: primary.frame,
            original_time: primary_kf.time(),
            keyframe: primary_kf.clone(),
        }];
        let mut warnings = Vec::new();
        for r in selection {
            if initial_states
                .iter()
                .any(|e| e.target == r.target && e.original_frame == r.frame)
            {
                continue;
            }
            match self.store.keyframe(&r.target, r.frame) {
                Some(kf) => initial_states.push(DragEntry {
                    target: r.target.clone(),
                    original_frame: r.frame,
                    original_time: kf.time(),
                    keyframe: kf.clone(),
                }),
                None => {
                    let err = self.missing_keyframe(&r.target, r.frame);
                    warn!("drag selection skipped: {err}");
                    warnings.push(err);
                }
            }
        }
        debug!("drag started with {} keyframes", initial_states.len());
        Ok(EditSession {
            initial_states,
            delta_time: 0.0,
            fps: ctx.fps(),
            warnings,
        })
    }

    /// Forward a pointer move to the session.
    #[inline]
    pub fn update_drag(&self, session: &mut EditSession, raw_delta: f64) -> f64 {
        session.update_drag(raw_delta)
    }

    /// Write the drag as one batch. Each keyframe is moved with its current
    /// stored data, so edits made while the drag was live are kept. Keyframes
    /// deleted while the drag was live are skipped.
    pub fn commit_drag(&mut self, session: EditSession) -> EditReport {
        let mut report = EditReport {
            applied: 0,
            warnings: session.warnings,
        };
        let mut pending = Vec::with_capacity(session.initial_states.len());
        for entry in session.initial_states {
            let Some(live) = self.store.keyframe(&entry.target, entry.original_frame) else {
                report.push_warning(self.missing_keyframe(&entry.target, entry.original_frame));
                continue;
            };
            let mut keyframe = live.clone();
            keyframe.retime(entry.original_time + session.delta_time, session.fps);
            pending.push(PendingMove {
                target: entry.target,
                from: entry.original_frame,
                keyframe,
            });
        }
        report.applied = self.commit_moves(pending);
        report
    }

    /// Write every destination, then drop old frames nothing in the batch moved into.
    fn commit_moves(&mut self, batch: Vec<PendingMove>) -> usize {
        let mut destinations: HashSet<(AnimationTarget, FrameIndex)> = HashSet::new();
        for m in &batch {
            self.store.upsert(&m.target, m.keyframe.clone());
            destinations.insert((m.target.clone(), m.keyframe.frame()));
        }
        for m in &batch {
            if !destinations.contains(&(m.target.clone(), m.from)) {
                self.store.remove(&m.target, m.from);
            }
        }
        for m in &batch {
            debug!("keyframe moved at {}: {} -> {}", m.target, m.from, m.keyframe.frame());
        }
        batch.len()
    }

    /// Most specific NotFound error for a missing keyframe.
    fn missing_keyframe(&self, target: &AnimationTarget, frame: FrameIndex) -> KeyframeError {
        if self.store.has_custom_animation(target) {
            KeyframeError::KeyframeNotFound {
                target: target.clone(),
                frame,
            }
        } else {
            KeyframeError::TrackNotFound {
                target: target.clone(),
            }
        }
    }
}

/// NotFound error for a target whose scene node cannot be read.
fn missing_scene_node(
    scene: &dyn SceneGraph,
    target: &AnimationTarget,
    binding: RootBinding,
) -> KeyframeError {
    match target {
        AnimationTarget::Bone { entity, bone } => {
            if scene.find_entity(*entity).is_none() {
                KeyframeError::EntityNotFound { entity: *entity }
            } else {
                KeyframeError::BoneNotFound {
                    entity: *entity,
                    bone: bone.clone(),
                }
            }
        }
        AnimationTarget::Root { entity } => missing_root(*entity, binding),
    }
}
