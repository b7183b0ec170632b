//! Engine: owns the keyframe store and resolves poses onto a host scene.
//!
//! Methods:
//! - new, config, store, clear
//! - resolve_pose (read-only), channel_series (curve-editor read model)
//! - tick / tick_entity (baseline → bone overrides → root override)
//!
//! Edit operations live in `edit.rs` as further `impl KeyframeEngine` blocks.

use log::trace;

use crate::binding::{pose_mut, BaselinePlayer, SceneGraph};
use crate::channel::Channel;
use crate::config::Config;
use crate::data::{Pose, Track};
use crate::error::KeyframeError;
use crate::ids::{AnimationTarget, EntityId, RootBinding};
use crate::interp::DegenerateChannel;
use crate::outputs::TickReport;
use crate::sampling::{channel_series, sample_track, sample_track_traced, ChannelSample};
use crate::store::KeyframeStore;
use crate::time::PlaybackContext;

#[derive(Debug, Default, Clone)]
pub struct KeyframeEngine {
    pub(crate) cfg: Config,
    pub(crate) store: KeyframeStore,
}

impl KeyframeEngine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            store: KeyframeStore::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Read-only view of every stored track.
    #[inline]
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    /// Forget all keyframes and root bindings (document close).
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Pose of a target's track at the context's frame, or `None` without a track.
    pub fn resolve_pose(&self, target: &AnimationTarget, ctx: &PlaybackContext) -> Option<Pose> {
        let track = self.store.get_track(target)?;
        sample_track(track, ctx.current_frame(), &self.cfg)
    }

    /// Keyframe values and handles for one channel, sorted by time.
    /// Empty when the target has no track.
    pub fn channel_series(&self, target: &AnimationTarget, channel: Channel) -> Vec<ChannelSample> {
        self.store
            .get_track(target)
            .map(|track| channel_series(track, channel))
            .unwrap_or_default()
    }

    /// Resolve every animated entity, in ascending id order.
    pub fn tick(
        &self,
        ctx: &PlaybackContext,
        scene: &mut dyn SceneGraph,
        mut baseline: Option<&mut dyn BaselinePlayer>,
    ) -> TickReport {
        let mut report = TickReport::new(ctx.current_frame());
        self.check_clock(ctx, &mut report);
        for entity in self.store.animated_entities() {
            self.apply_entity(entity, ctx, scene, &mut baseline, &mut report);
        }
        report
    }

    /// Resolve a single entity. The baseline player is still consulted when the
    /// entity has no keyframes of its own.
    pub fn tick_entity(
        &self,
        entity: EntityId,
        ctx: &PlaybackContext,
        scene: &mut dyn SceneGraph,
        mut baseline: Option<&mut dyn BaselinePlayer>,
    ) -> TickReport {
        let mut report = TickReport::new(ctx.current_frame());
        self.check_clock(ctx, &mut report);
        self.apply_entity(entity, ctx, scene, &mut baseline, &mut report);
        report
    }

    fn check_clock(&self, ctx: &PlaybackContext, report: &mut TickReport) {
        let clamped = ctx.clamped_time();
        if clamped != ctx.current_time() {
            report.push_diagnostic(
                KeyframeError::InvalidRange {
                    field: "current_time".into(),
                    value: ctx.current_time(),
                    clamped,
                },
                self.cfg.max_tick_diagnostics,
            );
        }
    }

    fn apply_entity(
        &self,
        entity: EntityId,
        ctx: &PlaybackContext,
        scene: &mut dyn SceneGraph,
        baseline: &mut Option<&mut dyn BaselinePlayer>,
        report: &mut TickReport,
    ) {
        let cap = self.cfg.max_tick_diagnostics;
        let frame = report.frame;
        report.entities += 1;

        // 1) baseline
        if let Some(player) = baseline.as_mut() {
            if player.seek_and_apply(entity, ctx.clamped_time(), scene) {
                trace!("baseline applied to {entity} at {}", ctx.clamped_time());
            }
        }

        // 2) bone overrides
        for (bone, track) in self.store.bone_tracks(entity) {
            let target = AnimationTarget::bone(entity, bone);
            let Some(pose) = self.sample(&target, track, report) else {
                continue;
            };
            match scene.find_bone_mut(entity, bone) {
                Some(slot) => {
                    *slot = pose;
                    report.bones_written += 1;
                    trace!("bone override {target} @ {frame}");
                }
                None => report.push_diagnostic(
                    KeyframeError::BoneNotFound {
                        entity,
                        bone: bone.to_string(),
                    },
                    cap,
                ),
            }
        }

        // 3) root override
        if let Some(track) = self.store.root_track(entity) {
            let target = AnimationTarget::root(entity);
            let binding = self
                .store
                .root_binding(entity)
                .cloned()
                .unwrap_or_default();
            let Some(pose) = self.sample(&target, track, report) else {
                return;
            };
            match pose_mut(scene, &target, &binding) {
                Some(slot) => {
                    *slot = pose;
                    report.roots_written += 1;
                    trace!("root override {target} via {binding:?} @ {frame}");
                }
                None => report.push_diagnostic(missing_root(entity, binding), cap),
            }
        }
    }

    fn sample(
        &self,
        target: &AnimationTarget,
        track: &Track,
        report: &mut TickReport,
    ) -> Option<Pose> {
        let mut degenerate: Vec<DegenerateChannel> = Vec::new();
        let pose = sample_track_traced(track, report.frame, &self.cfg, &mut degenerate);
        for d in degenerate {
            report.push_diagnostic(
                KeyframeError::DegenerateCurve {
                    target: target.clone(),
                    channel: d.channel,
                    u: d.u,
                },
                self.cfg.max_tick_diagnostics,
            );
        }
        pose
    }
}

/// NotFound error for a root binding whose scene node is gone.
pub(crate) fn missing_root(entity: EntityId, binding: RootBinding) -> KeyframeError {
    match binding {
        RootBinding::Bone(bone) => KeyframeError::BoneNotFound { entity, bone },
        RootBinding::EntityTransform => KeyframeError::EntityNotFound { entity },
    }
}
