//! Keyframe store: per-entity root tracks and per-bone tracks.
//!
//! Invariants:
//! - every stored track holds at least one keyframe; removing the last one
//!   removes the track (and the entity's bone map once it is empty);
//! - each keyframe is keyed by its own `frame()`.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::data::{Keyframe, Track};
use crate::ids::{AnimationTarget, EntityId, RootBinding};
use crate::time::FrameIndex;

#[derive(Debug, Default, Clone)]
pub struct KeyframeStore {
    root_tracks: HashMap<EntityId, Track>,
    bone_tracks: HashMap<EntityId, BTreeMap<String, Track>>,
    root_bindings: HashMap<EntityId, RootBinding>,
}

impl KeyframeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the keyframe at its frame. Returns the replaced keyframe.
    pub fn upsert(&mut self, target: &AnimationTarget, keyframe: Keyframe) -> Option<Keyframe> {
        match target {
            AnimationTarget::Root { entity } => match self.root_tracks.get_mut(entity) {
                Some(track) => track.insert(keyframe),
                None => {
                    self.root_tracks.insert(*entity, Track::new(keyframe));
                    None
                }
            },
            AnimationTarget::Bone { entity, bone } => {
                let bones = self.bone_tracks.entry(*entity).or_default();
                match bones.get_mut(bone) {
                    Some(track) => track.insert(keyframe),
                    None => {
                        bones.insert(bone.clone(), Track::new(keyframe));
                        None
                    }
                }
            }
        }
    }

    /// Remove one keyframe, dropping the track when it empties. No-op if absent.
    pub fn remove(&mut self, target: &AnimationTarget, frame: FrameIndex) -> Option<Keyframe> {
        match target {
            AnimationTarget::Root { entity } => {
                let track = self.root_tracks.get_mut(entity)?;
                let removed = track.remove(frame);
                if track.is_empty() {
                    self.root_tracks.remove(entity);
                    self.root_bindings.remove(entity);
                }
                removed
            }
            AnimationTarget::Bone { entity, bone } => {
                let bones = self.bone_tracks.get_mut(entity)?;
                let track = bones.get_mut(bone)?;
                let removed = track.remove(frame);
                if track.is_empty() {
                    bones.remove(bone);
                }
                if bones.is_empty() {
                    self.bone_tracks.remove(entity);
                }
                removed
            }
        }
    }

    pub fn get_track(&self, target: &AnimationTarget) -> Option<&Track> {
        match target {
            AnimationTarget::Root { entity } => self.root_tracks.get(entity),
            AnimationTarget::Bone { entity, bone } => {
                self.bone_tracks.get(entity).and_then(|b| b.get(bone))
            }
        }
    }

    pub(crate) fn get_track_mut(&mut self, target: &AnimationTarget) -> Option<&mut Track> {
        match target {
            AnimationTarget::Root { entity } => self.root_tracks.get_mut(entity),
            AnimationTarget::Bone { entity, bone } => self
                .bone_tracks
                .get_mut(entity)
                .and_then(|b| b.get_mut(bone)),
        }
    }

    pub fn keyframe(&self, target: &AnimationTarget, frame: FrameIndex) -> Option<&Keyframe> {
        self.get_track(target).and_then(|t| t.get(frame))
    }

    pub(crate) fn keyframe_mut(
        &mut self,
        target: &AnimationTarget,
        frame: FrameIndex,
    ) -> Option<&mut Keyframe> {
        self.get_track_mut(target).and_then(|t| t.get_mut(frame))
    }

    /// Ascending frames of the target's track; empty when it has none.
    pub fn sorted_frames(&self, target: &AnimationTarget) -> Vec<FrameIndex> {
        self.get_track(target)
            .map(Track::sorted_frames)
            .unwrap_or_default()
    }

    /// Whether the target is under custom animation.
    #[inline]
    pub fn has_custom_animation(&self, target: &AnimationTarget) -> bool {
        self.get_track(target).is_some()
    }

    /// Entities with a root track or at least one bone track, ascending.
    pub fn animated_entities(&self) -> Vec<EntityId> {
        let mut out: Vec<EntityId> = self
            .root_tracks
            .keys()
            .chain(self.bone_tracks.keys())
            .copied()
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn root_track(&self, entity: EntityId) -> Option<&Track> {
        self.root_tracks.get(&entity)
    }

    /// Bone tracks of an entity in bone-name order.
    pub fn bone_tracks(&self, entity: EntityId) -> impl Iterator<Item = (&str, &Track)> {
        self.bone_tracks
            .get(&entity)
            .into_iter()
            .flat_map(|bones| bones.iter().map(|(name, track)| (name.as_str(), track)))
    }

    pub fn animated_bones(&self, entity: EntityId) -> Vec<String> {
        self.bone_tracks(entity)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn root_binding(&self, entity: EntityId) -> Option<&RootBinding> {
        self.root_bindings.get(&entity)
    }

    /// Record the root binding for an entity unless one is already chosen.
    pub fn bind_root(&mut self, entity: EntityId, binding: RootBinding) -> &RootBinding {
        self.root_bindings.entry(entity).or_insert(binding)
    }

    /// Number of stored tracks across roots and bones.
    pub fn track_count(&self) -> usize {
        self.root_tracks.len() + self.bone_tracks.values().map(BTreeMap::len).sum::<usize>()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root_tracks.is_empty() && self.bone_tracks.is_empty()
    }

    /// Drop everything (document close).
    pub fn clear(&mut self) {
        self.root_tracks.clear();
        self.bone_tracks.clear();
        self.root_bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Interpolation, Pose};

    fn kf(time: f64) -> Keyframe {
        Keyframe::new(time, 30.0, Pose::identity(), Interpolation::Linear)
    }

    #[test]
    fn upsert_creates_and_overwrites() {
        let mut store = KeyframeStore::new();
        let target = AnimationTarget::root(EntityId(1));
        assert!(store.upsert(&target, kf(1.0)).is_none());
        assert!(store.upsert(&target, kf(1.0)).is_some());
        assert_eq!(store.sorted_frames(&target), vec![FrameIndex::new(30)]);
    }

    #[test]
    fn removing_last_keyframe_drops_track_and_binding() {
        let mut store = KeyframeStore::new();
        let target = AnimationTarget::root(EntityId(1));
        store.upsert(&target, kf(0.0));
        store.bind_root(EntityId(1), RootBinding::Bone("pelvis".into()));
        assert!(store.remove(&target, FrameIndex::new(0)).is_some());
        assert!(!store.has_custom_animation(&target));
        assert!(store.root_binding(EntityId(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn bone_maps_collapse_when_empty() {
        let mut store = KeyframeStore::new();
        let a = AnimationTarget::bone(EntityId(4), "arm");
        let b = AnimationTarget::bone(EntityId(4), "leg");
        store.upsert(&a, kf(0.0));
        store.upsert(&b, kf(0.5));
        assert_eq!(store.animated_bones(EntityId(4)), vec!["arm", "leg"]);
        store.remove(&a, FrameIndex::new(0));
        assert_eq!(store.animated_entities(), vec![EntityId(4)]);
        store.remove(&b, FrameIndex::new(15));
        assert!(store.animated_entities().is_empty());
        assert_eq!(store.track_count(), 0);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = KeyframeStore::new();
        let target = AnimationTarget::bone(EntityId(9), "head");
        assert!(store.remove(&target, FrameIndex::new(3)).is_none());
        store.upsert(&target, kf(0.0));
        assert!(store.remove(&target, FrameIndex::new(3)).is_none());
        assert!(store.has_custom_animation(&target));
    }

    #[test]
    fn bind_root_keeps_first_choice() {
        let mut store = KeyframeStore::new();
        store.bind_root(EntityId(2), RootBinding::Bone("hips".into()));
        let bound = store.bind_root(EntityId(2), RootBinding::EntityTransform).clone();
        assert_eq!(bound, RootBinding::Bone("hips".into()));
    }
}
