//! Host-facing traits.
//!
//! The engine never owns scene data. Adapters implement `SceneGraph` over
//! their own hierarchy and, optionally, `BaselinePlayer` over whatever clip
//! player drives the entity before keyframe overrides are applied.

use crate::data::Pose;
use crate::ids::{AnimationTarget, EntityId, RootBinding};

/// Access to the live local transforms of entities and their bones.
pub trait SceneGraph {
    fn find_entity(&self, entity: EntityId) -> Option<&Pose>;
    fn find_entity_mut(&mut self, entity: EntityId) -> Option<&mut Pose>;
    fn find_bone(&self, entity: EntityId, bone: &str) -> Option<&Pose>;
    fn find_bone_mut(&mut self, entity: EntityId, bone: &str) -> Option<&mut Pose>;

    /// Name of the bone that stands in for the entity's root, if it is skinned.
    fn skeleton_root(&self, _entity: EntityId) -> Option<String> {
        None
    }
}

/// External clip player that poses an entity's whole hierarchy for a time.
pub trait BaselinePlayer {
    /// Seek to `time` and apply the pose. Returns false when the entity has no
    /// baseline animation.
    fn seek_and_apply(&mut self, entity: EntityId, time: f64, scene: &mut dyn SceneGraph)
        -> bool;
}

/// Bone name or entity transform a root binding resolves to.
pub(crate) fn root_binding_for(scene: &dyn SceneGraph, entity: EntityId) -> RootBinding {
    match scene.skeleton_root(entity) {
        Some(bone) => RootBinding::Bone(bone),
        None => RootBinding::EntityTransform,
    }
}

/// Read the live transform behind a target. Root targets go through `binding`.
pub(crate) fn read_pose(
    scene: &dyn SceneGraph,
    target: &AnimationTarget,
    binding: &RootBinding,
) -> Option<Pose> {
    match (target, binding) {
        (AnimationTarget::Bone { entity, bone }, _) => scene.find_bone(*entity, bone).copied(),
        (AnimationTarget::Root { entity }, RootBinding::Bone(bone)) => {
            scene.find_bone(*entity, bone).copied()
        }
        (AnimationTarget::Root { entity }, RootBinding::EntityTransform) => {
            scene.find_entity(*entity).copied()
        }
    }
}

/// Mutable access to the transform behind a target.
pub(crate) fn pose_mut<'a>(
    scene: &'a mut dyn SceneGraph,
    target: &AnimationTarget,
    binding: &RootBinding,
) -> Option<&'a mut Pose> {
    match (target, binding) {
        (AnimationTarget::Bone { entity, bone }, _) => scene.find_bone_mut(*entity, bone),
        (AnimationTarget::Root { entity }, RootBinding::Bone(bone)) => {
            scene.find_bone_mut(*entity, bone)
        }
        (AnimationTarget::Root { entity }, RootBinding::EntityTransform) => {
            scene.find_entity_mut(*entity)
        }
    }
}
