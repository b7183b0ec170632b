//! Headless `SceneGraph` for tools and tests.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::binding::SceneGraph;
use crate::data::Pose;
use crate::ids::EntityId;

#[derive(Clone, Debug, Default)]
struct SceneEntity {
    transform: Pose,
    bones: BTreeMap<String, Pose>,
    skeleton_root: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryScene {
    entities: HashMap<EntityId, SceneEntity>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entity with the given local transform and no bones.
    pub fn insert_entity(&mut self, entity: EntityId, transform: Pose) {
        self.entities.insert(
            entity,
            SceneEntity {
                transform,
                ..SceneEntity::default()
            },
        );
    }

    /// Add or replace a bone. Returns false when the entity is unknown.
    pub fn insert_bone(&mut self, entity: EntityId, bone: impl Into<String>, pose: Pose) -> bool {
        self.entities
            .get_mut(&entity)
            .map(|e| e.bones.insert(bone.into(), pose))
            .is_some()
    }

    /// Mark `bone` as the entity's skeleton root. Returns false when the entity is unknown.
    pub fn set_skeleton_root(&mut self, entity: EntityId, bone: impl Into<String>) -> bool {
        self.entities
            .get_mut(&entity)
            .map(|e| e.skeleton_root = Some(bone.into()))
            .is_some()
    }
}

impl SceneGraph for InMemoryScene {
    fn find_entity(&self, entity: EntityId) -> Option<&Pose> {
        self.entities.get(&entity).map(|e| &e.transform)
    }

    fn find_entity_mut(&mut self, entity: EntityId) -> Option<&mut Pose> {
        self.entities.get_mut(&entity).map(|e| &mut e.transform)
    }

    fn find_bone(&self, entity: EntityId, bone: &str) -> Option<&Pose> {
        self.entities.get(&entity).and_then(|e| e.bones.get(bone))
    }

    fn find_bone_mut(&mut self, entity: EntityId, bone: &str) -> Option<&mut Pose> {
        self.entities
            .get_mut(&entity)
            .and_then(|e| e.bones.get_mut(bone))
    }

    fn skeleton_root(&self, entity: EntityId) -> Option<String> {
        self.entities
            .get(&entity)
            .and_then(|e| e.skeleton_root.clone())
    }
}
