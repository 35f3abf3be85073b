use serde::{Deserialize, Serialize};

use crate::{
    attribute::{
        merge::merge_attributes,
        value::{AttributeMap, Value, Vec3},
    },
    constants::{AVATAR_KIND, PRESENCE, PRESENCE_ANIM, ROTATION},
    types::EntityId,
    world::presence::PaletteColor,
};

/// Everything needed to admit a new entity into the replica
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityInit {
    pub id: EntityId,
    pub parent_id: Option<EntityId>,
    pub kind: String,
    pub attributes: AttributeMap,
    pub color: Option<PaletteColor>,
}

impl EntityInit {
    pub fn new(id: EntityId, kind: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: None,
            kind: kind.into(),
            attributes: AttributeMap::new(),
            color: None,
        }
    }

    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }
}

/// One synchronized node of the shared scene.
///
/// Owned by a [`SceneReplica`](crate::SceneReplica) and mutated only by
/// commands delivered through the ordered stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    parent_id: Option<EntityId>,
    kind: String,
    attributes: AttributeMap,
    color: Option<PaletteColor>,
}

impl Entity {
    pub fn new(init: EntityInit) -> Self {
        let EntityInit {
            id,
            parent_id,
            kind,
            attributes,
            color,
        } = init;

        let mut entity = Self {
            id,
            parent_id,
            kind,
            attributes: Self::default_attributes(),
            color,
        };
        entity.apply_delta(&attributes);
        entity
    }

    /// `presence: { anim: false }`
    pub fn default_attributes() -> AttributeMap {
        let mut presence = AttributeMap::new();
        presence.insert(PRESENCE_ANIM.to_string(), Value::Bool(false));

        let mut attributes = AttributeMap::new();
        attributes.insert(PRESENCE.to_string(), Value::Map(presence));
        attributes
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&EntityId> {
        self.parent_id.as_ref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn color(&self) -> Option<PaletteColor> {
        self.color
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn is_avatar(&self) -> bool {
        self.kind == AVATAR_KIND || self.id.is_avatar()
    }

    /// True if the entity carries anything beyond the default bag
    pub fn has_model_data(&self) -> bool {
        self.attributes.keys().any(|name| name != PRESENCE)
    }

    /// `presence.anim` flag driving the replicated self-animation
    pub fn is_animated(&self) -> bool {
        self.attribute(PRESENCE)
            .and_then(Value::as_map)
            .and_then(|presence| presence.get(PRESENCE_ANIM))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn rotation(&self) -> Option<Vec3> {
        self.attribute(ROTATION).and_then(Value::as_vec3)
    }

    /// Deep-merges `delta` into the attribute bag
    pub(crate) fn apply_delta(&mut self, delta: &AttributeMap) {
        merge_attributes(&mut self.attributes, delta);
    }
}
