use tandem_shared::{AttributeMap, EntityId, HostValue, PaletteColor, Value};

use crate::error::RenderHostError;

/// How a host should dress an avatar node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvatarAppearance {
    pub color: PaletteColor,
    /// True for the avatar of the participant running this host
    pub is_local: bool,
}

/// Everything a host needs to create a render node for an entity
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub id: EntityId,
    pub kind: String,
    pub parent: Option<EntityId>,
    pub attributes: AttributeMap,
    pub avatar: Option<AvatarAppearance>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub kind: String,
    pub parent: Option<EntityId>,
}

/// Something local code did to the render graph
#[derive(Clone, Debug, PartialEq)]
pub enum LocalNodeEvent {
    /// Local code wrote an attribute
    AttributeSet {
        node_id: EntityId,
        name: String,
        value: HostValue,
    },
    /// A node not yet bound to any entity became ready
    NodeReady { node_id: EntityId },
    /// Local code asked for the node to leave the shared scene
    NodeRemoved { node_id: EntityId },
}

/// The local rendering framework, seen from the replication core.
///
/// Render nodes share their id with the entity they mirror. Writes made
/// through [`set_attribute`](RenderHost::set_attribute) are model-driven
/// and must never come back as [`LocalNodeEvent::AttributeSet`].
pub trait RenderHost {
    fn create_node(&mut self, spec: NodeSpec) -> Result<(), RenderHostError>;

    fn destroy_node(&mut self, node_id: &EntityId) -> Result<(), RenderHostError>;

    fn has_node(&self, node_id: &EntityId) -> bool;

    /// Applies a model-driven attribute update. Map values are merged into
    /// the node's existing value; anything else replaces it.
    fn set_attribute(
        &mut self,
        node_id: &EntityId,
        name: &str,
        value: &Value,
    ) -> Result<(), RenderHostError>;

    fn get_attribute(&self, node_id: &EntityId, name: &str) -> Option<HostValue>;

    fn attribute_names(&self, node_id: &EntityId) -> Vec<String>;

    fn node_info(&self, node_id: &EntityId) -> Option<NodeInfo>;

    /// Drains everything local code did since the last call, in order
    fn poll_local_events(&mut self) -> Vec<LocalNodeEvent>;
}
