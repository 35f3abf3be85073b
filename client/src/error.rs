use thiserror::Error;

use tandem_shared::FilterError;

/// Failures reported by a [`RenderHost`](crate::RenderHost)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderHostError {
    #[error("Render node {node_id} not found")]
    NodeNotFound { node_id: String },

    #[error("Render node {node_id} already exists")]
    NodeAlreadyExists { node_id: String },
}

/// Errors related to mirroring one entity into the render host
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// No bridge is mirroring this entity on this participant
    #[error("No bridge for entity {entity_id}")]
    NoBridge { entity_id: String },

    /// The local render node was removed behind the bridge's back
    #[error("Local render node for entity {entity_id} no longer exists")]
    NoLocalNode { entity_id: String },

    #[error("Attribute {attribute} of entity {entity_id} is not finite")]
    NonFinite { entity_id: String, attribute: String },

    #[error("Bridge for entity {entity_id} is detached")]
    Detached { entity_id: String },

    /// Local writes are ignored until the bridge has finished initializing
    #[error("Bridge for entity {entity_id} is still initializing")]
    Initializing { entity_id: String },

    #[error("Attribute of entity {entity_id} rejected: {source}")]
    Filtered {
        entity_id: String,
        #[source]
        source: FilterError,
    },
}

/// Errors returned by [`Client`](crate::Client) requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Spawn point ({x}, {y}, {z}) is not finite")]
    InvalidSpawnPoint { x: f64, y: f64, z: f64 },

    #[error("Local avatar pose is not finite")]
    NonFinitePose,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
