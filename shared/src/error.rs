use thiserror::Error;

/// Reasons an attribute value is kept out of replication.
///
/// None of these are fatal: the attribute is omitted from the outgoing
/// delta and the session carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Attribute is not on the allow-list for this kind of entity
    #[error("Attribute {attribute} is not syncable on avatar entities")]
    NotSyncable { attribute: String },

    /// Value is a function or other host object with no replicated form
    #[error("Value of kind {kind} cannot be serialized for replication")]
    NonSerializable { kind: &'static str },

    /// Value contains NaN or an infinite number
    #[error("Value contains a non-finite number")]
    NonFinite,

    /// Value nests deeper than normalization allows
    #[error("Value nests deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },
}

/// Errors surfaced by [`SceneReplica`](crate::SceneReplica) operations.
///
/// Every replica sees the same commands in the same order, so each of
/// these is raised identically everywhere and recovered by skipping the
/// command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicaError {
    /// A change or removal targets an entity that is gone (expected under leave/edit races)
    #[error("Entity {entity_id} not found")]
    EntityNotFound { entity_id: String },

    /// An admission request names an entity that already exists
    #[error("Entity {entity_id} already exists")]
    EntityAlreadyExists { entity_id: String },

    /// Participant has no presence record
    #[error("Participant {participant_id} has no presence record")]
    ParticipantNotFound { participant_id: String },

    /// A delta carries NaN or an infinite number
    #[error("Change for entity {entity_id} contains a non-finite value")]
    NonFiniteDelta { entity_id: String },

    /// Spawn point reconfiguration with a non-finite coordinate
    #[error("Spawn point ({x}, {y}, {z}) is not finite")]
    InvalidSpawnPoint { x: f64, y: f64, z: f64 },

    /// Command index already applied on this replica
    #[error("Command {index} already applied (last applied {last_applied})")]
    DuplicateCommand { index: u64, last_applied: u64 },
}
