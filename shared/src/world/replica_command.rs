use serde::{Deserialize, Serialize};

use crate::{
    attribute::value::AttributeMap,
    config::ReplicaOptions,
    types::{EntityId, Origin, ParticipantId, SessionInstant},
    world::entity::EntityInit,
};

/// Requests published into the ordered stream. Every replica applies the
/// same commands in the same order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReplicaCommand {
    /// Admit a new entity; ignored if the id is taken
    AddEntity(EntityInit),
    RemoveEntity(EntityId),
    /// Deep-merge `delta` into an entity's attributes
    ChangeComponent {
        entity_id: EntityId,
        delta: AttributeMap,
        origin: Origin,
    },
    /// Published by the transport when a participant's view joins
    ParticipantJoined(ParticipantId),
    /// Published by the transport when a participant's view exits
    ParticipantExited(ParticipantId),
    UpdateOptions(ReplicaOptions),
}

impl ReplicaCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ReplicaCommand::AddEntity(_) => "add-entity",
            ReplicaCommand::RemoveEntity(_) => "remove-entity",
            ReplicaCommand::ChangeComponent { .. } => "change-component",
            ReplicaCommand::ParticipantJoined(_) => "participant-joined",
            ReplicaCommand::ParticipantExited(_) => "participant-exited",
            ReplicaCommand::UpdateOptions(_) => "update-options",
        }
    }
}

/// A command as delivered by the transport: position in the global
/// sequence plus the session time it was sequenced at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequencedCommand {
    pub index: u64,
    pub time: SessionInstant,
    pub command: ReplicaCommand,
}
