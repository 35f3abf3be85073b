use serde::{Deserialize, Serialize};

use crate::{
    attribute::value::AttributeMap,
    types::{EntityId, Origin, ParticipantId},
};

/// Published by a replica to its own participant's local mirror
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReplicaEvent {
    EntityAdded(EntityId),
    EntityRemoved(EntityId),
    ModelChanged {
        entity_id: EntityId,
        delta: AttributeMap,
        origin: Origin,
    },
    ParticipantJoined(ParticipantId),
    ParticipantExited(ParticipantId),
}
