//! # Tandem Shared
//! The replicated scene model shared by every participant of a tandem
//! session: entities and their attribute bags, presence records, the
//! deterministic merge, and the filter applied to attributes before they
//! are allowed into the replica.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod attribute;
mod config;
mod constants;
mod error;
mod transport;
mod types;
mod world;

pub use attribute::{
    attribute_filter::AttributeFilter,
    host_value::{HostNode, HostRef, HostValue, HostValueBuilder},
    merge::merge_attributes,
    value::{AttributeMap, Quaternion, Value, Vec3},
};
pub use config::{LeavePolicy, ReplicaConfig, ReplicaOptions};
pub use constants::{
    ASSET_REF_MARKER, AVATAR_KIND, AVATAR_PREFIX, CAMERA_HEIGHT, INITIAL_PLACEMENT_RADIUS,
    MAX_NORMALIZE_DEPTH, POSITION, PRESENCE, PRESENCE_ANIM, ROTATION, ROTATION_QUATERNION, SCALE,
    SEED_COUNT, STEP_MS, SYNCABLE_ATTRIBUTES, THROTTLED_ATTRIBUTES,
};
pub use error::{FilterError, ReplicaError};
pub use transport::{SessionTransport, TransportEvent};
pub use types::{EntityId, Origin, ParticipantId, SessionInstant};
pub use world::{
    entity::{Entity, EntityInit},
    presence::{PaletteColor, PresenceRecord},
    replica_clock::ReplicaClock,
    replica_command::{ReplicaCommand, SequencedCommand},
    replica_event::ReplicaEvent,
    scene_replica::SceneReplica,
    session_random::SessionRandom,
};
