use std::{
    fmt,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

use crate::constants::AVATAR_PREFIX;

// EntityId
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the avatar entity belonging to `participant_id`
    pub fn avatar_of(participant_id: &ParticipantId) -> Self {
        Self(format!("{}{}", AVATAR_PREFIX, participant_id.as_str()))
    }

    pub fn is_avatar(&self) -> bool {
        self.0.starts_with(AVATAR_PREFIX)
    }

    /// For avatar ids, the participant the avatar stands for
    pub fn avatar_participant(&self) -> Option<ParticipantId> {
        self.0
            .strip_prefix(AVATAR_PREFIX)
            .map(ParticipantId::new)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ParticipantId
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// SessionInstant
/// A point on the replicated session clock, in milliseconds since session start.
/// Every replica observes the same sequence of instants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionInstant(u64);

impl SessionInstant {
    pub const ZERO: Self = Self(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl Add<u64> for SessionInstant {
    type Output = Self;

    fn add(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl Sub for SessionInstant {
    type Output = u64;

    fn sub(self, other: Self) -> u64 {
        self.0.saturating_sub(other.0)
    }
}

// Origin
/// Who asked for a change. Used for observability and echo suppression,
/// never for conflict resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Participant(ParticipantId),
    /// Changes produced by the replicated step loop itself
    Model,
}

impl Origin {
    pub fn is_participant(&self, participant_id: &ParticipantId) -> bool {
        matches!(self, Origin::Participant(id) if id == participant_id)
    }
}
