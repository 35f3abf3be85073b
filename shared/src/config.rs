use serde::{Deserialize, Serialize};

use crate::{
    attribute::value::Vec3,
    constants::{CAMERA_HEIGHT, INITIAL_PLACEMENT_RADIUS, SEED_COUNT, STEP_MS},
    world::presence::PaletteColor,
};

/// What happens to a participant's avatar entity when they leave
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeavePolicy {
    /// Snapshot the pose into the presence record and delete the avatar
    /// entity; a rejoin creates a fresh entity from the snapshot.
    #[default]
    DeleteAndRecreate,
    /// Snapshot the pose and keep the entity, hidden from local mirrors
    /// until the participant comes back.
    SoftOffline,
}

/// Contains Config properties which will be used by every SceneReplica.
///
/// Part of the replicated snapshot: all replicas of a session must share
/// the same values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplicaConfig {
    /// Center of the circle new avatars are placed on
    pub spawn_point: Vec3,
    /// Radius of the placement circle
    pub placement_radius: f64,
    /// Height of a participant's eyes above the floor
    pub camera_height: f64,
    /// Colors handed out to participants, cyclically, in join order
    pub palette: Vec<PaletteColor>,
    /// Interval of the replicated step loop, in session milliseconds
    pub step_interval_ms: u64,
    /// Number of session seeds drawn at creation
    pub seed_count: usize,
    pub leave_policy: LeavePolicy,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            spawn_point: Vec3::ZERO,
            placement_radius: INITIAL_PLACEMENT_RADIUS,
            camera_height: CAMERA_HEIGHT,
            palette: PaletteColor::ALL.to_vec(),
            step_interval_ms: STEP_MS,
            seed_count: SEED_COUNT,
            leave_policy: LeavePolicy::default(),
        }
    }
}

/// Runtime reconfiguration published through the ordered stream
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicaOptions {
    pub spawn_point: Option<Vec3>,
}
