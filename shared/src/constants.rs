/// Interval of the replicated step loop, and of the outgoing throttle window (20 Hz)
pub const STEP_MS: u64 = 1000 / 20;

/// Entity ids of avatars are this prefix followed by the participant id
pub const AVATAR_PREFIX: &str = "avatar-";
pub const AVATAR_KIND: &str = "avatar";

pub const POSITION: &str = "position";
pub const ROTATION: &str = "rotation";
pub const ROTATION_QUATERNION: &str = "rotationquaternion";
pub const SCALE: &str = "scale";
/// Reserved attribute holding per-entity replication flags (e.g. `anim`)
pub const PRESENCE: &str = "presence";
pub const PRESENCE_ANIM: &str = "anim";

/// High-frequency attributes, rate-limited on the local -> model path
pub const THROTTLED_ATTRIBUTES: [&str; 4] = [POSITION, ROTATION, ROTATION_QUATERNION, SCALE];
/// The only attributes an avatar entity is allowed to replicate
pub const SYNCABLE_ATTRIBUTES: [&str; 5] = [POSITION, ROTATION, ROTATION_QUATERNION, SCALE, PRESENCE];

pub const CAMERA_HEIGHT: f64 = 1.6;
pub const INITIAL_PLACEMENT_RADIUS: f64 = 2.0;

/// Number of session seeds drawn from the shared random source at replica creation
pub const SEED_COUNT: usize = 25;

/// Marker prefixed to the id of a render node when a reference to it is replicated
pub const ASSET_REF_MARKER: char = '#';

/// Maximum nesting accepted by normalization
pub const MAX_NORMALIZE_DEPTH: usize = 64;
