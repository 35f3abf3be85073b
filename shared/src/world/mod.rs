pub mod entity;
pub mod presence;
pub mod replica_clock;
pub mod replica_command;
pub mod replica_event;
pub mod scene_replica;
pub mod session_random;
