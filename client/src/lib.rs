//! # Tandem Client
//! The per-participant side of a tandem session. A [`Client`] mirrors the
//! replicated scene into a local [`RenderHost`] and turns local edits into
//! filtered, throttled change requests.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod avatar;
mod bridge;
mod client;
mod client_config;
mod error;
mod local_mirror;
mod render_host;
mod session_config;
mod throttle;

pub use avatar::{is_finite_pose, rig_position_from_avatar};
pub use bridge::{
    frame_batch::FrameBatch,
    render_bridge::{BridgeState, RenderBridge},
};
pub use client::Client;
pub use client_config::ClientConfig;
pub use error::{BridgeError, ClientError, RenderHostError};
pub use local_mirror::{LocalMirror, MirrorContext};
pub use render_host::{AvatarAppearance, LocalNodeEvent, NodeInfo, NodeSpec, RenderHost};
pub use session_config::SessionConfig;
pub use throttle::AttributeThrottle;
