use std::{default::Default, time::Duration};

use tandem_shared::{STEP_MS, SYNCABLE_ATTRIBUTES, THROTTLED_ATTRIBUTES};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Minimum interval between two publishes of the same throttled attribute
    pub throttle_interval: Duration,
    /// High-frequency attributes that go through the throttle; every other
    /// attribute publishes on each change
    pub throttled_attributes: Vec<String>,
    /// The only attributes an avatar entity may replicate
    pub avatar_allow_list: Vec<String>,
    /// How long a bridge waits for the full-sync signal before initializing
    /// from the model anyway
    pub init_fallback_delay: Duration,
    /// Skip model changes that this participant originated, since its render
    /// node already shows them
    pub skip_local_echo: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_millis(STEP_MS),
            throttled_attributes: THROTTLED_ATTRIBUTES.iter().map(|name| name.to_string()).collect(),
            avatar_allow_list: SYNCABLE_ATTRIBUTES.iter().map(|name| name.to_string()).collect(),
            init_fallback_delay: Duration::from_secs(1),
            skip_local_echo: false,
        }
    }
}
