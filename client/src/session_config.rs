use tandem_shared::Vec3;

/// What bootstrap hands a participant when it joins a session.
///
/// Only the spawn point is interpreted here; the rest is passed through to
/// whatever establishes the transport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    pub session_name: String,
    pub password: String,
    pub api_key: String,
    /// Published as a replica reconfiguration once joined
    pub spawn_point: Option<Vec3>,
}

impl SessionConfig {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            ..Self::default()
        }
    }

    pub fn with_spawn_point(mut self, spawn_point: Vec3) -> Self {
        self.spawn_point = Some(spawn_point);
        self
    }
}
