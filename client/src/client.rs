use std::time::Duration;

use log::{info, warn};

use tandem_shared::{
    EntityId, HostNode, HostValue, ParticipantId, Quaternion, ReplicaCommand, ReplicaOptions,
    SceneReplica, SessionTransport, TransportEvent, Value, Vec3, POSITION, ROTATION_QUATERNION,
};

use crate::{
    avatar::{is_finite_pose, rig_position_from_avatar},
    client_config::ClientConfig,
    error::ClientError,
    local_mirror::{LocalMirror, MirrorContext},
    render_host::RenderHost,
    session_config::SessionConfig,
};

/// One participant of a session: its replica, its local view of that
/// replica, the render host the view draws into, and the transport the
/// participant publishes through.
pub struct Client<H: RenderHost, T: SessionTransport> {
    participant_id: ParticipantId,
    replica: SceneReplica,
    mirror: LocalMirror,
    host: H,
    transport: T,
}

impl<H: RenderHost, T: SessionTransport> Client<H, T> {
    /// Create a new Client from the replica snapshot handed out by the
    /// transport at join time
    pub fn new(
        participant_id: ParticipantId,
        replica: SceneReplica,
        config: ClientConfig,
        host: H,
        transport: T,
    ) -> Self {
        let mirror = LocalMirror::new(participant_id.clone(), config);
        Self {
            participant_id,
            replica,
            mirror,
            host,
            transport,
        }
    }

    /// Build the initial view and apply the session's bootstrap options
    pub fn start(&mut self, session: &SessionConfig, now: Duration) -> Result<(), ClientError> {
        info!(
            "Client: {} starting in session {}",
            self.participant_id, session.session_name
        );
        let mut ctx = MirrorContext {
            replica: &self.replica,
            host: &mut self.host,
            transport: &mut self.transport,
            now,
        };
        self.mirror.attach(&mut ctx);

        if let Some(spawn_point) = session.spawn_point {
            self.request_spawn_point(spawn_point)?;
        }
        Ok(())
    }

    /// Must be called with every transport event, in delivery order
    pub fn receive(&mut self, event: TransportEvent, now: Duration) {
        let synced = event == TransportEvent::Synced;
        match event {
            TransportEvent::Deliver(message) => self.replica.receive(message),
            TransportEvent::Advance(time) => self.replica.advance_to(time),
            TransportEvent::Synced => {}
        }

        let events = self.replica.take_events();
        let mut ctx = MirrorContext {
            replica: &self.replica,
            host: &mut self.host,
            transport: &mut self.transport,
            now,
        };
        for replica_event in &events {
            self.mirror.handle_replica_event(replica_event, &mut ctx);
        }
        if synced {
            self.mirror.handle_synced(&mut ctx);
        }
    }

    /// Must be called once per render frame
    pub fn frame(&mut self, now: Duration) {
        let local_events = self.host.poll_local_events();
        let mut ctx = MirrorContext {
            replica: &self.replica,
            host: &mut self.host,
            transport: &mut self.transport,
            now,
        };
        for local_event in local_events {
            self.mirror.handle_local_event(local_event, &mut ctx);
        }
        self.mirror.frame(&mut ctx);
    }

    // Requests

    /// Feeds the camera pose into the local avatar as local writes
    pub fn set_local_avatar_pose(
        &mut self,
        position: Vec3,
        rotation: Quaternion,
        now: Duration,
    ) -> Result<(), ClientError> {
        if !is_finite_pose(&position, &rotation) {
            warn!("Client: rejecting non-finite avatar pose");
            return Err(ClientError::NonFinitePose);
        }

        let avatar_id = self.local_avatar_id();
        let mut ctx = MirrorContext {
            replica: &self.replica,
            host: &mut self.host,
            transport: &mut self.transport,
            now,
        };
        self.mirror.try_local_write(
            &avatar_id,
            POSITION,
            &HostValue::leaf(HostNode::Vec3(position)),
            &mut ctx,
        )?;
        self.mirror.try_local_write(
            &avatar_id,
            ROTATION_QUATERNION,
            &HostValue::leaf(HostNode::Quaternion(rotation)),
            &mut ctx,
        )?;
        Ok(())
    }

    pub fn request_spawn_point(&mut self, spawn_point: Vec3) -> Result<(), ClientError> {
        if !spawn_point.is_finite() {
            warn!("Client: ignoring non-finite spawn point");
            return Err(ClientError::InvalidSpawnPoint {
                x: spawn_point.x,
                y: spawn_point.y,
                z: spawn_point.z,
            });
        }
        self.transport
            .publish(ReplicaCommand::UpdateOptions(ReplicaOptions {
                spawn_point: Some(spawn_point),
            }));
        Ok(())
    }

    /// Asks every replica to drop an entity
    pub fn request_removal(&mut self, entity_id: &EntityId) {
        self.transport
            .publish(ReplicaCommand::RemoveEntity(entity_id.clone()));
    }

    /// Tears down the local view. The replica is untouched.
    pub fn disconnect(&mut self, now: Duration) {
        let mut ctx = MirrorContext {
            replica: &self.replica,
            host: &mut self.host,
            transport: &mut self.transport,
            now,
        };
        self.mirror.detach_all(&mut ctx);
        info!("Client: {} disconnected", self.participant_id);
    }

    // Access

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub fn local_avatar_id(&self) -> EntityId {
        EntityId::avatar_of(&self.participant_id)
    }

    /// Camera rig position that puts the camera on the local avatar
    pub fn rig_position(&self) -> Option<Vec3> {
        let position = self
            .replica
            .entity(&self.local_avatar_id())?
            .attribute(POSITION)
            .and_then(Value::as_vec3)?;
        Some(rig_position_from_avatar(
            position,
            self.replica.config().camera_height,
        ))
    }

    pub fn seeds(&self) -> &[f64] {
        self.replica.seeds()
    }

    pub fn replica(&self) -> &SceneReplica {
        &self.replica
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
