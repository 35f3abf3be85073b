use std::{collections::HashMap, time::Duration};

use log::{debug, info, warn};

use tandem_shared::{
    AttributeFilter, EntityId, EntityInit, HostValue, ParticipantId, ReplicaCommand,
    ReplicaEvent, SceneReplica, SessionTransport, AVATAR_KIND,
};

use crate::{
    bridge::render_bridge::RenderBridge,
    client_config::ClientConfig,
    error::BridgeError,
    render_host::{LocalNodeEvent, RenderHost},
};

/// The collaborators a mirror works against for one call
pub struct MirrorContext<'a> {
    pub replica: &'a SceneReplica,
    pub host: &'a mut dyn RenderHost,
    pub transport: &'a mut dyn SessionTransport,
    /// Local clock, used for throttling and initialization fallback
    pub now: Duration,
}

pub(crate) struct MirrorSettings {
    pub participant_id: ParticipantId,
    pub config: ClientConfig,
    pub filter: AttributeFilter,
    pub synced: bool,
}

/// One participant's local view of the replica: a [`RenderBridge`] per
/// visible entity. Everything here is derived and can be rebuilt from the
/// replica at any time.
pub struct LocalMirror {
    settings: MirrorSettings,
    bridges: HashMap<EntityId, RenderBridge>,
}

impl LocalMirror {
    pub fn new(participant_id: ParticipantId, config: ClientConfig) -> Self {
        let filter = AttributeFilter::new(config.avatar_allow_list.clone());
        Self {
            settings: MirrorSettings {
                participant_id,
                config,
                filter,
                synced: false,
            },
            bridges: HashMap::new(),
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.settings.participant_id
    }

    pub fn is_synced(&self) -> bool {
        self.settings.synced
    }

    pub fn bridge(&self, entity_id: &EntityId) -> Option<&RenderBridge> {
        self.bridges.get(entity_id)
    }

    pub fn has_bridge(&self, entity_id: &EntityId) -> bool {
        self.bridges.contains_key(entity_id)
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    /// Builds the initial view: the avatars of participants currently online
    pub fn attach(&mut self, ctx: &mut MirrorContext<'_>) {
        let avatars: Vec<EntityId> = ctx
            .replica
            .entities()
            .filter(|entity| entity.is_avatar())
            .map(|entity| entity.id().clone())
            .filter(|entity_id| ctx.replica.is_entity_visible(entity_id))
            .collect();
        for entity_id in avatars {
            self.add_bridge(&entity_id, ctx);
        }
    }

    // Replica -> mirror

    pub fn handle_replica_event(&mut self, event: &ReplicaEvent, ctx: &mut MirrorContext<'_>) {
        match event {
            ReplicaEvent::EntityAdded(entity_id) => {
                if ctx.replica.is_entity_visible(entity_id) {
                    self.add_bridge(entity_id, ctx);
                }
            }
            ReplicaEvent::EntityRemoved(entity_id) => {
                self.remove_bridge(entity_id, ctx);
            }
            ReplicaEvent::ModelChanged {
                entity_id,
                delta,
                origin,
            } => {
                if let Some(bridge) = self.bridges.get_mut(entity_id) {
                    bridge.on_model_changed(delta, origin, &self.settings);
                }
            }
            ReplicaEvent::ParticipantJoined(participant_id) => {
                // An avatar kept while offline becomes visible again
                let avatar_id = EntityId::avatar_of(participant_id);
                if ctx.replica.is_entity_visible(&avatar_id) {
                    self.add_bridge(&avatar_id, ctx);
                }
            }
            ReplicaEvent::ParticipantExited(participant_id) => {
                let avatar_id = EntityId::avatar_of(participant_id);
                if !ctx.replica.is_entity_visible(&avatar_id) {
                    self.remove_bridge(&avatar_id, ctx);
                }
            }
        }
    }

    /// Full sync: mirror every visible entity and release bridges waiting
    /// on the signal
    pub fn handle_synced(&mut self, ctx: &mut MirrorContext<'_>) {
        if self.settings.synced {
            debug!("LocalMirror: duplicate full-sync signal");
        }
        self.settings.synced = true;

        let entity_ids: Vec<EntityId> = ctx
            .replica
            .entities()
            .map(|entity| entity.id().clone())
            .filter(|entity_id| ctx.replica.is_entity_visible(entity_id))
            .collect();
        info!(
            "LocalMirror: {} synced with {} entities",
            self.settings.participant_id,
            entity_ids.len()
        );
        for entity_id in entity_ids {
            self.add_bridge(&entity_id, ctx);
        }
        for bridge in self.bridges.values_mut() {
            bridge.on_synced(ctx, &self.settings);
        }
    }

    // Render host -> mirror

    pub fn handle_local_event(&mut self, event: LocalNodeEvent, ctx: &mut MirrorContext<'_>) {
        match event {
            LocalNodeEvent::AttributeSet {
                node_id,
                name,
                value,
            } => self.local_write(&node_id, &name, &value, ctx),
            LocalNodeEvent::NodeReady { node_id } => self.admit_local_node(&node_id, ctx),
            LocalNodeEvent::NodeRemoved { node_id } => self.remove_local_node(&node_id, ctx),
        }
    }

    pub fn try_local_write(
        &mut self,
        entity_id: &EntityId,
        attribute: &str,
        value: &HostValue,
        ctx: &mut MirrorContext<'_>,
    ) -> Result<bool, BridgeError> {
        let Some(bridge) = self.bridges.get_mut(entity_id) else {
            return Err(BridgeError::NoBridge {
                entity_id: entity_id.to_string(),
            });
        };
        bridge.try_local_write(attribute, value, ctx, &self.settings)
    }

    pub fn local_write(
        &mut self,
        entity_id: &EntityId,
        attribute: &str,
        value: &HostValue,
        ctx: &mut MirrorContext<'_>,
    ) {
        match self.bridges.get_mut(entity_id) {
            Some(bridge) => bridge.local_write(attribute, value, ctx, &self.settings),
            None => debug!("LocalMirror: no bridge for {}, ignoring write of {}", entity_id, attribute),
        }
    }

    // A node that exists locally becomes the initial state of a new entity
    fn admit_local_node(&mut self, node_id: &EntityId, ctx: &mut MirrorContext<'_>) {
        if self.bridges.contains_key(node_id) {
            debug!("LocalMirror: node {} is already mirrored", node_id);
            return;
        }
        let Some(info) = ctx.host.node_info(node_id) else {
            warn!("LocalMirror: node {} vanished before admission", node_id);
            return;
        };

        let is_avatar = info.kind == AVATAR_KIND || node_id.is_avatar();
        let attributes: Vec<(String, HostValue)> = ctx
            .host
            .attribute_names(node_id)
            .into_iter()
            .filter_map(|name| {
                let value = ctx.host.get_attribute(node_id, &name)?;
                Some((name, value))
            })
            .collect();
        let attributes = self.settings.filter.filter_all(is_avatar, attributes);

        let mut init = EntityInit::new(node_id.clone(), info.kind).with_attributes(attributes);
        if let Some(parent) = info.parent {
            init = init.with_parent(parent);
        }
        info!("LocalMirror: requesting admission of {}", node_id);
        ctx.transport.publish(ReplicaCommand::AddEntity(init));
    }

    fn remove_local_node(&mut self, node_id: &EntityId, ctx: &mut MirrorContext<'_>) {
        let mirrored = self.remove_bridge(node_id, ctx);
        if mirrored || ctx.replica.has_entity(node_id) {
            ctx.transport
                .publish(ReplicaCommand::RemoveEntity(node_id.clone()));
        } else {
            debug!("LocalMirror: removed node {} was never shared", node_id);
        }
    }

    // Per frame

    pub fn frame(&mut self, ctx: &mut MirrorContext<'_>) {
        for bridge in self.bridges.values_mut() {
            bridge.poll_fallback(ctx, &self.settings);
            bridge.flush_frame(ctx, &self.settings);
        }
    }

    /// Tears down the whole view, releasing every render node
    pub fn detach_all(&mut self, ctx: &mut MirrorContext<'_>) {
        for (_, mut bridge) in self.bridges.drain() {
            bridge.detach(ctx);
        }
    }

    fn add_bridge(&mut self, entity_id: &EntityId, ctx: &mut MirrorContext<'_>) {
        if self.bridges.contains_key(entity_id) {
            return;
        }
        let Some(entity) = ctx.replica.entity(entity_id) else {
            debug!("LocalMirror: entity {} is gone, no bridge", entity_id);
            return;
        };

        let mut bridge = RenderBridge::new(entity_id.clone(), entity.is_avatar(), &self.settings);
        bridge.initialize(ctx, &self.settings);
        self.bridges.insert(entity_id.clone(), bridge);
    }

    // Returns whether a bridge existed
    fn remove_bridge(&mut self, entity_id: &EntityId, ctx: &mut MirrorContext<'_>) -> bool {
        match self.bridges.remove(entity_id) {
            Some(mut bridge) => {
                bridge.detach(ctx);
                true
            }
            None => false,
        }
    }
}
