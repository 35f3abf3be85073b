use std::time::Duration;

use log::{debug, error, info, warn};

use tandem_shared::{AttributeMap, EntityId, FilterError, HostValue, Origin, ReplicaCommand};

use crate::{
    bridge::frame_batch::FrameBatch,
    error::BridgeError,
    local_mirror::{MirrorContext, MirrorSettings},
    render_host::{AvatarAppearance, NodeSpec},
    throttle::AttributeThrottle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    /// Waiting for full sync, or for `fallback_at` on the local clock
    InitializingFromModel { fallback_at: Duration },
    InitializingFromLocalNode,
    Active,
    Detached,
}

/// Connects one replicated entity to the render node with the same id.
///
/// Model changes flow into the node once per frame; local writes on the
/// node flow out as `ChangeComponent` commands. The bridge never touches
/// the entity itself.
pub struct RenderBridge {
    entity_id: EntityId,
    is_avatar: bool,
    state: BridgeState,
    has_local_node: bool,
    // Incoming
    frame_batch: FrameBatch,
    // Outgoing
    throttle: AttributeThrottle,
}

impl RenderBridge {
    pub(crate) fn new(entity_id: EntityId, is_avatar: bool, settings: &MirrorSettings) -> Self {
        Self {
            entity_id,
            is_avatar,
            state: BridgeState::Uninitialized,
            has_local_node: false,
            frame_batch: FrameBatch::new(),
            throttle: AttributeThrottle::new(
                settings.config.throttle_interval,
                settings.config.throttled_attributes.clone(),
            ),
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BridgeState::Active
    }

    pub fn is_detached(&self) -> bool {
        self.state == BridgeState::Detached
    }

    pub fn has_local_node(&self) -> bool {
        self.has_local_node
    }

    // Initialization

    /// Picks the initialization path from what the entity already holds
    pub(crate) fn initialize(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        if self.state != BridgeState::Uninitialized {
            return;
        }
        let Some(entity) = ctx.replica.entity(&self.entity_id) else {
            debug!("RenderBridge: entity {} vanished before initialization", self.entity_id);
            return;
        };

        self.frame_batch.clear();
        if entity.has_model_data() {
            self.state = BridgeState::InitializingFromModel {
                fallback_at: ctx.now + settings.config.init_fallback_delay,
            };
            if settings.synced {
                self.init_from_model(ctx, settings);
            } else {
                debug!("RenderBridge: {} waiting for full sync", self.entity_id);
            }
        } else {
            self.state = BridgeState::InitializingFromLocalNode;
            self.init_from_local_node(ctx, settings);
        }
    }

    pub(crate) fn on_synced(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        if matches!(self.state, BridgeState::InitializingFromModel { .. }) {
            self.init_from_model(ctx, settings);
        }
    }

    pub(crate) fn poll_fallback(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        if let BridgeState::InitializingFromModel { fallback_at } = self.state {
            if ctx.now >= fallback_at {
                info!("RenderBridge: {} initializing without full sync", self.entity_id);
                self.init_from_model(ctx, settings);
            }
        }
    }

    fn init_from_model(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        let Some(entity) = ctx.replica.entity(&self.entity_id) else {
            debug!("RenderBridge: entity {} vanished before initialization", self.entity_id);
            return;
        };
        self.frame_batch.clear();

        if ctx.host.has_node(&self.entity_id) {
            for (name, value) in entity.attributes() {
                if let Err(err) = ctx.host.set_attribute(&self.entity_id, name, value) {
                    warn!("RenderBridge: {} could not adopt {}: {}", self.entity_id, name, err);
                }
            }
        } else {
            let avatar = match (entity.is_avatar(), entity.color()) {
                (true, Some(color)) => Some(AvatarAppearance {
                    color,
                    is_local: self.entity_id == EntityId::avatar_of(&settings.participant_id),
                }),
                _ => None,
            };
            let spec = NodeSpec {
                id: self.entity_id.clone(),
                kind: entity.kind().to_string(),
                parent: entity.parent_id().cloned(),
                attributes: entity.attributes().clone(),
                avatar,
            };
            if let Err(err) = ctx.host.create_node(spec) {
                error!("RenderBridge: creating node {} failed: {}", self.entity_id, err);
            }
        }

        self.has_local_node = ctx.host.has_node(&self.entity_id);
        self.state = BridgeState::Active;
        info!("RenderBridge: {} initialized from model", self.entity_id);
    }

    fn init_from_local_node(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        if !ctx.host.has_node(&self.entity_id) {
            let Some(entity) = ctx.replica.entity(&self.entity_id) else {
                return;
            };
            let spec = NodeSpec {
                id: self.entity_id.clone(),
                kind: entity.kind().to_string(),
                parent: entity.parent_id().cloned(),
                attributes: entity.attributes().clone(),
                avatar: None,
            };
            if let Err(err) = ctx.host.create_node(spec) {
                error!("RenderBridge: creating node {} failed: {}", self.entity_id, err);
            }
            self.has_local_node = ctx.host.has_node(&self.entity_id);
            self.state = BridgeState::Active;
            return;
        }

        let attributes: Vec<(String, HostValue)> = ctx
            .host
            .attribute_names(&self.entity_id)
            .into_iter()
            .filter_map(|name| {
                let value = ctx.host.get_attribute(&self.entity_id, &name)?;
                Some((name, value))
            })
            .collect();
        let delta = settings.filter.filter_all(self.is_avatar, attributes);
        if !delta.is_empty() {
            self.publish(ctx, settings, delta);
        }

        self.has_local_node = true;
        self.state = BridgeState::Active;
        info!("RenderBridge: {} initialized from local node", self.entity_id);
    }

    // Model -> render node

    pub(crate) fn on_model_changed(
        &mut self,
        delta: &AttributeMap,
        origin: &Origin,
        settings: &MirrorSettings,
    ) {
        // Initialization reads the whole entity, so earlier deltas are covered
        if self.state != BridgeState::Active {
            return;
        }
        if settings.config.skip_local_echo && origin.is_participant(&settings.participant_id) {
            return;
        }
        self.frame_batch.push(delta);
    }

    /// Once per render frame: release throttled writes and apply the
    /// batched model changes to the render node
    pub(crate) fn flush_frame(&mut self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings) {
        if self.state != BridgeState::Active {
            return;
        }

        let due = self.throttle.poll_due(ctx.now);
        if !due.is_empty() {
            self.publish(ctx, settings, due);
        }

        for segment in self.frame_batch.take() {
            if let Err(err) = self.apply_batch(ctx, segment) {
                warn!("RenderBridge: skipping update: {}", err);
                break;
            }
        }
    }

    fn apply_batch(&mut self, ctx: &mut MirrorContext<'_>, batch: AttributeMap) -> Result<(), BridgeError> {
        if !ctx.host.has_node(&self.entity_id) {
            self.has_local_node = false;
            return Err(BridgeError::NoLocalNode {
                entity_id: self.entity_id.to_string(),
            });
        }

        for (name, value) in batch {
            if !value.is_finite() {
                let err = BridgeError::NonFinite {
                    entity_id: self.entity_id.to_string(),
                    attribute: name,
                };
                warn!("RenderBridge: keeping previous value: {}", err);
                continue;
            }
            if let Err(err) = ctx.host.set_attribute(&self.entity_id, &name, &value) {
                warn!("RenderBridge: {} could not set {}: {}", self.entity_id, name, err);
            }
        }
        Ok(())
    }

    // Render node -> model

    /// Filters a local write and publishes it, now or when its throttle
    /// window reopens. Returns whether it was published immediately.
    pub(crate) fn try_local_write(
        &mut self,
        attribute: &str,
        value: &HostValue,
        ctx: &mut MirrorContext<'_>,
        settings: &MirrorSettings,
    ) -> Result<bool, BridgeError> {
        match self.state {
            BridgeState::Active => {}
            BridgeState::Detached => {
                return Err(BridgeError::Detached {
                    entity_id: self.entity_id.to_string(),
                });
            }
            _ => {
                return Err(BridgeError::Initializing {
                    entity_id: self.entity_id.to_string(),
                });
            }
        }

        let value = settings
            .filter
            .try_filter(self.is_avatar, attribute, value)
            .map_err(|source| BridgeError::Filtered {
                entity_id: self.entity_id.to_string(),
                source,
            })?;

        let value = if self.throttle.is_throttled(attribute) {
            match self.throttle.offer(attribute, value, ctx.now) {
                Some(value) => value,
                None => return Ok(false),
            }
        } else {
            value
        };

        let mut delta = AttributeMap::new();
        delta.insert(attribute.to_string(), value);
        self.publish(ctx, settings, delta);
        Ok(true)
    }

    pub(crate) fn local_write(
        &mut self,
        attribute: &str,
        value: &HostValue,
        ctx: &mut MirrorContext<'_>,
        settings: &MirrorSettings,
    ) {
        match self.try_local_write(attribute, value, ctx, settings) {
            Ok(_) => {}
            Err(BridgeError::Filtered {
                source: FilterError::NotSyncable { .. },
                ..
            }) => {
                debug!("RenderBridge: {} not syncing {}", self.entity_id, attribute);
            }
            Err(err @ BridgeError::Initializing { .. }) => {
                debug!("RenderBridge: dropping local write of {}: {}", attribute, err);
            }
            Err(err) => {
                warn!("RenderBridge: dropping local write of {}: {}", attribute, err);
            }
        }
    }

    fn publish(&self, ctx: &mut MirrorContext<'_>, settings: &MirrorSettings, delta: AttributeMap) {
        ctx.transport.publish(ReplicaCommand::ChangeComponent {
            entity_id: self.entity_id.clone(),
            delta,
            origin: Origin::Participant(settings.participant_id.clone()),
        });
    }

    // Teardown

    /// Releases the render node. Calling it again does nothing.
    pub(crate) fn detach(&mut self, ctx: &mut MirrorContext<'_>) {
        if self.state == BridgeState::Detached {
            return;
        }
        self.state = BridgeState::Detached;
        self.frame_batch.clear();
        self.throttle.clear();

        if ctx.host.has_node(&self.entity_id) {
            if let Err(err) = ctx.host.destroy_node(&self.entity_id) {
                error!("RenderBridge: destroying node {} failed: {}", self.entity_id, err);
            }
        }
        self.has_local_node = false;
        info!("RenderBridge: {} detached", self.entity_id);
    }
}
