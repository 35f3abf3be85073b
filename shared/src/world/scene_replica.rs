use std::{f64::consts::TAU, mem};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    attribute::value::{AttributeMap, Value, Vec3},
    config::{LeavePolicy, ReplicaConfig, ReplicaOptions},
    constants::{AVATAR_KIND, POSITION, PRESENCE, ROTATION},
    error::ReplicaError,
    types::{EntityId, Origin, ParticipantId, SessionInstant},
    world::{
        entity::{Entity, EntityInit},
        presence::{PaletteColor, PresenceRecord},
        replica_clock::ReplicaClock,
        replica_command::{ReplicaCommand, SequencedCommand},
        replica_event::ReplicaEvent,
        session_random::SessionRandom,
    },
};

/// The authoritative, replicated scene state of a session.
///
/// Every participant holds one, and every one of them receives the same
/// [`SequencedCommand`]s in the same order; since each command is applied
/// by a pure function of (state, command), all replicas converge without
/// any conflict resolution of their own. Last applied delta wins per
/// attribute path.
///
/// Local code reads a replica freely but mutates it only through
/// [`receive`](Self::receive) and [`advance_to`](Self::advance_to).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneReplica {
    config: ReplicaConfig,
    // Scene
    entities: IndexMap<EntityId, Entity>,
    // Participants
    presence: IndexMap<ParticipantId, PresenceRecord>,
    // Determinism
    random: SessionRandom,
    seeds: Vec<f64>,
    clock: ReplicaClock,
    last_applied: Option<u64>,
    // Local to this replica, drained by its mirror
    #[serde(skip)]
    outgoing_events: Vec<ReplicaEvent>,
}

impl SceneReplica {
    /// Create the replica of a new session. `session_seed` comes from the
    /// transport and is identical for every participant.
    pub fn new(config: ReplicaConfig, session_seed: u64) -> Self {
        let mut random = SessionRandom::new(session_seed);
        let seeds = (0..config.seed_count).map(|_| random.next_f64()).collect();
        let clock = ReplicaClock::new(config.step_interval_ms);

        Self {
            config,
            entities: IndexMap::new(),
            presence: IndexMap::new(),
            random,
            seeds,
            clock,
            last_applied: None,
            outgoing_events: Vec::new(),
        }
    }

    /// Copy of the current state for a participant joining late
    pub fn snapshot(&self) -> Self {
        let mut snapshot = self.clone();
        snapshot.outgoing_events.clear();
        snapshot
    }

    // Read access

    pub fn config(&self) -> &ReplicaConfig {
        &self.config
    }

    pub fn now(&self) -> SessionInstant {
        self.clock.now()
    }

    pub fn seeds(&self) -> &[f64] {
        &self.seeds
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.config.spawn_point
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    pub fn entity(&self, entity_id: &EntityId) -> Option<&Entity> {
        self.entities.get(entity_id)
    }

    pub fn has_entity(&self, entity_id: &EntityId) -> bool {
        self.entities.contains_key(entity_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn presence(&self, participant_id: &ParticipantId) -> Option<&PresenceRecord> {
        self.presence.get(participant_id)
    }

    pub fn presence_records(&self) -> impl Iterator<Item = &PresenceRecord> {
        self.presence.values()
    }

    pub fn online_count(&self) -> usize {
        self.presence.values().filter(|record| record.online).count()
    }

    /// Whether local mirrors should render this entity. Avatars of offline
    /// participants (kept under [`LeavePolicy::SoftOffline`]) are hidden.
    pub fn is_entity_visible(&self, entity_id: &EntityId) -> bool {
        if !self.entities.contains_key(entity_id) {
            return false;
        }
        match entity_id.avatar_participant() {
            Some(participant_id) => self
                .presence
                .get(&participant_id)
                .map_or(true, |record| record.online),
            None => true,
        }
    }

    /// Events produced since the last call, in production order
    pub fn take_events(&mut self) -> Vec<ReplicaEvent> {
        mem::take(&mut self.outgoing_events)
    }

    // Ordered input

    /// Apply the next delivered command. Failures are logged and skipped;
    /// a single bad command never takes the session down.
    pub fn receive(&mut self, message: SequencedCommand) {
        let name = message.command.name();
        match self.try_receive(message) {
            Ok(()) => {}
            Err(
                err @ (ReplicaError::EntityNotFound { .. }
                | ReplicaError::EntityAlreadyExists { .. }
                | ReplicaError::DuplicateCommand { .. }),
            ) => {
                debug!("SceneReplica: skipping {}: {}", name, err);
            }
            Err(err) => {
                warn!("SceneReplica: rejected {}: {}", name, err);
            }
        }
    }

    pub fn try_receive(&mut self, message: SequencedCommand) -> Result<(), ReplicaError> {
        if let Some(last_applied) = self.last_applied {
            if message.index <= last_applied {
                return Err(ReplicaError::DuplicateCommand {
                    index: message.index,
                    last_applied,
                });
            }
        }
        self.advance_to(message.time);
        self.last_applied = Some(message.index);

        match message.command {
            ReplicaCommand::AddEntity(init) => self.add_entity(init),
            ReplicaCommand::RemoveEntity(entity_id) => self.remove_entity(&entity_id),
            ReplicaCommand::ChangeComponent {
                entity_id,
                delta,
                origin,
            } => self.change_component(&entity_id, delta, origin),
            ReplicaCommand::ParticipantJoined(participant_id) => {
                self.add_participant(&participant_id);
                Ok(())
            }
            ReplicaCommand::ParticipantExited(participant_id) => {
                self.remove_participant(&participant_id)
            }
            ReplicaCommand::UpdateOptions(options) => self.update_options(options),
        }
    }

    /// Run every step due up to `time`, then move the clock there
    pub fn advance_to(&mut self, time: SessionInstant) {
        while let Some(due) = self.clock.pop_due_step(time) {
            self.step(due);
        }
        self.clock.settle(time);
    }

    // Entities

    fn add_entity(&mut self, init: EntityInit) -> Result<(), ReplicaError> {
        if self.entities.contains_key(&init.id) {
            return Err(ReplicaError::EntityAlreadyExists {
                entity_id: init.id.to_string(),
            });
        }
        if !init.attributes.values().all(Value::is_finite) {
            return Err(ReplicaError::NonFiniteDelta {
                entity_id: init.id.to_string(),
            });
        }

        let entity = Entity::new(init);
        let entity_id = entity.id().clone();
        info!("SceneReplica: entity added: {} ({})", entity_id, entity.kind());
        self.entities.insert(entity_id.clone(), entity);
        self.outgoing_events.push(ReplicaEvent::EntityAdded(entity_id));
        Ok(())
    }

    fn remove_entity(&mut self, entity_id: &EntityId) -> Result<(), ReplicaError> {
        if self.entities.shift_remove(entity_id).is_none() {
            return Err(ReplicaError::EntityNotFound {
                entity_id: entity_id.to_string(),
            });
        }
        info!("SceneReplica: entity removed: {}", entity_id);
        self.outgoing_events
            .push(ReplicaEvent::EntityRemoved(entity_id.clone()));
        Ok(())
    }

    fn change_component(
        &mut self,
        entity_id: &EntityId,
        delta: AttributeMap,
        origin: Origin,
    ) -> Result<(), ReplicaError> {
        let Some(entity) = self.entities.get_mut(entity_id) else {
            return Err(ReplicaError::EntityNotFound {
                entity_id: entity_id.to_string(),
            });
        };
        if !delta.values().all(Value::is_finite) {
            return Err(ReplicaError::NonFiniteDelta {
                entity_id: entity_id.to_string(),
            });
        }

        entity.apply_delta(&delta);
        self.outgoing_events.push(ReplicaEvent::ModelChanged {
            entity_id: entity_id.clone(),
            delta,
            origin,
        });
        Ok(())
    }

    // Participants

    fn add_participant(&mut self, participant_id: &ParticipantId) {
        let now = self.clock.now();
        let known_count = self.presence.len();

        match self.presence.get_mut(participant_id) {
            Some(record) => {
                record.online = true;
                info!(
                    "SceneReplica: participant {} {} rejoining, first joined {}s ago",
                    record.color,
                    participant_id,
                    (now - record.joined_at) as f64 / 1000.0
                );
            }
            None => {
                let (position, rotation) = self.initial_placement();
                let color = self.palette_color(known_count);
                info!(
                    "SceneReplica: participant {} {} joining at ({}, {}, {})",
                    color, participant_id, position.x, position.y, position.z
                );
                self.presence.insert(
                    participant_id.clone(),
                    PresenceRecord {
                        participant_id: participant_id.clone(),
                        online: true,
                        joined_at: now,
                        color,
                        last_position: position,
                        last_rotation: rotation,
                    },
                );
            }
        }

        let avatar_id = EntityId::avatar_of(participant_id);
        if self.entities.contains_key(&avatar_id) {
            debug!("SceneReplica: avatar {} already exists", avatar_id);
        } else if let Some(init) = self.avatar_init(participant_id) {
            // id is free, checked above
            let _ = self.add_entity(init);
        }

        self.outgoing_events
            .push(ReplicaEvent::ParticipantJoined(participant_id.clone()));
    }

    fn remove_participant(&mut self, participant_id: &ParticipantId) -> Result<(), ReplicaError> {
        let avatar_id = EntityId::avatar_of(participant_id);
        let Some(record) = self.presence.get_mut(participant_id) else {
            return Err(ReplicaError::ParticipantNotFound {
                participant_id: participant_id.to_string(),
            });
        };

        record.online = false;
        if let Some(avatar) = self.entities.get(&avatar_id) {
            if let Some(position) = avatar.attribute(POSITION).and_then(Value::as_vec3) {
                record.last_position = position;
            }
            if let Some(rotation) = avatar.attribute(ROTATION).and_then(Value::as_vec3) {
                record.last_rotation = rotation;
            }
        }
        let now = self.clock.now();
        info!(
            "SceneReplica: participant {} {} left after {}s",
            record.color,
            participant_id,
            (now - record.joined_at) as f64 / 1000.0
        );

        match self.config.leave_policy {
            LeavePolicy::DeleteAndRecreate => {
                if let Err(err) = self.remove_entity(&avatar_id) {
                    debug!("SceneReplica: no avatar to delete: {}", err);
                }
            }
            LeavePolicy::SoftOffline => {}
        }

        self.outgoing_events
            .push(ReplicaEvent::ParticipantExited(participant_id.clone()));
        Ok(())
    }

    // Point on a circle around the spawn point, facing its center
    fn initial_placement(&mut self) -> (Vec3, Vec3) {
        let theta = self.random.next_f64() * TAU;
        let spawn = self.config.spawn_point;
        let radius = self.config.placement_radius;
        let position = Vec3::new(
            spawn.x + radius * theta.sin(),
            spawn.y + self.config.camera_height,
            spawn.z + radius * theta.cos(),
        );
        let rotation = Vec3::new(0.0, theta.to_degrees() + 180.0, 0.0);
        (position, rotation)
    }

    fn palette_color(&self, index: usize) -> PaletteColor {
        if self.config.palette.is_empty() {
            return PaletteColor::ALL[index % PaletteColor::ALL.len()];
        }
        self.config.palette[index % self.config.palette.len()]
    }

    fn avatar_init(&self, participant_id: &ParticipantId) -> Option<EntityInit> {
        let record = self.presence.get(participant_id)?;

        let position = if record.last_position.is_finite() {
            record.last_position
        } else {
            warn!("SceneReplica: stored position of {} is not finite, using default", participant_id);
            Vec3::new(0.0, self.config.camera_height, -self.config.placement_radius)
        };
        let rotation = if record.last_rotation.is_finite() {
            record.last_rotation
        } else {
            warn!("SceneReplica: stored rotation of {} is not finite, using default", participant_id);
            Vec3::ZERO
        };

        let mut attributes = AttributeMap::new();
        attributes.insert(POSITION.to_string(), Value::Vec3(position));
        attributes.insert(ROTATION.to_string(), Value::Vec3(rotation));
        attributes.insert(PRESENCE.to_string(), Value::empty_map());

        Some(EntityInit {
            id: EntityId::avatar_of(participant_id),
            parent_id: None,
            kind: AVATAR_KIND.to_string(),
            attributes,
            color: Some(record.color),
        })
    }

    // Options

    fn update_options(&mut self, options: ReplicaOptions) -> Result<(), ReplicaError> {
        if let Some(spawn_point) = options.spawn_point {
            if !spawn_point.is_finite() {
                return Err(ReplicaError::InvalidSpawnPoint {
                    x: spawn_point.x,
                    y: spawn_point.y,
                    z: spawn_point.z,
                });
            }
            debug!("SceneReplica: setting spawn point to {:?}", spawn_point);
            self.config.spawn_point = spawn_point;
        }
        Ok(())
    }

    // Step loop

    // One global tick over live entities; a removed entity is simply not
    // visited again, so there is nothing to cancel.
    fn step(&mut self, due: SessionInstant) {
        let t = due.as_millis() as f64;
        let animated: Vec<(EntityId, Vec3)> = self
            .entities
            .values()
            .filter(|entity| entity.is_animated())
            .filter_map(|entity| entity.rotation().map(|rotation| (entity.id().clone(), rotation)))
            .collect();

        for (entity_id, rotation) in animated {
            let mut delta = AttributeMap::new();
            delta.insert(
                ROTATION.to_string(),
                Value::Vec3(Vec3::new(
                    rotation.x,
                    (t / 1000.0).sin() * 50.0,
                    (t / 2000.0).sin() * 30.0,
                )),
            );
            if let Err(err) = self.change_component(&entity_id, delta, Origin::Model) {
                debug!("SceneReplica: step skipped {}: {}", entity_id, err);
            }
        }
    }
}
