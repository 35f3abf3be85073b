/// Integration tests for the replicated self-animation step
/// Steps run on the session clock, identically on every replica, and stop with the entity

use tandem_shared::{
    AttributeMap, EntityId, HostValue, ReplicaConfig, Value, Vec3, PRESENCE, PRESENCE_ANIM,
    ROTATION,
};
use tandem_test::{assert_session_converged, host_attributes, TestSession};

fn animated_attributes() -> Vec<(String, HostValue)> {
    let mut presence = AttributeMap::new();
    presence.insert(PRESENCE_ANIM.to_string(), Value::Bool(true));
    host_attributes(vec![
        (ROTATION, Value::Vec3(Vec3::new(15.0, 0.0, 0.0))),
        (PRESENCE, Value::Map(presence)),
    ])
}

fn expected_rotation(millis: f64) -> Value {
    Value::Vec3(Vec3::new(
        15.0,
        (millis / 1000.0).sin() * 50.0,
        (millis / 2000.0).sin() * 30.0,
    ))
}

#[test]
fn animated_entity_rotates_identically_everywhere() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let spinner = EntityId::new("spinner");
    session
        .client_mut(&alice)
        .host_mut()
        .add_local_node(&spinner, "a-box", animated_attributes());
    session.pump();

    for _ in 0..6 {
        session.tick(50);
    }

    assert_session_converged!(session);
    for participant_id in [&alice, &bob] {
        let client = session.client(participant_id);
        assert_eq!(
            client.replica().entity(&spinner).unwrap().attribute(ROTATION),
            Some(&expected_rotation(300.0))
        );
        assert_eq!(
            client.host().attribute_value(&spinner, ROTATION),
            Some(expected_rotation(300.0))
        );
    }
}

#[test]
fn animation_can_be_switched_off_by_a_participant() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let spinner = EntityId::new("spinner");
    session
        .client_mut(&alice)
        .host_mut()
        .add_local_node(&spinner, "a-box", animated_attributes());
    session.pump();
    session.tick(100);

    let mut presence = AttributeMap::new();
    presence.insert(PRESENCE_ANIM.to_string(), Value::Bool(false));
    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&spinner, PRESENCE, Value::Map(presence).into());
    session.pump();
    session.tick(200);

    assert_session_converged!(session);
    assert_eq!(
        session.client(&alice).replica().entity(&spinner).unwrap().attribute(ROTATION),
        Some(&expected_rotation(100.0))
    );
}

#[test]
fn removed_entity_is_no_longer_stepped() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let spinner = EntityId::new("spinner");
    session
        .client_mut(&alice)
        .host_mut()
        .add_local_node(&spinner, "a-box", animated_attributes());
    session.pump();
    session.tick(50);

    session.client_mut(&alice).request_removal(&spinner);
    session.pump();
    session.tick(200);

    assert_session_converged!(session);
    assert!(!session.client(&alice).replica().has_entity(&spinner));
    assert!(session.client(&alice).host().node(&spinner).is_none());

    let mut replica = session.reflector().reference_replica();
    replica.take_events();
    replica.advance_to(replica.now() + 500);
    assert!(replica.take_events().is_empty());
}
