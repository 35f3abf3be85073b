/// Integration tests for the bridge between replicated entities and local render nodes
/// Covers admission of local nodes, removal, and updates against missing nodes

use std::time::Duration;

use tandem_client::{BridgeState, Client, ClientConfig, SessionConfig};
use tandem_shared::{EntityId, ParticipantId, ReplicaConfig, Value};
use tandem_test::{
    assert_session_converged, attributes, host_attributes, FakeRenderHost, HostOp, TestSession,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn local_node_becomes_initial_entity_state() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let lamp = EntityId::new("lamp");

    session.client_mut(&alice).host_mut().add_local_node(
        &lamp,
        "a-light",
        host_attributes(vec![("color", "yellow".into()), ("intensity", Value::Scalar(0.8))]),
    );
    session.pump();

    assert_session_converged!(session);
    let entity = session.client(&bob).replica().entity(&lamp).unwrap();
    assert_eq!(entity.kind(), "a-light");
    assert_eq!(entity.attribute("intensity"), Some(&Value::Scalar(0.8)));

    // The author keeps its node, the other participant gets a fresh one
    assert_eq!(session.client(&alice).host().count_ops(&HostOp::Create(lamp.clone())), 0);
    assert_eq!(session.client(&bob).host().count_ops(&HostOp::Create(lamp.clone())), 1);
    assert_eq!(
        session.client(&bob).host().attribute_value(&lamp, "color"),
        Some(Value::Text("yellow".to_string()))
    );
}

#[test]
fn empty_entity_adopts_pre_existing_local_node() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let table = EntityId::new("table");

    // Alice already has content for the id; Bob announces it empty
    session.client_mut(&alice).host_mut().insert_local_node(
        &table,
        "a-box",
        host_attributes(vec![("color", "brown".into())]),
    );
    session
        .client_mut(&bob)
        .host_mut()
        .add_local_node(&table, "a-box", Vec::new());
    session.pump();

    assert_session_converged!(session);
    assert_eq!(
        session.client(&bob).replica().entity(&table).unwrap().attribute("color"),
        Some(&Value::Text("brown".to_string()))
    );
    assert_eq!(
        session.client(&bob).host().attribute_value(&table, "color"),
        Some(Value::Text("brown".to_string()))
    );
    assert!(session.client(&alice).mirror().bridge(&table).unwrap().is_active());
}

#[test]
fn removal_destroys_each_node_once() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let crate_id = EntityId::new("crate");
    session.client_mut(&alice).host_mut().add_local_node(
        &crate_id,
        "a-box",
        host_attributes(vec![("color", "red".into())]),
    );
    session.pump();

    session.client_mut(&alice).request_removal(&crate_id);
    session.client_mut(&alice).request_removal(&crate_id);
    session.pump();

    assert_session_converged!(session);
    assert!(!session.client(&alice).replica().has_entity(&crate_id));
    for participant_id in [&alice, &bob] {
        let client = session.client(participant_id);
        assert!(!client.host().node_ids().contains(&crate_id));
        assert!(!client.mirror().has_bridge(&crate_id));
    }
    assert_eq!(session.client(&bob).host().count_ops(&HostOp::Destroy(crate_id.clone())), 1);
    assert_eq!(session.client(&alice).host().count_ops(&HostOp::Destroy(crate_id)), 1);
}

#[test]
fn removal_after_external_node_loss_is_quiet() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let vase = EntityId::new("vase");
    session.client_mut(&alice).host_mut().add_local_node(
        &vase,
        "a-cylinder",
        host_attributes(vec![("color", "white".into())]),
    );
    session.pump();

    session.client_mut(&bob).host_mut().remove_externally(&vase);
    session.client_mut(&alice).request_removal(&vase);
    session.pump();

    assert!(!session.client(&bob).mirror().has_bridge(&vase));
    assert_eq!(session.client(&bob).host().count_ops(&HostOp::Destroy(vase)), 0);
}

#[test]
fn local_removal_request_leaves_shared_scene() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let chair = EntityId::new("chair");
    session.client_mut(&alice).host_mut().add_local_node(
        &chair,
        "a-box",
        host_attributes(vec![("color", "blue".into())]),
    );
    session.pump();

    session.client_mut(&alice).host_mut().request_removal(&chair);
    session.pump();

    assert_session_converged!(session);
    assert!(!session.client(&bob).replica().has_entity(&chair));
    assert!(session.client(&bob).host().node(&chair).is_none());
    assert_eq!(session.client(&alice).host().count_ops(&HostOp::Destroy(chair)), 1);
}

#[test]
fn update_for_missing_node_is_skipped_not_recreated() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let sign = EntityId::new("sign");
    session.client_mut(&alice).host_mut().add_local_node(
        &sign,
        "a-text",
        host_attributes(vec![("value", "hello".into())]),
    );
    session.pump();

    session.client_mut(&bob).host_mut().remove_externally(&sign);
    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&sign, "value", Value::from("goodbye").into());
    session.pump();

    assert_session_converged!(session);
    let bridge = session.client(&bob).mirror().bridge(&sign).unwrap();
    assert!(bridge.is_active());
    assert!(!bridge.has_local_node());
    assert!(session.client(&bob).host().node(&sign).is_none());
    assert_eq!(session.client(&bob).host().count_ops(&HostOp::Create(sign)), 1);
}

#[test]
fn model_changes_are_applied_once_per_frame() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let ball = EntityId::new("ball");
    session.client_mut(&alice).host_mut().add_local_node(
        &ball,
        "a-sphere",
        host_attributes(vec![("color", "red".into())]),
    );
    session.pump();

    for color in ["orange", "yellow", "green"] {
        session
            .client_mut(&alice)
            .host_mut()
            .local_write(&ball, "color", Value::from(color).into());
    }
    session.pump();

    let bob_host = session.client(&bob).host();
    assert_eq!(bob_host.count_ops(&HostOp::Set(ball.clone(), "color".to_string())), 1);
    assert_eq!(
        bob_host.attribute_value(&ball, "color"),
        Some(Value::Text("green".to_string()))
    );
}

#[test]
fn replaced_map_leaves_no_stale_keys_on_node() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let ball = EntityId::new("ball");
    session.client_mut(&alice).host_mut().add_local_node(
        &ball,
        "a-sphere",
        host_attributes(vec![(
            "material",
            Value::Map(attributes(vec![("color", "blue".into())])),
        )]),
    );
    session.pump();

    let opaque = Value::Map(attributes(vec![("opacity", Value::Scalar(1.0))]));
    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&ball, "material", Value::from("flat").into());
    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&ball, "material", opaque.clone().into());
    session.pump();

    assert_session_converged!(session);
    let model = session.client(&bob).replica().entity(&ball).unwrap().attribute("material").cloned();
    assert_eq!(model, Some(opaque.clone()));
    assert_eq!(session.client(&bob).host().attribute_value(&ball, "material"), Some(opaque.clone()));
    assert_eq!(session.client(&alice).host().attribute_value(&ball, "material"), Some(opaque));
}

#[test]
fn own_echo_can_be_skipped() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let config = ClientConfig {
        skip_local_echo: true,
        ..ClientConfig::default()
    };
    let alice = session.join_with("alice", config, FakeRenderHost::new());
    let bob = session.join("bob");
    let flag = EntityId::new("flag");
    session.client_mut(&bob).host_mut().add_local_node(
        &flag,
        "a-plane",
        host_attributes(vec![("color", "red".into())]),
    );
    session.pump();

    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&flag, "color", Value::from("white").into());
    session
        .client_mut(&bob)
        .host_mut()
        .local_write(&flag, "color", Value::from("black").into());
    session.pump();

    // Only Bob's change reaches Alice's node from the model
    let alice_host = session.client(&alice).host();
    assert_eq!(alice_host.count_ops(&HostOp::Set(flag.clone(), "color".to_string())), 1);
    assert_eq!(
        alice_host.attribute_value(&flag, "color"),
        Some(Value::Text("black".to_string()))
    );
}

#[test]
fn bridge_initializes_without_sync_after_fallback_delay() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let alice_avatar = EntityId::avatar_of(&alice);

    // Bob's transport never gets to deliver the full-sync signal
    let bob = ParticipantId::new("bob");
    let (snapshot, link) = session.reflector().join(&bob);
    let mut client = Client::new(
        bob,
        snapshot,
        ClientConfig::default(),
        FakeRenderHost::new(),
        link,
    );
    client
        .start(&SessionConfig::new("test-session"), Duration::from_millis(200))
        .unwrap();

    assert!(matches!(
        client.mirror().bridge(&alice_avatar).unwrap().state(),
        BridgeState::InitializingFromModel { .. }
    ));
    client.frame(Duration::from_millis(1199));
    assert!(client.host().node(&alice_avatar).is_none());

    client.frame(Duration::from_millis(1200));
    assert!(client.mirror().bridge(&alice_avatar).unwrap().is_active());
    let node = client.host().node(&alice_avatar).unwrap();
    let appearance = node.avatar.unwrap();
    assert!(!appearance.is_local);
}
