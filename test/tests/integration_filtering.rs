/// Integration tests for attribute filtering on the local -> model path
/// Unsafe or unsyncable values must never reach the replica

use tandem_shared::{
    AttributeMap, EntityId, HostNode, HostValueBuilder, Origin, ReplicaCommand, ReplicaConfig,
    SessionTransport, Value, Vec3, POSITION,
};
use tandem_test::{assert_session_converged, host_attributes, host_vec3, TestSession};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn cyclic_value_replicates_without_its_cycle() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let board = EntityId::new("board");
    session.client_mut(&alice).host_mut().add_local_node(
        &board,
        "a-plane",
        host_attributes(vec![("color", "white".into())]),
    );
    session.pump();

    // data = { name: "notes", self: data, owner: #wall }
    let mut builder = HostValueBuilder::new();
    let root = builder.push(HostNode::Map(Vec::new()));
    let name = builder.push(HostNode::Text("notes".to_string()));
    let owner = builder.push(HostNode::NodeRef("wall".to_string()));
    builder.set(
        root,
        HostNode::Map(vec![
            ("name".to_string(), name),
            ("self".to_string(), root),
            ("owner".to_string(), owner),
        ]),
    );
    let data = builder.build(root);

    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&board, "data", data);
    session.pump();

    let mut expected = AttributeMap::new();
    expected.insert("name".to_string(), Value::Text("notes".to_string()));
    expected.insert("owner".to_string(), Value::asset_ref("wall"));
    assert_session_converged!(session);
    assert_eq!(
        session.client(&bob).replica().entity(&board).unwrap().attribute("data"),
        Some(&Value::Map(expected.clone()))
    );
    assert_eq!(
        session.client(&bob).host().attribute_value(&board, "data"),
        Some(Value::Map(expected))
    );
}

#[test]
fn avatar_custom_attribute_is_never_forwarded() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let avatar = EntityId::avatar_of(&alice);
    let before = session.reflector().published_by(&alice).len();

    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&avatar, "nickname", Value::from("ally").into());
    session.pump();

    assert_eq!(session.reflector().published_by(&alice).len(), before);
    let entity = session.client(&alice).replica().entity(&avatar).unwrap();
    assert!(entity.attribute("nickname").is_none());
}

#[test]
fn avatar_allow_listed_attribute_is_forwarded() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let avatar = EntityId::avatar_of(&alice);

    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&avatar, "scale", host_vec3(2.0, 2.0, 2.0));
    session.pump();

    assert_eq!(
        session.client(&bob).host().attribute_value(&avatar, "scale"),
        Some(Value::Vec3(Vec3::new(2.0, 2.0, 2.0)))
    );
}

#[test]
fn non_finite_local_write_keeps_previous_value() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let cube = EntityId::new("cube");
    session.client_mut(&alice).host_mut().add_local_node(
        &cube,
        "a-box",
        host_attributes(vec![(POSITION, Value::Vec3(Vec3::new(1.0, 1.0, 1.0)))]),
    );
    session.pump();
    let before = session.reflector().published_by(&alice).len();

    session
        .client_mut(&alice)
        .host_mut()
        .local_write(&cube, POSITION, host_vec3(f64::NAN, 0.0, 0.0));
    session.pump();

    assert_eq!(session.reflector().published_by(&alice).len(), before);
    assert_eq!(
        session.client(&bob).host().attribute_value(&cube, POSITION),
        Some(Value::Vec3(Vec3::new(1.0, 1.0, 1.0)))
    );
}

#[test]
fn non_finite_change_from_a_misbehaving_peer_is_rejected_everywhere() {
    init_logger();
    let mut session = TestSession::new(ReplicaConfig::default());
    let alice = session.join("alice");
    let bob = session.join("bob");
    let cube = EntityId::new("cube");
    session.client_mut(&alice).host_mut().add_local_node(
        &cube,
        "a-box",
        host_attributes(vec![(POSITION, Value::Vec3(Vec3::new(1.0, 1.0, 1.0)))]),
    );
    session.pump();

    let mut delta = AttributeMap::new();
    delta.insert(POSITION.to_string(), Value::Vec3(Vec3::new(0.0, f64::INFINITY, 0.0)));
    session
        .client_mut(&bob)
        .transport_mut()
        .publish(ReplicaCommand::ChangeComponent {
            entity_id: cube.clone(),
            delta,
            origin: Origin::Participant(bob.clone()),
        });
    session.pump();

    assert_session_converged!(session);
    for participant_id in [&alice, &bob] {
        let client = session.client(participant_id);
        assert_eq!(
            client.replica().entity(&cube).unwrap().attribute(POSITION),
            Some(&Value::Vec3(Vec3::new(1.0, 1.0, 1.0)))
        );
        assert_eq!(
            client.host().attribute_value(&cube, POSITION),
            Some(Value::Vec3(Vec3::new(1.0, 1.0, 1.0)))
        );
    }
}
