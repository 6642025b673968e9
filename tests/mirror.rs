//! Tests for the peer-side mirror and round trips through it.
mod common;
use boxflow::demo;
use boxflow::mirror::MirrorLink;
use boxflow::prelude::*;
use common::{add, linked_graph, wired_pair};
use serde_json::json;

/// Feeds every frame the graph sent into the mirror, then every reply back
/// into the graph. Returns the replies.
fn pump(graph: &mut Graph, channel: &MemoryChannel, mirror: &mut Mirror) -> Vec<String> {
    let mut replies = Vec::new();
    for frame in channel.take() {
        replies.extend(mirror.dispatch(&frame).unwrap());
    }
    for reply in &replies {
        graph.receive(reply).unwrap();
    }
    replies
}

#[test]
fn test_add_node_round_trip() {
    let (mut graph, channel, _) = linked_graph();
    let mut mirror = Mirror::new(common::test_definitions());

    graph
        .create_node(
            "Sink",
            Some("dst"),
            NodeOptions::default().with_param("level", 0.25),
        )
        .unwrap();
    pump(&mut graph, &channel, &mut mirror);

    let mirrored = mirror.find_box("dst").unwrap();
    assert_eq!(mirrored.type_name, "Sink");
    assert_eq!(&mirrored.params, graph.find_node("dst").unwrap().params());
    assert_eq!(mirrored.params["level"], json!(0.25));
}

#[test]
fn test_demo_graph_mirrors_exactly() {
    let channel = MemoryChannel::open();
    let mut graph = Graph::builder(demo::sample_definitions())
        .with_link(SyncLink::new(channel.clone()))
        .build();
    let mut mirror = Mirror::new(demo::sample_definitions());

    demo::populate(&mut graph).unwrap();
    let replies = pump(&mut graph, &channel, &mut mirror);

    assert!(replies.is_empty());
    assert_eq!(mirror.boxes().len(), graph.nodes().len());
    assert_eq!(mirror.links().len(), graph.edges().len());
    for node in graph.nodes() {
        assert_eq!(&mirror.find_box(node.name()).unwrap().params, node.params());
    }
}

#[test]
fn test_rejected_edge_is_removed_locally() {
    let (mut graph, channel, _) = linked_graph();
    add(&mut graph, "Source", "src");
    add(&mut graph, "Sink", "dst");
    graph.add_edge("src", "out", "dst", "in").unwrap();

    // This peer only knows a Sink without the `in` input.
    let mut peer_defs = common::test_definitions();
    peer_defs.define(
        "Sink",
        vec![PortSpec::new("level").with_value(0.5)],
        vec![PortSpec::new("out")],
        NodeKind::Base,
        "test",
    );
    let mut mirror = Mirror::new(peer_defs);

    let replies = pump(&mut graph, &channel, &mut mirror);
    assert_eq!(replies.len(), 1);
    assert!(graph.edges().is_empty());
    assert!(!graph.find_node("dst").unwrap().is_locked("in"));
    assert!(mirror.links().is_empty());
    // The removal came from the peer, so nothing goes back.
    assert!(channel.sent().is_empty());
}

#[test]
fn test_link_validation() {
    let mut mirror = Mirror::new(common::test_definitions());
    for (type_name, name) in [("Source", "src"), ("Sink", "dst")] {
        mirror.apply(Command::AddNode {
            type_name: type_name.to_string(),
            name: name.to_string(),
            params: Default::default(),
        });
    }
    let link = |src: &str, output: &str, dest: &str, input: &str| MirrorLink {
        src: src.to_string(),
        output: output.to_string(),
        dest: dest.to_string(),
        input: input.to_string(),
    };

    assert!(mirror.allowed_link(&link("src", "out", "dst", "in")));
    assert!(!mirror.allowed_link(&link("src", "nope", "dst", "in")));
    assert!(!mirror.allowed_link(&link("src", "out", "dst", "nope")));
    assert!(!mirror.allowed_link(&link("ghost", "out", "dst", "in")));
}

#[test]
fn test_remove_edge_restores_default() {
    let (mut graph, channel, _, edge) = wired_pair();
    let mut mirror = Mirror::new(common::test_definitions());
    // Replay the whole graph into a fresh mirror.
    graph.resync();
    pump(&mut graph, &channel, &mut mirror);

    mirror.apply(Command::UpdateParams {
        name: "dst".to_string(),
        params: [("in".to_string(), json!(7.0))].into_iter().collect(),
    });
    assert_eq!(mirror.find_box("dst").unwrap().params["in"], json!(7.0));

    let edge = graph.find_edge(edge.as_str()).unwrap();
    let replies = mirror.apply(Command::RemoveEdge {
        src: edge.src().to_string(),
        output: edge.output().to_string(),
        dest: edge.dest().to_string(),
        input: edge.input().to_string(),
    });
    assert!(replies.is_empty());
    assert!(mirror.links().is_empty());
    assert_eq!(mirror.find_box("dst").unwrap().params["in"], json!(0.0));
}

#[test]
fn test_remove_node_drops_box() {
    let (mut graph, channel, _) = linked_graph();
    let mut mirror = Mirror::new(common::test_definitions());
    add(&mut graph, "Source", "src");
    pump(&mut graph, &channel, &mut mirror);
    assert_eq!(mirror.boxes().len(), 1);

    graph.remove(&EntityId::node("src"));
    pump(&mut graph, &channel, &mut mirror);
    assert!(mirror.boxes().is_empty());
}

#[test]
fn test_trigger_button_replies_with_params() {
    let (mut graph, channel, recorder) = linked_graph();
    let mut mirror = Mirror::new(common::test_definitions());
    add(&mut graph, "Trigger", "t");
    pump(&mut graph, &channel, &mut mirror);
    recorder.take();

    graph.trigger_button("t", "go").unwrap();
    let replies = pump(&mut graph, &channel, &mut mirror);
    assert_eq!(replies.len(), 1);
    assert!(matches!(
        Inbound::decode(&replies[0]),
        Ok(Inbound::ParamUpdate { ref name, .. }) if name == "t"
    ));
    // Applying the reply does not bounce another update to the peer.
    assert!(channel.sent().is_empty());

    let unknown = mirror.apply(Command::TriggerButton {
        name: "t".to_string(),
        button: "explode".to_string(),
    });
    assert!(unknown.is_empty());
}

#[test]
fn test_unknown_type_is_not_mirrored() {
    let mut mirror = Mirror::new(common::test_definitions());
    let replies = mirror.apply(Command::AddNode {
        type_name: "Ghost".to_string(),
        name: "g".to_string(),
        params: Default::default(),
    });
    assert!(replies.is_empty());
    assert!(mirror.boxes().is_empty());
}

#[test]
fn test_definitions_frame_loads_into_graph() {
    let mirror = Mirror::new(demo::sample_definitions());
    let mut graph = Graph::new(Definitions::new());
    graph.receive(&mirror.definitions_frame().unwrap()).unwrap();
    assert_eq!(graph.definitions(), mirror.definitions());
}
