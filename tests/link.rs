//! Tests for the wire codec and the synchronization link.
mod common;
use boxflow::config::EditorConfig;
use boxflow::demo;
use boxflow::graph::{GraphEvent, Recorder};
use boxflow::prelude::*;
use common::{add, linked_graph, tags, wired_pair};
use serde_json::json;
use std::collections::BTreeMap;

#[test]
fn test_command_wire_format() {
    let command = Command::AddNode {
        type_name: "Disk".to_string(),
        name: "disk:0".to_string(),
        params: BTreeMap::from([("size".to_string(), json!(1.5))]),
    };
    let value: serde_json::Value = serde_json::from_str(&command.encode().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "command": "add_node",
            "data": {"type": "Disk", "name": "disk:0", "params": {"size": 1.5}}
        })
    );

    let remove = Command::RemoveEdge {
        src: "a".to_string(),
        output: "o".to_string(),
        dest: "b".to_string(),
        input: "i".to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&remove.encode().unwrap()).unwrap();
    assert_eq!(value["command"], "remove_edge");
    assert_eq!(
        value["data"],
        json!({"src": "a", "output": "o", "dest": "b", "input": "i"})
    );
}

#[test]
fn test_command_decode_unknown_tag() {
    assert_eq!(
        Command::decode(r#"{"command": "image_update", "data": {}}"#),
        Ok(None)
    );
    assert!(matches!(
        Command::decode(r#"{"command": "remove_node", "data": {}}"#),
        Err(LinkError::Decode(_))
    ));
}

#[test]
fn test_inbound_decoding() {
    let image = Inbound::decode(
        r#"{"command": "image_update", "data": {"name": "d", "b64": "data:x"}}"#,
    );
    assert_eq!(
        image,
        Ok(Inbound::ImageUpdate {
            name: "d".to_string(),
            image: Some("data:x".to_string())
        })
    );

    let invalid = Inbound::decode(r#"{"command": "invalid_edge", "data": "edge-0000abcd"}"#);
    assert_eq!(invalid, Ok(Inbound::InvalidEdge("edge-0000abcd".to_string())));

    let other = Inbound::decode(r#"{"command": "heartbeat"}"#);
    assert_eq!(other, Ok(Inbound::Unknown("heartbeat".to_string())));

    assert!(Inbound::decode("not json").is_err());
}

#[test]
fn test_commands_dropped_when_not_ready() {
    let channel = MemoryChannel::new(ChannelState::Connecting);
    let mut graph = Graph::builder(common::test_definitions())
        .with_link(SyncLink::new(channel.clone()))
        .build();

    add(&mut graph, "Source", "src");
    assert_eq!(graph.nodes().len(), 1);
    assert!(channel.sent().is_empty());
    assert_eq!(graph.link().unwrap().stats().dropped, 1);

    // Dropped commands are not replayed once the channel opens.
    channel.set_state(ChannelState::Open);
    add(&mut graph, "Sink", "dst");
    assert_eq!(tags(&channel.sent()), vec!["add_node"]);

    channel.close();
    graph.set_param("dst", "level", 0.3).unwrap();
    assert_eq!(channel.sent().len(), 1);
    assert_eq!(graph.link().unwrap().stats().sent, 1);
    assert_eq!(graph.link().unwrap().stats().dropped, 2);
}

#[test]
fn test_poll_state_tracks_transitions() {
    let channel = MemoryChannel::new(ChannelState::Connecting);
    let mut link = SyncLink::new(channel.clone());
    assert!(!link.is_ready());

    channel.set_state(ChannelState::Open);
    assert_eq!(link.poll_state(), ChannelState::Open);
    assert!(link.is_ready());

    channel.close();
    assert_eq!(link.poll_state(), ChannelState::Closed);
}

#[test]
fn test_param_update_is_not_echoed() {
    let (mut graph, channel, recorder, _) = wired_pair();

    let frame = Inbound::ParamUpdate {
        name: "dst".to_string(),
        params: BTreeMap::from([
            ("level".to_string(), json!(0.9)),
            ("in".to_string(), json!(4.0)),
            ("undeclared".to_string(), json!(1)),
        ]),
    }
    .encode()
    .unwrap();
    graph.receive(&frame).unwrap();

    let dst = graph.find_node("dst").unwrap();
    assert_eq!(dst.param("level"), Some(&json!(0.9)));
    // Remote values may overwrite locked parameters.
    assert_eq!(dst.param("in"), Some(&json!(4.0)));
    assert!(dst.param("undeclared").is_none());

    assert!(channel.sent().is_empty());
    assert_eq!(recorder.events(), vec![GraphEvent::ParamsRefresh("dst".to_string())]);
}

#[test]
fn test_param_update_for_unknown_node_is_ignored() {
    let (mut graph, channel, recorder, _) = wired_pair();
    assert!(!graph.apply_remote_params("ghost", &BTreeMap::new()));
    assert!(channel.sent().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_invalid_edge_removes_without_echo() {
    let (mut graph, channel, recorder, edge) = wired_pair();

    let frame = Inbound::InvalidEdge(edge.to_string()).encode().unwrap();
    graph.receive(&frame).unwrap();

    assert!(graph.edges().is_empty());
    assert!(!graph.find_node("dst").unwrap().is_locked("in"));
    assert!(channel.sent().is_empty());
    assert_eq!(
        recorder.events(),
        vec![GraphEvent::Changed(GraphChange::EdgeRemoved(edge))]
    );
}

#[test]
fn test_invalid_edge_naming_a_node_is_ignored() {
    let (mut graph, channel, recorder, edge) = wired_pair();

    let frame = Inbound::InvalidEdge("dst".to_string()).encode().unwrap();
    graph.receive(&frame).unwrap();

    assert!(graph.find_node("dst").is_some());
    assert_eq!(graph.nodes().len(), 2);
    assert!(graph.find_edge(edge.as_str()).is_some());
    assert!(graph.find_node("dst").unwrap().is_locked("in"));
    assert!(channel.sent().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_image_update_marks_slot_dirty() {
    let mut graph = Graph::new(demo::sample_definitions());
    let recorder = Recorder::new();
    graph.add_observer(recorder.clone());
    graph
        .create_node("Disk", Some("disk:0"), NodeOptions::default())
        .unwrap();
    graph
        .create_node("Sub", Some("sub:0"), NodeOptions::default())
        .unwrap();
    recorder.take();

    let frame = Inbound::ImageUpdate {
        name: "disk:0".to_string(),
        image: Some("data:image/png;base64,AAAA".to_string()),
    }
    .encode()
    .unwrap();
    graph.receive(&frame).unwrap();

    let slot = graph.find_node("disk:0").unwrap().image().unwrap();
    assert!(slot.dirty);
    assert_eq!(slot.payload.as_deref(), Some("data:image/png;base64,AAAA"));
    assert_eq!(
        recorder.take(),
        vec![GraphEvent::ImageUpdated("disk:0".to_string())]
    );

    graph.image_refreshed("disk:0");
    assert!(!graph.find_node("disk:0").unwrap().image().unwrap().dirty);

    // Labelled nodes have no image slot.
    graph.apply_inbound(Inbound::ImageUpdate {
        name: "sub:0".to_string(),
        image: Some("data:".to_string()),
    });
    assert!(graph.find_node("sub:0").unwrap().image().is_none());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_definitions_message_replaces_catalog() {
    let (mut graph, channel, recorder) = linked_graph();
    let frame = Inbound::Definitions(demo::sample_definitions())
        .encode()
        .unwrap();
    graph.receive(&frame).unwrap();

    assert!(graph.definitions().contains("Spiral"));
    assert!(!graph.definitions().contains("Source"));
    assert!(graph.nodes().is_empty());
    assert!(channel.sent().is_empty());
    assert_eq!(
        recorder.events(),
        vec![GraphEvent::DefinitionsLoaded(demo::sample_definitions().len())]
    );
}

#[test]
fn test_definitions_message_builds_demo_when_configured() {
    let config = EditorConfig::from_json(r#"{"auto_demo": true}"#).unwrap();
    let channel = MemoryChannel::open();
    let mut graph = Graph::builder(Definitions::new())
        .with_config(config)
        .with_link(SyncLink::new(channel.clone()))
        .build();

    graph.apply_inbound(Inbound::Definitions(demo::sample_definitions()));
    assert_eq!(graph.nodes().len(), 8);
    assert_eq!(graph.edges().len(), 8);

    let sent = tags(&channel.take());
    assert_eq!(sent.iter().filter(|t| *t == "add_node").count(), 8);
    assert_eq!(sent.iter().filter(|t| *t == "add_edge").count(), 8);
}

#[test]
fn test_malformed_and_unknown_frames() {
    let (mut graph, channel, _, _) = wired_pair();
    assert!(matches!(graph.receive("{oops"), Err(LinkError::Decode(_))));
    assert!(graph.receive(r#"{"command": "status", "data": 1}"#).is_ok());
    assert_eq!(graph.nodes().len(), 2);
    assert!(channel.sent().is_empty());
}

#[test]
fn test_resync_resends_everything() {
    let (mut graph, channel, _, _) = wired_pair();
    assert_eq!(graph.resync(), 3);
    assert_eq!(
        tags(&channel.take()),
        vec!["add_node", "add_node", "add_edge"]
    );
}

#[test]
fn test_detached_link_sends_nothing() {
    let (mut graph, channel, _, _) = wired_pair();
    let link = graph.detach_link().unwrap();
    graph.set_param("dst", "level", 0.1).unwrap();
    assert!(channel.sent().is_empty());

    graph.attach_link(link);
    graph.set_param("dst", "level", 0.2).unwrap();
    assert_eq!(tags(&channel.take()), vec!["update_params"]);
}
