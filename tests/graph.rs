//! Tests for graph membership, the lock invariant and local edits.
mod common;
use boxflow::graph::{GraphEvent, Origin};
use boxflow::node::{NodeTemplate, TriggerOutcome};
use boxflow::prelude::*;
use common::{add, commands, linked_graph, tags, wired_pair};
use serde_json::json;
use std::collections::BTreeMap;

#[test]
fn test_add_node_forwards_full_parameters() {
    let (mut graph, channel, recorder) = linked_graph();
    add(&mut graph, "Source", "src");

    let sent = commands(&channel.take());
    assert_eq!(
        sent,
        vec![Command::AddNode {
            type_name: "Source".to_string(),
            name: "src".to_string(),
            params: BTreeMap::from([("gain".to_string(), json!(1.0))]),
        }]
    );
    assert_eq!(
        recorder.events(),
        vec![GraphEvent::Changed(GraphChange::NodeAdded("src".to_string()))]
    );
}

#[test]
fn test_add_node_rejects_duplicates_and_edge_names() {
    let (mut graph, channel, _) = linked_graph();
    add(&mut graph, "Source", "src");
    channel.take();

    let dup = graph.create_node("Sink", Some("src"), NodeOptions::default());
    assert_eq!(dup, Err(GraphError::DuplicateNode("src".to_string())));

    let reserved = graph.create_node("Sink", Some("edge-1234"), NodeOptions::default());
    assert_eq!(reserved, Err(GraphError::ReservedName("edge-1234".to_string())));

    assert_eq!(graph.nodes().len(), 1);
    assert!(channel.sent().is_empty());
}

#[test]
fn test_node_without_ports_is_rejected() {
    let result = Node::new(NodeTemplate {
        name: "empty".to_string(),
        ..NodeTemplate::default()
    });
    assert_eq!(result, Err(GraphError::NoPorts("empty".to_string())));
}

#[test]
fn test_create_node_from_definitions() {
    let (mut graph, _, _) = linked_graph();
    let name = graph
        .create_node(
            "Trigger",
            None,
            NodeOptions::at(10.0, 20.0).with_param("count", 3),
        )
        .unwrap();
    assert_eq!(name, "trigger:0");

    let node = graph.find_node(&name).unwrap();
    assert_eq!(node.kind(), NodeKind::Labelled);
    assert_eq!(node.param("count"), Some(&json!(3)));
    assert_eq!(node.label("go"), "Go!");
    assert_eq!(node.buttons().len(), 2);
    assert_eq!((node.geom.left, node.geom.top), (10.0, 20.0));

    let bad = graph.create_node("Trigger", None, NodeOptions::default().with_param("nope", 1));
    assert!(matches!(bad, Err(GraphError::UnknownParam { .. })));

    let unknown = graph.create_node("Ghost", None, NodeOptions::default());
    assert!(matches!(unknown, Err(GraphError::Definition(_))));
}

#[test]
fn test_new_name_picks_lowest_free_index() {
    let (mut graph, _, _) = linked_graph();
    assert_eq!(graph.new_name("Sink"), "sink:0");

    add(&mut graph, "Sink", "sink:0");
    assert_eq!(graph.new_name("Sink"), "sink:1");

    add(&mut graph, "Sink", "sink:1");
    graph.remove(&EntityId::node("sink:0"));
    assert_eq!(graph.new_name("Sink"), "sink:0");
}

#[test]
fn test_add_edge_locks_input_and_resends_params() {
    let (mut graph, channel, recorder) = linked_graph();
    add(&mut graph, "Source", "src");
    add(&mut graph, "Sink", "dst");
    channel.take();
    recorder.take();

    let edge = graph.add_edge("src", "out", "dst", "in").unwrap();
    assert!(edge.as_str().starts_with("edge-"));
    assert!(graph.find_node("dst").unwrap().is_locked("in"));
    assert!(!graph.find_node("dst").unwrap().is_locked("level"));

    let sent = commands(&channel.take());
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        Command::AddEdge {
            name: edge.to_string(),
            src: "src".to_string(),
            output: "out".to_string(),
            dest: "dst".to_string(),
            input: "in".to_string(),
        }
    );
    assert!(matches!(&sent[1], Command::UpdateParams { name, .. } if name == "dst"));
    assert_eq!(
        recorder.events(),
        vec![GraphEvent::Changed(GraphChange::EdgeAdded(edge))]
    );
}

#[test]
fn test_add_edge_failures_leave_graph_untouched() {
    let (mut graph, channel, _) = linked_graph();
    add(&mut graph, "Source", "src");
    add(&mut graph, "Sink", "dst");
    channel.take();

    assert_eq!(
        graph.add_edge("ghost", "out", "dst", "in"),
        Err(GraphError::NodeNotInGraph {
            role: "Source",
            name: "ghost".to_string()
        })
    );
    assert_eq!(
        graph.add_edge("src", "out", "ghost", "in"),
        Err(GraphError::NodeNotInGraph {
            role: "Destination",
            name: "ghost".to_string()
        })
    );
    assert_eq!(
        graph.add_edge("src", "nope", "dst", "in"),
        Err(GraphError::UnknownOutput {
            node: "src".to_string(),
            port: "nope".to_string()
        })
    );
    assert_eq!(
        graph.add_edge("src", "out", "dst", "nope"),
        Err(GraphError::UnknownInput {
            node: "dst".to_string(),
            port: "nope".to_string()
        })
    );

    assert!(graph.edges().is_empty());
    assert!(graph.find_node("dst").unwrap().locked_params().values().all(|l| !l));
    assert!(channel.sent().is_empty());
}

#[test]
fn test_remove_edge_unlocks_input() {
    let (mut graph, channel, _, edge) = wired_pair();

    assert!(graph.remove(&edge.clone().into()));
    assert!(graph.edges().is_empty());
    assert!(!graph.find_node("dst").unwrap().is_locked("in"));
    assert_eq!(tags(&channel.take()), vec!["remove_edge", "update_params"]);

    // Removing it again is a logged miss.
    assert!(!graph.remove(&edge.into()));
    assert!(channel.sent().is_empty());
}

#[test]
fn test_input_stays_locked_while_another_edge_feeds_it() {
    let (mut graph, _, _, first) = wired_pair();
    add(&mut graph, "Source", "other");
    let second = graph.add_edge("other", "out", "dst", "in").unwrap();

    graph.remove(&first.into());
    assert!(graph.find_node("dst").unwrap().is_locked("in"));

    graph.remove(&second.into());
    assert!(!graph.find_node("dst").unwrap().is_locked("in"));
}

#[test]
fn test_remove_node_cascades_edges() {
    let (mut graph, channel, recorder, edge) = wired_pair();
    add(&mut graph, "Sink", "dst2");
    graph.add_edge("src", "out", "dst2", "level").unwrap();
    channel.take();
    recorder.take();

    assert!(graph.remove(&EntityId::node("src")));
    assert_eq!(graph.nodes().len(), 2);
    assert!(graph.edges().is_empty());
    assert!(!graph.find_node("dst").unwrap().is_locked("in"));
    assert!(!graph.find_node("dst2").unwrap().is_locked("level"));

    let sent = tags(&channel.take());
    assert_eq!(sent[0], "remove_node");
    assert_eq!(sent.iter().filter(|t| *t == "remove_edge").count(), 2);

    let events = recorder.events();
    assert!(events.contains(&GraphEvent::Changed(GraphChange::EdgeRemoved(edge))));
    assert_eq!(
        events.last(),
        Some(&GraphEvent::Changed(GraphChange::NodeRemoved("src".to_string())))
    );
}

#[test]
fn test_remote_removal_sends_nothing() {
    let (mut graph, channel, _, _) = wired_pair();
    assert!(graph.remove_with(&EntityId::node("dst"), Origin::Remote));
    assert!(graph.edges().is_empty());
    assert!(channel.sent().is_empty());
}

#[test]
fn test_node_edges_by_direction() {
    let (mut graph, _, _, _) = wired_pair();
    add(&mut graph, "Sink", "dst2");
    graph.add_edge("src", "out", "dst2", "in").unwrap();

    assert_eq!(graph.node_edges("src", Direction::Output).len(), 2);
    assert!(graph.node_edges("src", Direction::Input).is_empty());
    assert_eq!(graph.node_edges("dst2", Direction::Input).len(), 1);
}

#[test]
fn test_find_misses_return_none() {
    let (graph, _, _, edge) = wired_pair();
    assert!(graph.find_node("ghost").is_none());
    assert!(graph.find_edge("not-an-edge").is_none());
    assert_eq!(graph.find_edge(edge.as_str()).unwrap().dest(), "dst");
}

#[test]
fn test_editable_params_hide_locked_and_untyped() {
    let (graph, _, _, _) = wired_pair();
    let dst = graph.find_node("dst").unwrap();

    assert_eq!(dst.editable_params(), vec!["level", "secret"]);
    assert!(dst.unlocked_params(&BTreeMap::new()).is_empty());
    // Untyped inputs get a lock slot even though they carry no parameter.
    assert_eq!(dst.locked_params().get("feed"), Some(&false));
}

#[test]
fn test_set_param_forwards_only_changes() {
    let (mut graph, channel, _, _) = wired_pair();

    assert_eq!(graph.set_param("dst", "level", 0.75), Ok(true));
    assert_eq!(tags(&channel.take()), vec!["update_params"]);

    assert_eq!(graph.set_param("dst", "level", 0.75), Ok(false));
    assert!(channel.sent().is_empty());
}

#[test]
fn test_locked_and_unknown_params_reject_local_edits() {
    let (mut graph, channel, _, _) = wired_pair();

    assert_eq!(
        graph.set_param("dst", "in", 1.0),
        Err(GraphError::LockedParam {
            node: "dst".to_string(),
            param: "in".to_string()
        })
    );
    assert!(matches!(
        graph.set_param("dst", "feed", 1.0),
        Err(GraphError::UnknownParam { .. })
    ));
    assert!(matches!(
        graph.set_param("ghost", "level", 1.0),
        Err(GraphError::NodeNotInGraph { .. })
    ));
    assert_eq!(graph.find_node("dst").unwrap().param("in"), Some(&json!(0.0)));
    assert!(channel.sent().is_empty());
}

#[test]
fn test_batch_edit_sends_one_update() {
    let (mut graph, channel, _, _) = wired_pair();

    let outcome = graph
        .edit_node("dst", |batch| {
            batch.set("level", 0.1)?.set("secret", "y")?;
            Ok(())
        })
        .unwrap();
    assert!(outcome.params_changed);

    let sent = commands(&channel.take());
    assert_eq!(sent.len(), 1);
    let Command::UpdateParams { name, params } = &sent[0] else {
        panic!("expected update_params, got {:?}", sent[0]);
    };
    assert_eq!(name, "dst");
    assert_eq!(params["level"], json!(0.1));
    assert_eq!(params["secret"], json!("y"));
    assert_eq!(params["in"], json!(0.0));
}

#[test]
fn test_failed_batch_still_commits_earlier_edits() {
    let (mut graph, channel, _, _) = wired_pair();

    let result = graph.edit_node("dst", |batch| {
        batch.set("level", 0.2)?.set("in", 5.0)?;
        Ok(())
    });
    assert!(matches!(result, Err(GraphError::LockedParam { .. })));
    assert_eq!(graph.find_node("dst").unwrap().param("level"), Some(&json!(0.2)));
    assert_eq!(tags(&channel.take()), vec!["update_params"]);
}

#[test]
fn test_trigger_button_sends_callback() {
    let (mut graph, channel, _) = linked_graph();
    add(&mut graph, "Trigger", "t");
    channel.take();

    graph.trigger_button("t", "go").unwrap();
    assert_eq!(
        commands(&channel.take()),
        vec![Command::TriggerButton {
            name: "t".to_string(),
            button: "go".to_string()
        }]
    );
    assert!(graph.find_node("t").unwrap().buttons().values().all(|b| !b));

    assert!(matches!(
        graph.trigger_button("t", "explode"),
        Err(GraphError::UnknownButton { .. })
    ));
}

#[test]
fn test_simultaneous_triggers_are_not_forwarded() {
    let (mut graph, channel, _) = linked_graph();
    add(&mut graph, "Trigger", "t");
    channel.take();

    let outcome = graph
        .edit_node("t", |batch| {
            batch.trigger("go")?.trigger("stop")?;
            Ok(())
        })
        .unwrap();
    assert!(matches!(outcome.trigger, TriggerOutcome::Many(ref fired) if fired.len() == 2));
    assert!(channel.sent().is_empty());
    assert!(graph.find_node("t").unwrap().buttons().values().all(|b| !b));
}

#[test]
fn test_graph_without_link_still_mutates() {
    let mut graph = Graph::new(common::test_definitions());
    add(&mut graph, "Source", "src");
    add(&mut graph, "Sink", "dst");
    graph.add_edge("src", "out", "dst", "in").unwrap();
    assert!(graph.link().is_none());
    assert!(graph.find_node("dst").unwrap().is_locked("in"));
}
