//! Common test fixtures: small catalogs and graphs wired to an in-memory channel.
use boxflow::definitions::TypeDefinition;
use boxflow::graph::Recorder;
use boxflow::link::Frame;
use boxflow::prelude::*;

/// Three small types:
///
/// - `Source`: input `gain` (1.0), output `out`
/// - `Sink`: inputs `in` (0.0), `level` (0.5), untyped `feed`, hidden
///   `secret` ("x"); output `out`
/// - `Trigger`: input `count` (0), buttons `go` and `stop`; output `out`
#[allow(dead_code)]
pub fn test_definitions() -> Definitions {
    let mut defs = Definitions::new();
    defs.define(
        "Source",
        vec![PortSpec::new("gain").with_value(1.0)],
        vec![PortSpec::new("out")],
        NodeKind::Labelled,
        "test",
    );
    defs.define(
        "Sink",
        vec![
            PortSpec::new("in").with_value(0.0),
            PortSpec::new("level").with_value(0.5),
            PortSpec::new("feed").with_mode(PortMode::Untyped),
            PortSpec::new("secret")
                .with_value("x")
                .with_mode(PortMode::Hidden),
        ],
        vec![PortSpec::new("out")],
        NodeKind::Base,
        "test",
    );
    defs.insert(
        "Trigger",
        TypeDefinition {
            inputs: vec![PortSpec::new("count").with_value(0)],
            outputs: vec![PortSpec::new("out")],
            buttons: vec![ButtonSpec::new("go", "Go!"), ButtonSpec::new("stop", "Stop")],
            variant: "LabelledNode".to_string(),
            group: "controls".to_string(),
        },
    );
    defs
}

/// A graph over [`test_definitions`] with an open channel and a recorder.
#[allow(dead_code)]
pub fn linked_graph() -> (Graph, MemoryChannel, Recorder) {
    let channel = MemoryChannel::open();
    let recorder = Recorder::new();
    let graph = Graph::builder(test_definitions())
        .with_link(SyncLink::new(channel.clone()))
        .with_observer(recorder.clone())
        .build();
    (graph, channel, recorder)
}

/// `src` (Source) wired `out -> in` to `dst` (Sink); the channel is drained.
#[allow(dead_code)]
pub fn wired_pair() -> (Graph, MemoryChannel, Recorder, EdgeId) {
    let (mut graph, channel, recorder) = linked_graph();
    add(&mut graph, "Source", "src");
    add(&mut graph, "Sink", "dst");
    let edge = graph.add_edge("src", "out", "dst", "in").unwrap();
    channel.take();
    recorder.take();
    (graph, channel, recorder, edge)
}

#[allow(dead_code)]
pub fn add(graph: &mut Graph, type_name: &str, name: &str) -> String {
    graph
        .create_node(type_name, Some(name), NodeOptions::default())
        .unwrap()
}

/// Command tags of the given frames, in order.
#[allow(dead_code)]
pub fn tags(frames: &[String]) -> Vec<String> {
    frames
        .iter()
        .map(|frame| Frame::decode(frame).unwrap().command)
        .collect()
}

/// Decodes every frame as an editor command.
#[allow(dead_code)]
pub fn commands(frames: &[String]) -> Vec<Command> {
    frames
        .iter()
        .map(|frame| Command::decode(frame).unwrap().unwrap())
        .collect()
}
