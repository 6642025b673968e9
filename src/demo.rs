//! A sample catalog and the canonical demo graph built on it.

use crate::definitions::{
    ButtonSpec, Definitions, Limits, NodeKind, PortMode, PortSpec, TypeDefinition,
};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::node::NodeOptions;
use serde_json::json;
use tracing::info;

fn number(name: &str, value: f64) -> PortSpec {
    PortSpec::new(name).with_value(value)
}

/// The single unnamed output every generator in the sample catalog has.
fn output() -> Vec<PortSpec> {
    vec![PortSpec::new("")]
}

/// Placement inputs shared by the pattern generators.
fn pattern_inputs(extra: Vec<PortSpec>) -> Vec<PortSpec> {
    let mut inputs = vec![
        number("x", 0.0).with_limits(Limits::Range(-1.0, 1.0)).with_step(0.01),
        number("y", 0.0).with_limits(Limits::Range(-1.0, 1.0)).with_step(0.01),
        number("orientation", 0.0).with_step(0.01),
        number("size", 1.0).with_limits(Limits::Min(0.0)).with_step(0.01),
        number("scale", 1.0).with_step(0.01),
        number("offset", 0.0).with_step(0.01),
    ];
    inputs.extend(extra);
    inputs
}

/// Two operands fed by other patterns, so neither is an editable parameter.
fn operands() -> Vec<PortSpec> {
    vec![
        PortSpec::new("lhs").with_mode(PortMode::Untyped),
        PortSpec::new("rhs").with_mode(PortMode::Untyped),
    ]
}

/// Catalog used by the demo graph and the command-line tool.
pub fn sample_definitions() -> Definitions {
    let mut defs = Definitions::new();

    defs.insert(
        "Widgets",
        TypeDefinition {
            inputs: vec![
                PortSpec::new("text").with_value("some text"),
                number("float slider", 2.0)
                    .with_limits(Limits::Range(-5.0, 5.0))
                    .with_step(0.1),
                number("constrained", 0.0)
                    .with_limits(Limits::Min(0.0))
                    .with_step(0.2),
                number("int slider", -4.0)
                    .with_limits(Limits::Range(-10.0, 10.0))
                    .with_step(1.0),
                PortSpec::new("selector")
                    .with_value("round")
                    .with_limits(Limits::Options(vec![json!("skew"), json!("round")])),
                number("value selector", 0.1).with_limits(Limits::Weighted(
                    json!({"fast": 1, "slow": 0.1})
                        .as_object()
                        .cloned()
                        .unwrap_or_default(),
                )),
                PortSpec::new("boolean").with_value(false),
            ],
            outputs: vec![PortSpec::new("output-1"), PortSpec::new("output-2")],
            buttons: vec![ButtonSpec::new("reset", "Reset")],
            variant: NodeKind::Labelled.as_str().to_string(),
            group: "default".to_string(),
        },
    );

    let smoothing = || number("smoothing", 0.1).with_limits(Limits::Min(0.0));
    defs.define(
        "Disk",
        pattern_inputs(vec![
            number("aspect_ratio", 1.0).with_limits(Limits::Min(0.0)),
            smoothing(),
        ]),
        output(),
        NodeKind::Image,
        "imagen",
    );
    defs.define(
        "Gaussian",
        pattern_inputs(vec![number("aspect_ratio", 0.3).with_limits(Limits::Min(0.0))]),
        output(),
        NodeKind::Image,
        "imagen",
    );
    defs.define(
        "Spiral",
        pattern_inputs(vec![
            number("thickness", 0.02).with_limits(Limits::Min(0.0)),
            smoothing(),
            number("turning", 0.05),
        ]),
        output(),
        NodeKind::Image,
        "imagen",
    );
    defs.define("Sub", operands(), output(), NodeKind::Labelled, "imagen");
    defs.define("Mul", operands(), output(), NodeKind::Labelled, "imagen");
    defs.define(
        "Viewport",
        vec![PortSpec::new("input").with_mode(PortMode::Untyped)],
        Vec::new(),
        NodeKind::Viewport,
        "imagen",
    );

    defs.define(
        "Magnitude",
        vec![number("magnitude", 0.5)
            .with_limits(Limits::Range(0.0, 1.0))
            .with_mode(PortMode::Hidden)],
        output(),
        NodeKind::Labelled,
        "numbergen",
    );
    defs.define(
        "BinaryOp",
        vec![
            number("lhs", 0.0),
            number("rhs", 1.0),
            PortSpec::new("operator").with_value("add").with_limits(Limits::Options(
                ["add", "sub", "mul", "mod", "pow", "div", "truediv", "floordiv"]
                    .into_iter()
                    .map(|op| json!(op))
                    .collect(),
            )),
        ],
        output(),
        NodeKind::Labelled,
        "numbergen",
    );

    defs
}

/// Adds the demo graph: two number generators driving three patterns that are
/// combined arithmetically and shown in a viewport.
///
/// Every type must be in the graph's current catalog.
#[allow(clippy::approx_constant)]
pub fn populate(graph: &mut Graph) -> Result<(), GraphError> {
    let nodes = [
        ("Magnitude", "magnitude:0", NodeOptions::at(0.0, 100.0)),
        (
            "BinaryOp",
            "binaryop:0",
            NodeOptions::at(150.0, 350.0)
                .with_param("operator", "mul")
                .with_param("lhs", 3.14),
        ),
        (
            "Disk",
            "disk:0",
            NodeOptions::at(200.0, 0.0)
                .with_param("aspect_ratio", 0.4)
                .with_param("orientation", 0.55),
        ),
        (
            "Gaussian",
            "gaussian:0",
            NodeOptions::at(380.0, 100.0)
                .with_param("aspect_ratio", 4.0)
                .with_param("orientation", 2.31),
        ),
        ("Sub", "sub:0", NodeOptions::at(600.0, 0.0)),
        ("Mul", "mul:0", NodeOptions::at(900.0, 100.0)),
        (
            "Spiral",
            "spiral:0",
            NodeOptions::at(600.0, 300.0).with_param("scale", 1.44),
        ),
        ("Viewport", "viewport:0", NodeOptions::at(1100.0, 100.0)),
    ];
    for (type_name, name, options) in nodes {
        graph.create_node(type_name, Some(name), options)?;
    }

    let edges = [
        ("magnitude:0", "x", "disk:0"),
        ("magnitude:0", "rhs", "binaryop:0"),
        ("binaryop:0", "orientation", "spiral:0"),
        ("disk:0", "lhs", "sub:0"),
        ("gaussian:0", "rhs", "sub:0"),
        ("sub:0", "lhs", "mul:0"),
        ("spiral:0", "rhs", "mul:0"),
        ("mul:0", "input", "viewport:0"),
    ];
    for (src, input, dest) in edges {
        graph.add_edge(src, "", dest, input)?;
    }

    info!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "demo graph ready"
    );
    Ok(())
}
