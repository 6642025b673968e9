use crate::error::GraphError;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name prefix that makes edge identities lexically distinct from node names.
pub const EDGE_PREFIX: &str = "edge-";

/// Identity of an edge. Always carries the [`EDGE_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// A fresh random identity of the form `edge-xxxxxxxx`.
    pub fn generate() -> Self {
        Self(format!("{}{:08x}", EDGE_PREFIX, rand::random::<u32>()))
    }

    /// Wraps a wire name, returning `None` if it lacks the edge prefix.
    pub fn parse(name: &str) -> Option<Self> {
        name.starts_with(EDGE_PREFIX).then(|| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of anything the graph can remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Node(String),
    Edge(EdgeId),
}

impl EntityId {
    /// Classifies a wire name by its prefix.
    pub fn from_wire(name: &str) -> Self {
        match EdgeId::parse(name) {
            Some(edge) => EntityId::Edge(edge),
            None => EntityId::Node(name.to_string()),
        }
    }

    pub fn node(name: &str) -> Self {
        EntityId::Node(name.to_string())
    }
}

impl From<EdgeId> for EntityId {
    fn from(edge: EdgeId) -> Self {
        EntityId::Edge(edge)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Node(name) => write!(f, "{}", name),
            EntityId::Edge(edge) => write!(f, "{}", edge),
        }
    }
}

/// A validated connection from an output of `src` to an input of `dest`.
///
/// Endpoints are held by name; the graph owns the nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    name: EdgeId,
    src: String,
    output: String,
    dest: String,
    input: String,
}

impl Edge {
    /// Validates the ports against the endpoint nodes and builds the edge.
    pub fn new(
        name: EdgeId,
        src: &Node,
        output: &str,
        dest: &Node,
        input: &str,
    ) -> Result<Self, GraphError> {
        if !src.has_output(output) {
            return Err(GraphError::UnknownOutput {
                node: src.name().to_string(),
                port: output.to_string(),
            });
        }
        if !dest.has_input(input) {
            return Err(GraphError::UnknownInput {
                node: dest.name().to_string(),
                port: input.to_string(),
            });
        }
        Ok(Self {
            name,
            src: src.name().to_string(),
            output: output.to_string(),
            dest: dest.name().to_string(),
            input: input.to_string(),
        })
    }

    pub fn name(&self) -> &EdgeId {
        &self.name
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn touches(&self, node: &str) -> bool {
        self.src == node || self.dest == node
    }
}
