use crate::definitions::ParamValue;
use crate::error::{GraphError, SnapshotError};
use crate::graph::{EdgeId, EntityId, Graph};
use crate::node::{Node, NodeOptions};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use tracing::info;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub type_name: String,
    pub name: String,
    /// Parameter values as a JSON object; bincode cannot carry `serde_json::Value`.
    pub params_json: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

impl NodeRecord {
    pub fn params(&self) -> Result<BTreeMap<String, ParamValue>, SnapshotError> {
        serde_json::from_str(&self.params_json)
            .map_err(|e| SnapshotError::Decode(format!("params of '{}': {}", self.name, e)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub src: String,
    pub output: String,
    pub dest: String,
    pub input: String,
}

/// Everything needed to rebuild a graph: nodes in insertion order and edges
/// by their endpoints. Edge identities are not kept.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let mut file = fs::File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| SnapshotError::Io {
                path: path.to_string(),
                source,
            })?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

impl Graph {
    pub fn snapshot(&self) -> Result<GraphSnapshot, SnapshotError> {
        let nodes = self
            .nodes()
            .iter()
            .map(|node| -> Result<NodeRecord, SnapshotError> {
                let params_json = serde_json::to_string(node.params())
                    .map_err(|e| SnapshotError::Encode(e.to_string()))?;
                Ok(NodeRecord {
                    type_name: node.type_name().to_string(),
                    name: node.name().to_string(),
                    params_json,
                    left: node.geom.left,
                    top: node.geom.top,
                    width: node.geom.width,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let edges = self
            .edges()
            .iter()
            .map(|edge| EdgeRecord {
                src: edge.src().to_string(),
                output: edge.output().to_string(),
                dest: edge.dest().to_string(),
                input: edge.input().to_string(),
            })
            .collect();
        Ok(GraphSnapshot { nodes, edges })
    }

    /// Replaces the graph's contents with a snapshot.
    ///
    /// The snapshot is checked against the current catalog before anything
    /// is removed, so a failed restore leaves the graph and the peer as they
    /// were. On success the old contents are removed and the snapshot is
    /// replayed through the ordinary mutation path, so an attached link sees
    /// every step.
    pub fn restore(&mut self, snapshot: &GraphSnapshot) -> Result<(), SnapshotError> {
        let nodes = self.build_nodes(snapshot)?;
        check_edges(&nodes, &snapshot.edges)?;

        let existing: Vec<String> = self.nodes().iter().map(|n| n.name().to_string()).collect();
        for name in existing {
            self.remove(&EntityId::Node(name));
        }

        for node in nodes {
            self.add_node(node)?;
        }
        for record in &snapshot.edges {
            self.add_edge(&record.src, &record.output, &record.dest, &record.input)?;
        }
        info!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "restored graph snapshot"
        );
        Ok(())
    }

    /// Instantiates every recorded node without adding it to the graph.
    fn build_nodes(&self, snapshot: &GraphSnapshot) -> Result<Vec<Node>, SnapshotError> {
        let mut nodes: Vec<Node> = Vec::with_capacity(snapshot.nodes.len());
        for record in &snapshot.nodes {
            let options = NodeOptions {
                pos: Some((record.left, record.top)),
                width: Some(record.width),
                params: record.params()?,
            };
            let node = Node::from_definitions(
                self.definitions(),
                &record.type_name,
                &record.name,
                options,
                &self.config().geometry,
            )?;
            if EdgeId::parse(node.name()).is_some() {
                return Err(GraphError::ReservedName(record.name.clone()).into());
            }
            if nodes.iter().any(|n| n.name() == node.name()) {
                return Err(GraphError::DuplicateNode(record.name.clone()).into());
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Resolves every recorded edge against the snapshot's own nodes.
fn check_edges(nodes: &[Node], edges: &[EdgeRecord]) -> Result<(), GraphError> {
    for record in edges {
        let src = find_record(nodes, "Source", &record.src)?;
        let dest = find_record(nodes, "Destination", &record.dest)?;
        if !src.has_output(&record.output) {
            return Err(GraphError::UnknownOutput {
                node: record.src.clone(),
                port: record.output.clone(),
            });
        }
        if !dest.has_input(&record.input) {
            return Err(GraphError::UnknownInput {
                node: record.dest.clone(),
                port: record.input.clone(),
            });
        }
    }
    Ok(())
}

fn find_record<'a>(
    nodes: &'a [Node],
    role: &'static str,
    name: &str,
) -> Result<&'a Node, GraphError> {
    nodes
        .iter()
        .find(|n| n.name() == name)
        .ok_or_else(|| GraphError::NodeNotInGraph {
            role,
            name: name.to_string(),
        })
}
