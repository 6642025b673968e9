//! The graph: sole owner and writer of node and edge membership.
//!
//! Every structural mutation passes through [`Graph`], which keeps the lock
//! invariant (`locked_params[p]` is true iff an edge feeds input `p`), forwards
//! local changes to the attached [`SyncLink`] and reports them to observers.
//! Changes that originate at the peer are applied through [`Origin::Remote`]
//! paths that never reach the link, so they cannot echo back.

mod edge;
mod observer;

pub use edge::*;
pub use observer::*;

use crate::config::EditorConfig;
use crate::definitions::{Definitions, ParamValue};
use crate::demo;
use crate::error::{GraphError, LinkError};
use crate::link::{Inbound, SyncLink};
use crate::node::{Direction, EditOutcome, Node, NodeOptions, ParamEdit, TriggerOutcome};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Where a mutation came from. Remote-origin mutations are never forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// Builder for [`Graph`].
pub struct GraphBuilder {
    defs: Definitions,
    config: EditorConfig,
    link: Option<SyncLink>,
    observers: Vec<Box<dyn GraphObserver>>,
}

impl GraphBuilder {
    pub fn new(defs: Definitions) -> Self {
        Self {
            defs,
            config: EditorConfig::default(),
            link: None,
            observers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_link(mut self, link: SyncLink) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_observer(mut self, observer: impl GraphObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> Graph {
        Graph {
            defs: self.defs,
            nodes: Vec::new(),
            edges: Vec::new(),
            link: self.link,
            observers: self.observers,
            config: self.config,
        }
    }
}

/// Insertion-ordered collection of nodes and the edges between them.
pub struct Graph {
    defs: Definitions,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    link: Option<SyncLink>,
    observers: Vec<Box<dyn GraphObserver>>,
    config: EditorConfig,
}

impl Graph {
    pub fn new(defs: Definitions) -> Self {
        GraphBuilder::new(defs).build()
    }

    pub fn builder(defs: Definitions) -> GraphBuilder {
        GraphBuilder::new(defs)
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn link(&self) -> Option<&SyncLink> {
        self.link.as_ref()
    }

    pub fn attach_link(&mut self, link: SyncLink) {
        self.link = Some(link);
    }

    pub fn detach_link(&mut self) -> Option<SyncLink> {
        self.link.take()
    }

    pub fn add_observer(&mut self, observer: impl GraphObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replaces the catalog and tells observers to rebuild their menus.
    pub fn set_definitions(&mut self, defs: Definitions) {
        self.defs = defs;
        info!(types = self.defs.len(), "definitions loaded");
        for observer in self.observers.iter_mut() {
            observer.definitions_loaded(&self.defs);
        }
    }

    /// Appends a node and forwards it to the peer.
    ///
    /// Names must be unique and must not look like edge names.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if EdgeId::parse(node.name()).is_some() {
            return Err(GraphError::ReservedName(node.name().to_string()));
        }
        if self.node_index(node.name()).is_some() {
            return Err(GraphError::DuplicateNode(node.name().to_string()));
        }

        let name = node.name().to_string();
        self.nodes.push(node);
        if let Some(link) = self.link.as_mut() {
            link.add_node(&self.nodes[self.nodes.len() - 1]);
        }
        self.emit(GraphChange::NodeAdded(name));
        Ok(())
    }

    /// Instantiates `type_name` from the catalog and adds it.
    ///
    /// Without a suggested name one is allocated with [`Graph::new_name`].
    /// Returns the name of the new node.
    pub fn create_node(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        options: NodeOptions,
    ) -> Result<String, GraphError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.new_name(type_name),
        };
        let node = Node::from_definitions(
            &self.defs,
            type_name,
            &name,
            options,
            &self.config.geometry,
        )?;
        self.add_node(node)?;
        Ok(name)
    }

    /// Connects `src.output` to `dest.input`.
    ///
    /// Fails without touching the graph if either node is not a member or a
    /// port is undeclared. On success the destination input is locked, the
    /// edge is forwarded and the destination's parameters are re-sent.
    pub fn add_edge(
        &mut self,
        src: &str,
        output: &str,
        dest: &str,
        input: &str,
    ) -> Result<EdgeId, GraphError> {
        let src_idx = self
            .node_index(src)
            .ok_or_else(|| GraphError::NodeNotInGraph {
                role: "Source",
                name: src.to_string(),
            })?;
        let dest_idx = self
            .node_index(dest)
            .ok_or_else(|| GraphError::NodeNotInGraph {
                role: "Destination",
                name: dest.to_string(),
            })?;

        let edge = Edge::new(
            self.fresh_edge_id(),
            &self.nodes[src_idx],
            output,
            &self.nodes[dest_idx],
            input,
        )?;
        let id = edge.name().clone();

        self.nodes[dest_idx].lock_param(input, true);
        self.edges.push(edge);
        if let Some(link) = self.link.as_mut() {
            link.add_edge(&self.edges[self.edges.len() - 1]);
            link.update_params(&self.nodes[dest_idx]);
        }
        self.emit(GraphChange::EdgeAdded(id.clone()));
        Ok(id)
    }

    /// Removes a node or edge on behalf of the local user.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        self.remove_with(id, Origin::Local)
    }

    /// Removes a node (with every incident edge) or a single edge.
    ///
    /// Removing an edge unlocks the destination input unless another edge
    /// still feeds it. Returns `false`, after logging, if nothing matched.
    pub fn remove_with(&mut self, id: &EntityId, origin: Origin) -> bool {
        match id {
            EntityId::Edge(edge) => match self.edges.iter().position(|e| e.name() == edge) {
                Some(idx) => {
                    self.remove_edge_at(idx, origin);
                    true
                }
                None => {
                    debug!(edge = %edge, "no such edge to remove");
                    false
                }
            },
            EntityId::Node(name) => match self.node_index(name) {
                Some(idx) => {
                    self.remove_node_at(idx, origin);
                    true
                }
                None => {
                    debug!(node = %name, "no such node to remove");
                    false
                }
            },
        }
    }

    fn remove_node_at(&mut self, idx: usize, origin: Origin) {
        if origin == Origin::Local {
            if let Some(link) = self.link.as_mut() {
                link.remove_node(&self.nodes[idx]);
            }
        }
        // Drop the node first so the cascade below sees it as gone.
        let node = self.nodes.remove(idx);

        let incident: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|edge| edge.touches(node.name()))
            .map(|edge| edge.name().clone())
            .collect();
        for edge in incident {
            if let Some(edge_idx) = self.edges.iter().position(|e| *e.name() == edge) {
                self.remove_edge_at(edge_idx, origin);
            }
        }

        self.emit(GraphChange::NodeRemoved(node.name().to_string()));
    }

    fn remove_edge_at(&mut self, idx: usize, origin: Origin) {
        let edge = self.edges.remove(idx);
        let still_fed = self
            .edges
            .iter()
            .any(|e| e.dest() == edge.dest() && e.input() == edge.input());

        let dest_idx = self.node_index(edge.dest());
        if let Some(dest_idx) = dest_idx {
            self.nodes[dest_idx].lock_param(edge.input(), still_fed);
        }

        if origin == Origin::Local {
            if let Some(link) = self.link.as_mut() {
                link.remove_edge(&edge);
                if let Some(dest_idx) = dest_idx {
                    link.update_params(&self.nodes[dest_idx]);
                }
            }
        }
        self.emit(GraphChange::EdgeRemoved(edge.name().clone()));
    }

    /// Exact-match lookup. Ambiguous matches are logged and yield nothing.
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        let mut matches = self.nodes.iter().filter(|node| node.name() == name);
        let first = matches.next();
        if first.is_none() {
            debug!(node = %name, "node not found");
            return None;
        }
        if matches.next().is_some() {
            warn!(node = %name, "more than one node carries this name");
            return None;
        }
        first
    }

    /// Exact-match lookup. Ambiguous matches are logged and yield nothing.
    pub fn find_edge(&self, name: &str) -> Option<&Edge> {
        let mut matches = self.edges.iter().filter(|edge| edge.name().as_str() == name);
        let first = matches.next();
        if first.is_none() {
            debug!(edge = %name, "edge not found");
            return None;
        }
        if matches.next().is_some() {
            warn!(edge = %name, "more than one edge carries this name");
            return None;
        }
        first
    }

    /// Suggests `<type-lowercased>:<n>` with the smallest `n` no node uses yet.
    pub fn new_name(&self, type_name: &str) -> String {
        let prefix = type_name.to_lowercase();
        let mut n: usize = 0;
        loop {
            let candidate = format!("{}:{}", prefix, n);
            if self.nodes.iter().all(|node| node.name() != candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Edges leaving (`Output`) or entering (`Input`) a node.
    pub fn node_edges(&self, node: &str, direction: Direction) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| match direction {
                Direction::Output => edge.src() == node,
                Direction::Input => edge.dest() == node,
            })
            .collect()
    }

    /// Applies a batch of local edits to one node, then tells the peer once.
    ///
    /// A changed parameter set produces one `update_params`; a single pressed
    /// button produces one `trigger_button`. Several buttons pressed in the
    /// same batch only produce a warning. Pressed flags are reset either way.
    pub fn edit_node<F>(&mut self, name: &str, edit: F) -> Result<EditOutcome, GraphError>
    where
        F: FnOnce(&mut ParamEdit<'_>) -> Result<(), GraphError>,
    {
        let idx = self
            .node_index(name)
            .ok_or_else(|| GraphError::NodeNotInGraph {
                role: "Edited",
                name: name.to_string(),
            })?;

        let mut batch = ParamEdit::new(&mut self.nodes[idx]);
        let result = edit(&mut batch);
        let outcome = batch.commit();
        self.forward_edit(idx, &outcome);
        result.map(|()| outcome)
    }

    /// Local edit of a single parameter.
    pub fn set_param(
        &mut self,
        node: &str,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<bool, GraphError> {
        let value = value.into();
        self.edit_node(node, |batch| batch.set(key, value).map(|_| ()))
            .map(|outcome| outcome.params_changed)
    }

    /// Presses a button of a node.
    pub fn trigger_button(&mut self, node: &str, callback: &str) -> Result<(), GraphError> {
        self.edit_node(node, |batch| batch.trigger(callback).map(|_| ()))
            .map(|_| ())
    }

    fn forward_edit(&mut self, idx: usize, outcome: &EditOutcome) {
        let node = &self.nodes[idx];
        if let TriggerOutcome::Many(fired) = &outcome.trigger {
            warn!(
                node = %node.name(),
                buttons = ?fired,
                "several buttons triggered at once, ignoring"
            );
        }
        let Some(link) = self.link.as_mut() else {
            return;
        };
        if outcome.params_changed {
            link.update_params(node);
        }
        if let TriggerOutcome::One(callback) = &outcome.trigger {
            link.trigger_button(node, callback);
        }
    }

    /// Decodes and applies one frame received from the peer.
    pub fn receive(&mut self, frame: &str) -> Result<(), LinkError> {
        let message = Inbound::decode(frame).inspect_err(|e| {
            warn!(error = %e, "dropping malformed frame");
        })?;
        self.apply_inbound(message);
        Ok(())
    }

    /// Applies a peer message. Nothing applied here is forwarded back.
    pub fn apply_inbound(&mut self, message: Inbound) {
        match message {
            Inbound::Definitions(defs) => {
                self.set_definitions(defs);
                if self.config.auto_demo {
                    if let Err(e) = demo::populate(self) {
                        warn!(error = %e, "could not build the demo graph");
                    }
                }
            }
            Inbound::ImageUpdate { name, image } => {
                let Some(idx) = self.node_index(&name) else {
                    warn!(node = %name, "image update for unknown node");
                    return;
                };
                if !self.nodes[idx].set_image(image) {
                    debug!(node = %name, "node has no image slot, ignoring image update");
                    return;
                }
                for observer in self.observers.iter_mut() {
                    observer.image_updated(&name);
                }
            }
            Inbound::ParamUpdate { name, params } => {
                self.apply_remote_params(&name, &params);
            }
            Inbound::InvalidEdge(name) => {
                let Some(edge) = EdgeId::parse(&name) else {
                    warn!(edge = %name, "invalid edge message does not name an edge, ignoring");
                    return;
                };
                warn!(edge = %edge, "peer rejected edge, removing it");
                self.remove_with(&EntityId::Edge(edge), Origin::Remote);
            }
            Inbound::Unknown(command) => {
                debug!(command = %command, "ignoring unmodelled command");
            }
        }
    }

    /// Overwrites parameters with peer values without notifying the peer.
    ///
    /// Returns `false` if the node is unknown.
    pub fn apply_remote_params(
        &mut self,
        name: &str,
        params: &BTreeMap<String, ParamValue>,
    ) -> bool {
        let Some(idx) = self.node_index(name) else {
            warn!(node = %name, "parameter update for unknown node");
            return false;
        };
        let applied = self.nodes[idx].apply_remote_params(params);
        debug!(node = %name, params = applied.len(), "applied remote parameters");
        for observer in self.observers.iter_mut() {
            observer.params_refresh(name);
        }
        true
    }

    /// Marks a node's image as redrawn.
    pub fn image_refreshed(&mut self, name: &str) {
        if let Some(idx) = self.node_index(name) {
            self.nodes[idx].mark_image_clean();
        }
    }

    /// Re-sends every node and edge to the peer, e.g. after a reconnect.
    ///
    /// Returns the number of commands actually sent.
    pub fn resync(&mut self) -> usize {
        let Some(link) = self.link.as_mut() else {
            return 0;
        };
        let before = link.stats().sent;
        for node in &self.nodes {
            link.add_node(node);
        }
        for edge in &self.edges {
            link.add_edge(edge);
        }
        link.stats().sent - before
    }

    pub(crate) fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name() == name)
    }

    pub(crate) fn node_at_mut(&mut self, idx: usize) -> &mut Node {
        &mut self.nodes[idx]
    }

    fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = EdgeId::generate();
            if self.edges.iter().all(|edge| *edge.name() != id) {
                return id;
            }
        }
    }

    fn emit(&mut self, change: GraphChange) {
        for observer in self.observers.iter_mut() {
            observer.graph_changed(&change);
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("link", &self.link)
            .finish()
    }
}
