//! Prelude module for convenient imports
//!
//! Re-exports the types most editor integrations need, so a single
//! `use boxflow::prelude::*;` is enough to build and drive a graph.

// Catalog
pub use crate::definitions::{
    BoxKind, ButtonSpec, Definitions, Limits, NodeKind, ParamValue, PortMode, PortSpec,
};

// Graph model
pub use crate::graph::{
    Edge, EdgeId, EntityId, Graph, GraphBuilder, GraphChange, GraphObserver, Origin,
};
pub use crate::node::{Direction, EditOutcome, Node, NodeOptions, ParamEdit};

// Synchronization
pub use crate::link::{Channel, ChannelState, Command, Inbound, MemoryChannel, SyncLink};
pub use crate::mirror::Mirror;

// Configuration and persistence
pub use crate::config::EditorConfig;
pub use crate::snapshot::GraphSnapshot;

// Rendering
pub use crate::render::{Shape, Surface};

// Error types
pub use crate::error::{DefinitionError, GraphError, LinkError, SnapshotError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
