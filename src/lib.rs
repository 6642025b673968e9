//! # Boxflow - Node-Graph Editor Core
//!
//! **Boxflow** is the model and synchronization core of a visual node-graph
//! editor. Users place typed node boxes with named ports, wire outputs to
//! inputs and edit per-node parameters; the resulting graph is mirrored to a
//! remote process that executes it. Canvas drawing, input handling and the
//! parameter panel are left to a UI layer, which consumes the geometry queries
//! and change events exposed here.
//!
//! ## Core Workflow
//!
//! 1.  **Load a catalog**: the peer pushes its node types as a `definitions`
//!     message, parsed into [`definitions::Definitions`].
//! 2.  **Build a graph**: [`graph::Graph::builder`] wires the catalog, an
//!     [`config::EditorConfig`], a [`link::SyncLink`] and any observers together.
//! 3.  **Edit**: every local mutation goes through the graph, which keeps the
//!     port-lock invariant and forwards exactly one command per change.
//! 4.  **Receive**: frames from the peer go to [`graph::Graph::receive`]. They
//!     are applied without being echoed back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boxflow::prelude::*;
//!
//! # fn run() -> Result<()> {
//! let channel = MemoryChannel::open();
//! let mut graph = Graph::builder(boxflow::demo::sample_definitions())
//!     .with_link(SyncLink::new(channel.clone()))
//!     .build();
//!
//! let disk = graph.create_node("Disk", None, NodeOptions::at(200.0, 0.0))?;
//! let gain = graph.create_node("Magnitude", None, NodeOptions::default())?;
//! graph.add_edge(&gain, "", &disk, "x")?;
//! graph.set_param(&disk, "size", 0.5)?;
//!
//! for frame in channel.take() {
//!     println!("{}", frame);
//! }
//!
//! // A peer refusing the edge removes it locally without echoing back.
//! let edge = graph.edges()[0].name().clone();
//! graph.receive(&Inbound::InvalidEdge(edge.to_string()).encode()?)?;
//! assert!(graph.edges().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definitions;
pub mod demo;
pub mod error;
pub mod graph;
pub mod link;
pub mod mirror;
pub mod node;
pub mod prelude;
pub mod render;
pub mod snapshot;
