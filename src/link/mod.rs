//! The synchronization link between the local graph and the remote peer.
//!
//! Outbound, [`SyncLink`] turns graph mutations into [`Command`] frames. Inbound
//! frames are decoded into [`Inbound`] messages and applied by
//! [`Graph::receive`](crate::graph::Graph::receive) through the graph's
//! remote-origin entry points, which never notify the link again.
//!
//! Sends attempted while the channel is not open are dropped and logged, not
//! queued. The peer is expected to ask for a full re-sync after reconnecting.

mod channel;
mod codec;

pub use channel::*;
pub use codec::*;

use crate::graph::Edge;
use crate::node::Node;
use tracing::{debug, info, warn};

/// Counters of what the link did with outbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    pub sent: usize,
    pub dropped: usize,
}

/// Outbound half of the duplex link to the peer.
pub struct SyncLink {
    channel: Box<dyn Channel>,
    last_state: ChannelState,
    stats: LinkStats,
}

impl SyncLink {
    pub fn new(channel: impl Channel + 'static) -> Self {
        let last_state = channel.state();
        Self {
            channel: Box::new(channel),
            last_state,
            stats: LinkStats::default(),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ChannelState::Open
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Logs channel open/close transitions. Returns the current state.
    pub fn poll_state(&mut self) -> ChannelState {
        let state = self.channel.state();
        if state != self.last_state {
            match state {
                ChannelState::Open => info!("socket opened"),
                ChannelState::Closed => info!("socket closed"),
                ChannelState::Connecting => info!("socket reconnecting"),
            }
            self.last_state = state;
        }
        state
    }

    /// Sends one command. Returns `false` if it was dropped.
    pub fn send(&mut self, command: &Command) -> bool {
        if self.poll_state() != ChannelState::Open {
            debug!(command = command.tag(), "socket not ready, dropping command");
            self.stats.dropped += 1;
            return false;
        }
        let frame = match command.encode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(command = command.tag(), error = %e, "could not encode command");
                self.stats.dropped += 1;
                return false;
            }
        };
        match self.channel.send(frame) {
            Ok(()) => {
                debug!(command = command.tag(), "sent");
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                warn!(command = command.tag(), error = %e, "send failed, dropping command");
                self.stats.dropped += 1;
                false
            }
        }
    }

    pub fn add_node(&mut self, node: &Node) -> bool {
        self.send(&Command::AddNode {
            type_name: node.type_name().to_string(),
            name: node.name().to_string(),
            params: node.params().clone(),
        })
    }

    pub fn remove_node(&mut self, node: &Node) -> bool {
        self.send(&Command::RemoveNode {
            name: node.name().to_string(),
        })
    }

    pub fn add_edge(&mut self, edge: &Edge) -> bool {
        self.send(&Command::AddEdge {
            name: edge.name().to_string(),
            src: edge.src().to_string(),
            output: edge.output().to_string(),
            dest: edge.dest().to_string(),
            input: edge.input().to_string(),
        })
    }

    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        self.send(&Command::RemoveEdge {
            src: edge.src().to_string(),
            output: edge.output().to_string(),
            dest: edge.dest().to_string(),
            input: edge.input().to_string(),
        })
    }

    /// Sends the node's complete current parameter snapshot.
    pub fn update_params(&mut self, node: &Node) -> bool {
        self.send(&Command::UpdateParams {
            name: node.name().to_string(),
            params: node.params().clone(),
        })
    }

    pub fn trigger_button(&mut self, node: &Node, button: &str) -> bool {
        self.send(&Command::TriggerButton {
            name: node.name().to_string(),
            button: button.to_string(),
        })
    }
}

impl std::fmt::Debug for SyncLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncLink")
            .field("state", &self.channel.state())
            .field("stats", &self.stats)
            .finish()
    }
}
