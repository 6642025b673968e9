use crate::error::LinkError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Lifecycle of a duplex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Created but not yet open.
    #[default]
    Connecting,
    Open,
    /// Closed by either side. Terminal.
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Open => write!(f, "open"),
            ChannelState::Closed => write!(f, "closed"),
        }
    }
}

/// A message-oriented duplex connection to the peer, outbound half.
///
/// Implementations wrap whatever transport frames the text messages (a
/// websocket in the browser editor). Inbound frames are delivered by the
/// transport's own callback into [`Graph::receive`](crate::graph::Graph::receive).
pub trait Channel {
    fn state(&self) -> ChannelState;

    /// Sends one text frame. Only called while the state is `Open`.
    fn send(&mut self, frame: String) -> Result<(), LinkError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: ChannelState,
    sent: Vec<String>,
}

/// In-process channel that keeps every sent frame.
///
/// Clones share state, so a test or a loopback driver can keep a handle while
/// the graph owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryChannel {
    pub fn new(state: ChannelState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                state,
                sent: Vec::new(),
            })),
        }
    }

    pub fn open() -> Self {
        Self::new(ChannelState::Open)
    }

    pub fn set_state(&self, state: ChannelState) {
        self.inner.borrow_mut().state = state;
    }

    pub fn close(&self) {
        self.set_state(ChannelState::Closed);
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }

    /// Drains the frames sent so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().sent)
    }
}

impl Channel for MemoryChannel {
    fn state(&self) -> ChannelState {
        self.inner.borrow().state
    }

    fn send(&mut self, frame: String) -> Result<(), LinkError> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            ChannelState::Open => {
                inner.sent.push(frame);
                Ok(())
            }
            ChannelState::Connecting => Err(LinkError::NotReady),
            ChannelState::Closed => Err(LinkError::Closed),
        }
    }
}
