use super::EdgeId;
use crate::definitions::Definitions;
use std::cell::RefCell;
use std::rc::Rc;

/// A structural change to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphChange {
    NodeAdded(String),
    NodeRemoved(String),
    EdgeAdded(EdgeId),
    EdgeRemoved(EdgeId),
}

/// Callbacks the UI layer receives from the core. All methods default to no-ops.
pub trait GraphObserver {
    fn graph_changed(&mut self, _change: &GraphChange) {}

    /// Displayed parameter values of `node` are stale.
    fn params_refresh(&mut self, _node: &str) {}

    /// The image of `node` changed and its visual needs a redraw.
    fn image_updated(&mut self, _node: &str) {}

    /// The catalog was replaced; menus built from it must be rebuilt.
    fn definitions_loaded(&mut self, _defs: &Definitions) {}
}

/// One observed callback, as captured by [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    Changed(GraphChange),
    ParamsRefresh(String),
    ImageUpdated(String),
    DefinitionsLoaded(usize),
}

/// Observer that records every callback into a shared log.
///
/// Clones share the same log, so one clone can be handed to the graph while
/// another is kept to inspect what happened.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<GraphEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl GraphObserver for Recorder {
    fn graph_changed(&mut self, change: &GraphChange) {
        self.events
            .borrow_mut()
            .push(GraphEvent::Changed(change.clone()));
    }

    fn params_refresh(&mut self, node: &str) {
        self.events
            .borrow_mut()
            .push(GraphEvent::ParamsRefresh(node.to_string()));
    }

    fn image_updated(&mut self, node: &str) {
        self.events
            .borrow_mut()
            .push(GraphEvent::ImageUpdated(node.to_string()));
    }

    fn definitions_loaded(&mut self, defs: &Definitions) {
        self.events
            .borrow_mut()
            .push(GraphEvent::DefinitionsLoaded(defs.len()));
    }
}
