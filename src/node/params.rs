use super::Node;
use crate::definitions::{ParamValue, PortMode};
use crate::error::GraphError;
use std::collections::BTreeMap;
use tracing::warn;

/// What the triggered button flags amounted to when a batch was committed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TriggerOutcome {
    #[default]
    None,
    One(String),
    /// More than one button fired at once. Nothing is forwarded for this.
    Many(Vec<String>),
}

/// The notifications a committed batch of local edits owes the peer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOutcome {
    pub params_changed: bool,
    pub trigger: TriggerOutcome,
}

impl Node {
    pub(crate) fn lock_param(&mut self, port: &str, locked: bool) {
        self.locked_params.insert(port.to_string(), locked);
    }

    pub fn is_locked(&self, port: &str) -> bool {
        self.locked_params.get(port).copied().unwrap_or(false)
    }

    /// Parameter keys that are neither locked nor untyped.
    ///
    /// Without mode information there is nothing to show, so an empty `modes`
    /// map yields an empty list.
    pub fn unlocked_params(&self, modes: &BTreeMap<String, PortMode>) -> Vec<String> {
        if modes.is_empty() {
            return Vec::new();
        }
        self.params
            .keys()
            .filter(|key| modes.get(*key) != Some(&PortMode::Untyped))
            .filter(|key| !self.is_locked(key))
            .cloned()
            .collect()
    }

    /// Parameters the editing panel should show, using the node's own modes.
    pub fn editable_params(&self) -> Vec<String> {
        self.unlocked_params(&self.param_modes)
    }

    /// Local edit of one parameter. Returns whether the value changed.
    pub(crate) fn set_param(&mut self, key: &str, value: ParamValue) -> Result<bool, GraphError> {
        let Some(current) = self.params.get_mut(key) else {
            return Err(GraphError::UnknownParam {
                node: self.name.clone(),
                param: key.to_string(),
            });
        };
        if self.locked_params.get(key).copied().unwrap_or(false) {
            return Err(GraphError::LockedParam {
                node: self.name.clone(),
                param: key.to_string(),
            });
        }
        if *current == value {
            return Ok(false);
        }
        *current = value;
        Ok(true)
    }

    /// Overwrites parameters with values that came from the peer.
    ///
    /// There is no change report here: remote-origin values must never be
    /// forwarded back. Keys the node does not declare are skipped. Returns the
    /// keys that were applied.
    pub(crate) fn apply_remote_params(
        &mut self,
        params: &BTreeMap<String, ParamValue>,
    ) -> Vec<String> {
        let mut applied = Vec::with_capacity(params.len());
        for (key, value) in params {
            match self.params.get_mut(key) {
                Some(slot) => {
                    *slot = value.clone();
                    applied.push(key.clone());
                }
                None => warn!(
                    node = %self.name,
                    param = %key,
                    "ignoring update for undeclared parameter"
                ),
            }
        }
        applied
    }

    pub(crate) fn trigger(&mut self, callback: &str) -> Result<(), GraphError> {
        match self.buttons.get_mut(callback) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(GraphError::UnknownButton {
                node: self.name.clone(),
                callback: callback.to_string(),
            }),
        }
    }

    /// Collects and resets every triggered button flag.
    pub(crate) fn take_triggered(&mut self) -> TriggerOutcome {
        let mut fired: Vec<String> = Vec::new();
        for (callback, flag) in self.buttons.iter_mut() {
            if *flag {
                fired.push(callback.clone());
                *flag = false;
            }
        }
        match fired.len() {
            0 => TriggerOutcome::None,
            1 => TriggerOutcome::One(fired.remove(0)),
            _ => TriggerOutcome::Many(fired),
        }
    }
}

/// A batch of local edits to one node, committed as a single change.
///
/// Obtained from [`Graph::edit_node`](crate::graph::Graph::edit_node); the peer is
/// told about the batch once it has been committed, not per field.
pub struct ParamEdit<'a> {
    node: &'a mut Node,
    params_changed: bool,
}

impl<'a> ParamEdit<'a> {
    pub(crate) fn new(node: &'a mut Node) -> Self {
        Self {
            node,
            params_changed: false,
        }
    }

    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<&mut Self, GraphError> {
        if self.node.set_param(key, value.into())? {
            self.params_changed = true;
        }
        Ok(self)
    }

    /// Marks a button as pressed.
    pub fn trigger(&mut self, callback: &str) -> Result<&mut Self, GraphError> {
        self.node.trigger(callback)?;
        Ok(self)
    }

    pub(crate) fn commit(self) -> EditOutcome {
        EditOutcome {
            params_changed: self.params_changed,
            trigger: self.node.take_triggered(),
        }
    }
}
