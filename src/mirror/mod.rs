//! Peer-side mirror of the editor graph.
//!
//! [`Mirror`] is what the remote process keeps: boxes with their parameters
//! and the links between them, driven by the editor's command frames. It
//! checks proposed links against its own catalog and answers refused ones with
//! an `invalid_edge` message. What the boxes compute is out of its scope.

use crate::definitions::{Definitions, ParamValue};
use crate::error::LinkError;
use crate::link::{Command, Inbound};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One instantiated box on the peer.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorBox {
    pub name: String,
    pub type_name: String,
    pub params: BTreeMap<String, ParamValue>,
}

/// A connection as the peer records it: no identity beyond its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorLink {
    pub src: String,
    pub output: String,
    pub dest: String,
    pub input: String,
}

#[derive(Debug, Clone, Default)]
pub struct Mirror {
    defs: Definitions,
    boxes: Vec<MirrorBox>,
    links: Vec<MirrorLink>,
}

impl Mirror {
    pub fn new(defs: Definitions) -> Self {
        Self {
            defs,
            boxes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    /// The frame announcing this mirror's catalog to a freshly connected editor.
    pub fn definitions_frame(&self) -> Result<String, LinkError> {
        Inbound::Definitions(self.defs.clone()).encode()
    }

    pub fn boxes(&self) -> &[MirrorBox] {
        &self.boxes
    }

    pub fn links(&self) -> &[MirrorLink] {
        &self.links
    }

    pub fn find_box(&self, name: &str) -> Option<&MirrorBox> {
        self.boxes.iter().find(|b| b.name == name)
    }

    /// Decodes and applies one editor frame, returning the encoded replies.
    pub fn dispatch(&mut self, frame: &str) -> Result<Vec<String>, LinkError> {
        match Command::decode(frame)? {
            Some(command) => self.apply(command).iter().map(Inbound::encode).collect(),
            None => {
                debug!("ignoring unknown command frame");
                Ok(Vec::new())
            }
        }
    }

    /// Applies one editor command, returning the messages to send back.
    pub fn apply(&mut self, command: Command) -> Vec<Inbound> {
        match command {
            Command::AddNode {
                type_name,
                name,
                params,
            } => {
                self.add_box(type_name, name, params);
                Vec::new()
            }
            Command::RemoveNode { name } => {
                match self.boxes.iter().position(|b| b.name == name) {
                    Some(idx) => {
                        self.boxes.remove(idx);
                    }
                    None => warn!(node = %name, "remove for unknown box"),
                }
                Vec::new()
            }
            Command::AddEdge {
                name,
                src,
                output,
                dest,
                input,
            } => {
                let link = MirrorLink {
                    src,
                    output,
                    dest,
                    input,
                };
                if self.allowed_link(&link) {
                    self.links.push(link);
                    Vec::new()
                } else {
                    warn!(edge = %name, "proposed link is invalid");
                    vec![Inbound::InvalidEdge(name)]
                }
            }
            Command::RemoveEdge {
                src,
                output,
                dest,
                input,
            } => {
                self.remove_link(&MirrorLink {
                    src,
                    output,
                    dest,
                    input,
                });
                Vec::new()
            }
            Command::UpdateParams { name, params } => {
                match self.boxes.iter_mut().find(|b| b.name == name) {
                    Some(target) => target.params.extend(params),
                    None => warn!(node = %name, "parameter update for unknown box"),
                }
                Vec::new()
            }
            Command::TriggerButton { name, button } => self.trigger(&name, &button),
        }
    }

    /// Whether a proposed link connects existing boxes through declared ports.
    pub fn allowed_link(&self, link: &MirrorLink) -> bool {
        let (Some(src), Some(dest)) = (self.find_box(&link.src), self.find_box(&link.dest))
        else {
            return false;
        };
        let output_ok = self
            .defs
            .output_names(&src.type_name)
            .map(|names| names.contains(&link.output))
            .unwrap_or(false);
        let input_ok = self
            .defs
            .input_names(&dest.type_name)
            .map(|names| names.contains(&link.input))
            .unwrap_or(false);
        output_ok && input_ok
    }

    fn add_box(&mut self, type_name: String, name: String, params: BTreeMap<String, ParamValue>) {
        let Ok(mut defaults) = self.defs.default_values(&type_name) else {
            warn!(node = %name, type_name = %type_name, "add for undefined type");
            return;
        };
        defaults.extend(params);
        self.boxes.push(MirrorBox {
            name,
            type_name,
            params: defaults,
        });
    }

    /// Drops a link and resets the destination input to its default value.
    fn remove_link(&mut self, link: &MirrorLink) {
        let Some(idx) = self.links.iter().position(|l| l == link) else {
            warn!(dest = %link.dest, input = %link.input, "remove for unknown link");
            return;
        };
        self.links.remove(idx);

        let Some(dest) = self.boxes.iter_mut().find(|b| b.name == link.dest) else {
            warn!(node = %link.dest, "could not find destination box of removed link");
            return;
        };
        let default = self
            .defs
            .default_values(&dest.type_name)
            .ok()
            .and_then(|mut values| values.remove(&link.input));
        if let Some(value) = default {
            dest.params.insert(link.input.clone(), value);
        }
    }

    /// Runs a button and reports the box's parameters back, since the
    /// callback may have changed them.
    fn trigger(&self, name: &str, button: &str) -> Vec<Inbound> {
        let Some(target) = self.find_box(name) else {
            warn!(node = %name, "trigger for unknown box");
            return Vec::new();
        };
        let registered = self
            .defs
            .buttons(&target.type_name)
            .map(|buttons| buttons.iter().any(|b| b.callback == button))
            .unwrap_or(false);
        if !registered {
            warn!(node = %name, button = %button, "could not find button");
            return Vec::new();
        }
        vec![Inbound::ParamUpdate {
            name: name.to_string(),
            params: target.params.clone(),
        }]
    }
}
