use crate::definitions::{Definitions, ParamValue};
use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The envelope of every frame on the wire: a tag and a tag-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub command: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn decode(text: &str) -> Result<Self, LinkError> {
        serde_json::from_str(text).map_err(|e| LinkError::Decode(e.to_string()))
    }
}

/// Commands the editor sends to the peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum Command {
    AddNode {
        #[serde(rename = "type")]
        type_name: String,
        name: String,
        params: BTreeMap<String, ParamValue>,
    },
    RemoveNode {
        name: String,
    },
    AddEdge {
        name: String,
        src: String,
        output: String,
        dest: String,
        input: String,
    },
    RemoveEdge {
        src: String,
        output: String,
        dest: String,
        input: String,
    },
    UpdateParams {
        name: String,
        params: BTreeMap<String, ParamValue>,
    },
    TriggerButton {
        name: String,
        button: String,
    },
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::AddNode { .. } => "add_node",
            Command::RemoveNode { .. } => "remove_node",
            Command::AddEdge { .. } => "add_edge",
            Command::RemoveEdge { .. } => "remove_edge",
            Command::UpdateParams { .. } => "update_params",
            Command::TriggerButton { .. } => "trigger_button",
        }
    }

    pub fn encode(&self) -> Result<String, LinkError> {
        serde_json::to_string(self).map_err(|e| LinkError::Encode(e.to_string()))
    }

    /// Decodes a frame, yielding `None` for a well-formed frame whose tag is
    /// not an editor command.
    pub fn decode(text: &str) -> Result<Option<Self>, LinkError> {
        let frame = Frame::decode(text)?;
        if !Self::is_known(&frame.command) {
            return Ok(None);
        }
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| LinkError::Decode(format!("{}: {}", frame.command, e)))
    }

    fn is_known(tag: &str) -> bool {
        matches!(
            tag,
            "add_node"
                | "remove_node"
                | "add_edge"
                | "remove_edge"
                | "update_params"
                | "trigger_button"
        )
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct ImageData {
    name: String,
    #[serde(default)]
    b64: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParamData {
    name: String,
    #[serde(default)]
    params: BTreeMap<String, ParamValue>,
}

/// Messages the peer sends to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Replace the whole catalog.
    Definitions(Definitions),
    ImageUpdate {
        name: String,
        image: Option<String>,
    },
    ParamUpdate {
        name: String,
        params: BTreeMap<String, ParamValue>,
    },
    /// The peer refused the named edge.
    InvalidEdge(String),
    /// Any tag this editor does not model.
    Unknown(String),
}

impl Inbound {
    pub fn decode(text: &str) -> Result<Self, LinkError> {
        let Frame { command, data } = Frame::decode(text)?;
        let payload_error = |e: serde_json::Error| LinkError::Decode(format!("{}: {}", command, e));
        match command.as_str() {
            "definitions" => Definitions::from_value(data)
                .map(Inbound::Definitions)
                .map_err(|e| LinkError::Decode(format!("{}: {}", command, e))),
            "image_update" => {
                let ImageData { name, b64 } = serde_json::from_value(data).map_err(payload_error)?;
                Ok(Inbound::ImageUpdate { name, image: b64 })
            }
            "param_update" => {
                let ParamData { name, params } =
                    serde_json::from_value(data).map_err(payload_error)?;
                Ok(Inbound::ParamUpdate { name, params })
            }
            "invalid_edge" => serde_json::from_value(data)
                .map(Inbound::InvalidEdge)
                .map_err(payload_error),
            other => Ok(Inbound::Unknown(other.to_string())),
        }
    }

    pub fn encode(&self) -> Result<String, LinkError> {
        let (command, data) = match self {
            Inbound::Definitions(defs) => ("definitions", defs.to_value()),
            Inbound::ImageUpdate { name, image } => (
                "image_update",
                serde_json::to_value(ImageData {
                    name: name.clone(),
                    b64: image.clone(),
                })
                .map_err(|e| LinkError::Encode(e.to_string()))?,
            ),
            Inbound::ParamUpdate { name, params } => (
                "param_update",
                serde_json::to_value(ParamData {
                    name: name.clone(),
                    params: params.clone(),
                })
                .map_err(|e| LinkError::Encode(e.to_string()))?,
            ),
            Inbound::InvalidEdge(name) => ("invalid_edge", Value::String(name.clone())),
            Inbound::Unknown(command) => (command.as_str(), Value::Null),
        };
        serde_json::to_string(&Frame {
            command: command.to_string(),
            data,
        })
        .map_err(|e| LinkError::Encode(e.to_string()))
    }
}
