use crate::error::DefinitionError;
use std::fmt;
use std::str::FromStr;

/// The node variant a type is instantiated as.
///
/// Every variant has exactly one visual counterpart, see [`BoxKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Plain box with ports only.
    Base,
    /// Box with a title and per-port labels.
    #[default]
    Labelled,
    /// Labelled box with an image slot fed by the peer.
    Image,
    /// Square image viewer with a single centred input.
    Viewport,
}

/// The visual box variant used to render a [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxKind {
    NodeBox,
    LabelledBox,
    ImageBox,
    ViewportBox,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Base,
        NodeKind::Labelled,
        NodeKind::Image,
        NodeKind::Viewport,
    ];

    /// Wire name used in the `nodetype` field of a definitions entry.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Base => "Node",
            NodeKind::Labelled => "LabelledNode",
            NodeKind::Image => "ImageNode",
            NodeKind::Viewport => "Viewport",
        }
    }

    pub fn box_kind(self) -> BoxKind {
        match self {
            NodeKind::Base => BoxKind::NodeBox,
            NodeKind::Labelled => BoxKind::LabelledBox,
            NodeKind::Image => BoxKind::ImageBox,
            NodeKind::Viewport => BoxKind::ViewportBox,
        }
    }

    pub fn has_title(self) -> bool {
        matches!(self, NodeKind::Labelled | NodeKind::Image)
    }

    pub fn has_image(self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::Viewport)
    }
}

impl BoxKind {
    pub fn node_kind(self) -> NodeKind {
        match self {
            BoxKind::NodeBox => NodeKind::Base,
            BoxKind::LabelledBox => NodeKind::Labelled,
            BoxKind::ImageBox => NodeKind::Image,
            BoxKind::ViewportBox => NodeKind::Viewport,
        }
    }
}

impl FromStr for NodeKind {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Node" | "BaseNode" => Ok(NodeKind::Base),
            "LabelledNode" => Ok(NodeKind::Labelled),
            "ImageNode" => Ok(NodeKind::Image),
            "Viewport" => Ok(NodeKind::Viewport),
            other => Err(DefinitionError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
