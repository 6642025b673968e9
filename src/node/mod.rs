//! Node instances: parameters, port locks and layout metadata.

mod geometry;
mod params;

pub use geometry::*;
pub use params::*;

use crate::config::GeometryConfig;
use crate::definitions::{Definitions, NodeKind, ParamValue, PortMode};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which side of a node a port or edge sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Image state of node variants that display a peer-rendered picture.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    /// Encoded image as received from the peer (typically a data URL).
    pub payload: Option<String>,
    /// Set when the payload changed and the visual has not been refreshed.
    pub dirty: bool,
    pub width: f64,
    pub height: f64,
    pub xres: f64,
    pub yres: f64,
    pub stroke_width: f64,
}

impl ImageSlot {
    pub fn for_kind(kind: NodeKind) -> Option<Self> {
        let side = match kind {
            NodeKind::Image => 80.0,
            NodeKind::Viewport => 100.0,
            NodeKind::Base | NodeKind::Labelled => return None,
        };
        Some(Self {
            payload: None,
            dirty: false,
            width: side,
            height: side,
            xres: 256.0,
            yres: 256.0,
            stroke_width: 5.0,
        })
    }

    pub fn scale_x(&self) -> f64 {
        self.width / self.xres
    }

    pub fn scale_y(&self) -> f64 {
        self.height / self.yres
    }
}

/// Everything needed to construct a [`Node`] directly.
///
/// Most callers go through [`Node::from_definitions`] instead, which fills this
/// in from the catalog.
#[derive(Debug, Clone, Default)]
pub struct NodeTemplate {
    pub name: String,
    pub type_name: String,
    pub kind: NodeKind,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub params: BTreeMap<String, ParamValue>,
    pub labels: BTreeMap<String, String>,
    pub buttons: BTreeMap<String, bool>,
    pub param_modes: BTreeMap<String, PortMode>,
    pub geom: Geometry,
}

/// Per-instance overrides applied on top of the catalog defaults.
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    pub pos: Option<(f64, f64)>,
    pub width: Option<f64>,
    /// Initial values overriding the type's defaults.
    pub params: BTreeMap<String, ParamValue>,
}

impl NodeOptions {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            pos: Some((left, top)),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// An instance of a declared node type.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    type_name: String,
    kind: NodeKind,
    inputs: Vec<String>,
    outputs: Vec<String>,
    params: BTreeMap<String, ParamValue>,
    labels: BTreeMap<String, String>,
    buttons: BTreeMap<String, bool>,
    param_modes: BTreeMap<String, PortMode>,
    locked_params: BTreeMap<String, bool>,
    pub geom: Geometry,
    header_heights: BTreeMap<String, f64>,
    image: Option<ImageSlot>,
}

impl Node {
    /// Builds a node, rejecting one that declares no ports at all.
    pub fn new(template: NodeTemplate) -> Result<Self, GraphError> {
        if template.inputs.is_empty() && template.outputs.is_empty() {
            return Err(GraphError::NoPorts(template.name));
        }

        let mut locked_params: BTreeMap<String, bool> = template
            .inputs
            .iter()
            .map(|input| (input.clone(), false))
            .collect();
        for key in template.params.keys() {
            locked_params.entry(key.clone()).or_insert(false);
        }

        Ok(Self {
            image: ImageSlot::for_kind(template.kind),
            name: template.name,
            type_name: template.type_name,
            kind: template.kind,
            inputs: template.inputs,
            outputs: template.outputs,
            params: template.params,
            labels: template.labels,
            buttons: template.buttons,
            param_modes: template.param_modes,
            locked_params,
            geom: template.geom,
            header_heights: BTreeMap::new(),
        })
    }

    /// Instantiates `type_name` from the catalog, the way the editor's
    /// add-node action does.
    pub fn from_definitions(
        defs: &Definitions,
        type_name: &str,
        name: &str,
        options: NodeOptions,
        geometry: &GeometryConfig,
    ) -> Result<Self, GraphError> {
        let mut params = defs.default_values(type_name)?;
        for (key, value) in options.params {
            if !params.contains_key(&key) {
                return Err(GraphError::UnknownParam {
                    node: name.to_string(),
                    param: key,
                });
            }
            params.insert(key, value);
        }

        let mut labels = defs.default_labels(type_name)?;
        for button in defs.buttons(type_name)? {
            labels.insert(button.callback.clone(), button.label.clone());
        }

        let mut geom = Geometry::from_config(geometry);
        if let Some((left, top)) = options.pos {
            geom.left = left;
            geom.top = top;
        }
        if let Some(width) = options.width {
            geom.width = width;
        }

        Self::new(NodeTemplate {
            name: name.to_string(),
            type_name: type_name.to_string(),
            kind: defs.nodetype(type_name)?,
            inputs: defs.input_names(type_name)?,
            outputs: defs.output_names(type_name)?,
            params,
            labels,
            buttons: defs.default_buttons(type_name)?,
            param_modes: defs.default_modes(type_name)?,
            geom,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.iter().any(|p| p == port)
    }

    pub fn has_output(&self, port: &str) -> bool {
        self.outputs.iter().any(|p| p == port)
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Display label of a port or button, falling back to its name.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.labels.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn buttons(&self) -> &BTreeMap<String, bool> {
        &self.buttons
    }

    pub fn param_modes(&self) -> &BTreeMap<String, PortMode> {
        &self.param_modes
    }

    /// Mode of a port; ports without a recorded mode are `Normal`.
    pub fn mode(&self, port: &str) -> PortMode {
        self.param_modes.get(port).copied().unwrap_or_default()
    }

    pub fn locked_params(&self) -> &BTreeMap<String, bool> {
        &self.locked_params
    }

    pub fn image(&self) -> Option<&ImageSlot> {
        self.image.as_ref()
    }

    /// Stores a peer-rendered image and flags the visual for refresh.
    ///
    /// Returns `false` when this node variant has no image slot.
    pub(crate) fn set_image(&mut self, payload: Option<String>) -> bool {
        match self.image.as_mut() {
            Some(slot) => {
                slot.payload = payload;
                slot.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Clears the refresh flag once the UI has redrawn the image.
    pub(crate) fn mark_image_clean(&mut self) {
        if let Some(slot) = self.image.as_mut() {
            slot.dirty = false;
        }
    }
}
