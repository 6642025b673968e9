//! The catalog of node types.
//!
//! A [`Definitions`] registry maps a type name to its declared input and output
//! ports, its buttons, the node variant it is instantiated as and the group it
//! is listed under. The catalog is normally pushed by the peer in a
//! `definitions` message and can be extended or replaced while a session runs.

mod port;
mod variant;

pub use port::*;
pub use variant::*;

use crate::error::DefinitionError;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn default_variant() -> String {
    NodeKind::default().as_str().to_string()
}

fn default_group() -> String {
    "default".to_string()
}

/// Everything the catalog knows about one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default)]
    pub inputs: Vec<PortSpec>,
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
    #[serde(default)]
    pub buttons: Vec<ButtonSpec>,
    /// Wire name of the node variant, resolved through [`Definitions::nodetype`].
    #[serde(rename = "nodetype", default = "default_variant")]
    pub variant: String,
    #[serde(default = "default_group")]
    pub group: String,
}

/// Registry of node types, keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Definitions {
    definitions: AHashMap<String, TypeDefinition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog in the wire format pushed by the peer.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(json).map_err(|e| DefinitionError::Json(e.to_string()))
    }

    /// Parses a catalog from an already decoded `data` payload.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        serde_json::from_value(value).map_err(|e| DefinitionError::Json(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        // A map of plain serde structs cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Registers or overwrites a type. Last write wins.
    pub fn define(
        &mut self,
        type_name: &str,
        inputs: Vec<PortSpec>,
        outputs: Vec<PortSpec>,
        variant: NodeKind,
        group: &str,
    ) {
        self.insert(
            type_name,
            TypeDefinition {
                inputs,
                outputs,
                buttons: Vec::new(),
                variant: variant.as_str().to_string(),
                group: group.to_string(),
            },
        );
    }

    /// Registers or overwrites a type from a complete definition.
    pub fn insert(&mut self, type_name: &str, definition: TypeDefinition) {
        self.definitions.insert(type_name.to_string(), definition);
    }

    pub fn get(&self, type_name: &str) -> Result<&TypeDefinition, DefinitionError> {
        self.definitions
            .get(type_name)
            .ok_or_else(|| DefinitionError::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Projects one descriptor field across the editable inputs of a type.
    ///
    /// Inputs of mode [`PortMode::Untyped`] are skipped.
    pub fn default_params(
        &self,
        type_name: &str,
        field: PortField,
    ) -> Result<BTreeMap<String, Value>, DefinitionError> {
        Ok(self
            .editable_inputs(type_name)?
            .map(|spec| (spec.name.clone(), spec.field(field)))
            .collect())
    }

    /// Default parameter values of a type.
    pub fn default_values(
        &self,
        type_name: &str,
    ) -> Result<BTreeMap<String, ParamValue>, DefinitionError> {
        self.default_params(type_name, PortField::Value)
    }

    pub fn default_modes(
        &self,
        type_name: &str,
    ) -> Result<BTreeMap<String, PortMode>, DefinitionError> {
        Ok(self
            .editable_inputs(type_name)?
            .map(|spec| (spec.name.clone(), spec.mode))
            .collect())
    }

    pub fn default_labels(
        &self,
        type_name: &str,
    ) -> Result<BTreeMap<String, String>, DefinitionError> {
        Ok(self
            .editable_inputs(type_name)?
            .map(|spec| (spec.name.clone(), spec.label().to_string()))
            .collect())
    }

    /// Modes of every declared input, untyped ones included.
    pub fn input_modes(
        &self,
        type_name: &str,
    ) -> Result<BTreeMap<String, PortMode>, DefinitionError> {
        Ok(self
            .get(type_name)?
            .inputs
            .iter()
            .map(|spec| (spec.name.clone(), spec.mode))
            .collect())
    }

    pub fn input_names(&self, type_name: &str) -> Result<Vec<String>, DefinitionError> {
        Ok(self
            .get(type_name)?
            .inputs
            .iter()
            .map(|spec| spec.name.clone())
            .collect())
    }

    pub fn output_names(&self, type_name: &str) -> Result<Vec<String>, DefinitionError> {
        Ok(self
            .get(type_name)?
            .outputs
            .iter()
            .map(|spec| spec.name.clone())
            .collect())
    }

    pub fn buttons(&self, type_name: &str) -> Result<&[ButtonSpec], DefinitionError> {
        Ok(&self.get(type_name)?.buttons)
    }

    /// Every button callback of a type, untriggered.
    pub fn default_buttons(
        &self,
        type_name: &str,
    ) -> Result<BTreeMap<String, bool>, DefinitionError> {
        Ok(self
            .buttons(type_name)?
            .iter()
            .map(|button| (button.callback.clone(), false))
            .collect())
    }

    /// Alphabetically sorted type names listed under `group`.
    pub fn types(&self, group: &str) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|(_, definition)| definition.group == group)
            .map(|(name, _)| name.clone())
            .sorted()
            .collect()
    }

    /// Every type name, alphabetically sorted.
    pub fn all_types(&self) -> Vec<String> {
        self.definitions.keys().cloned().sorted().collect()
    }

    /// Alphabetically sorted distinct group labels.
    pub fn groups(&self) -> Vec<String> {
        self.definitions
            .values()
            .map(|definition| definition.group.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// Resolves the node variant a type is instantiated as.
    pub fn nodetype(&self, type_name: &str) -> Result<NodeKind, DefinitionError> {
        self.get(type_name)?.variant.parse()
    }

    /// Resolves the visual box variant paired with the type's node variant.
    pub fn boxtype(&self, type_name: &str) -> Result<BoxKind, DefinitionError> {
        self.nodetype(type_name).map(NodeKind::box_kind)
    }

    fn editable_inputs(
        &self,
        type_name: &str,
    ) -> Result<impl Iterator<Item = &PortSpec>, DefinitionError> {
        Ok(self
            .get(type_name)?
            .inputs
            .iter()
            .filter(|spec| spec.mode.is_editable()))
    }
}
