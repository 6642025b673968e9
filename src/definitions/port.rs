use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A parameter value as it travels over the wire (number, string, bool, list...).
pub type ParamValue = Value;

/// Placeholder help text for ports that declare no documentation.
pub const DEFAULT_DOC: &str = "No documentation available.";

/// How a declared port participates in the editor.
///
/// The legacy wire spellings `untyped-port` and `no-port` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    /// Visual port and editable field.
    #[default]
    Normal,
    /// Visual port only; never part of the editable parameters.
    #[serde(alias = "untyped-port")]
    Untyped,
    /// Editable field only; no visual port.
    #[serde(alias = "no-port")]
    Hidden,
}

impl PortMode {
    /// Whether ports of this mode show up in the parameter projections.
    pub fn is_editable(self) -> bool {
        !matches!(self, PortMode::Untyped)
    }

    /// Whether ports of this mode get a visual port on the node box.
    pub fn has_port(self) -> bool {
        !matches!(self, PortMode::Hidden)
    }
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortMode::Normal => write!(f, "normal"),
            PortMode::Untyped => write!(f, "untyped"),
            PortMode::Hidden => write!(f, "hidden"),
        }
    }
}

/// Value constraints of a port.
///
/// On the wire this is a list: `[]`, `[min]`, `[min, max]`, `[[option, ...]]`
/// or `[{label: value, ...}]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub enum Limits {
    #[default]
    None,
    Min(f64),
    Range(f64, f64),
    Options(Vec<Value>),
    Weighted(serde_json::Map<String, Value>),
}

impl TryFrom<Vec<Value>> for Limits {
    type Error = String;

    fn try_from(values: Vec<Value>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [] => Ok(Limits::None),
            [Value::Array(options)] => Ok(Limits::Options(options.clone())),
            [Value::Object(weights)] => Ok(Limits::Weighted(weights.clone())),
            [min] => min
                .as_f64()
                .map(Limits::Min)
                .ok_or_else(|| format!("invalid lower limit {}", min)),
            [min, max] => match (min.as_f64(), max.as_f64()) {
                (Some(lo), Some(hi)) => Ok(Limits::Range(lo, hi)),
                _ => Err(format!("invalid limits [{}, {}]", min, max)),
            },
            other => Err(format!("expected at most two limits, found {}", other.len())),
        }
    }
}

impl From<Limits> for Vec<Value> {
    fn from(limits: Limits) -> Self {
        match limits {
            Limits::None => vec![],
            Limits::Min(lo) => vec![Value::from(lo)],
            Limits::Range(lo, hi) => vec![Value::from(lo), Value::from(hi)],
            Limits::Options(options) => vec![Value::Array(options)],
            Limits::Weighted(weights) => vec![Value::Object(weights)],
        }
    }
}

/// A single input or output port declared by a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    #[serde(default)]
    pub value: ParamValue,
    #[serde(default, rename = "lims")]
    pub limits: Limits,
    #[serde(default)]
    pub mode: PortMode,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl PortSpec {
    /// A boolean port defaulting to `true`, with no limits and no step.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Value::Bool(true),
            limits: Limits::None,
            mode: PortMode::Normal,
            step: None,
            label: None,
            doc: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_mode(mut self, mode: PortMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Display name, falling back to the port name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Help text, falling back to a placeholder.
    pub fn doc(&self) -> &str {
        self.doc.as_deref().unwrap_or(DEFAULT_DOC)
    }

    /// Projects one field of the descriptor into its wire representation.
    pub fn field(&self, field: PortField) -> Value {
        match field {
            PortField::Value => self.value.clone(),
            PortField::Limits => Value::Array(self.limits.clone().into()),
            PortField::Mode => Value::String(self.mode.to_string()),
            PortField::Label => Value::String(self.label().to_string()),
            PortField::Doc => Value::String(self.doc().to_string()),
            PortField::Step => self.step.map(Value::from).unwrap_or(Value::Null),
        }
    }
}

/// Selects which descriptor field `Definitions::default_params` projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortField {
    Value,
    Limits,
    Mode,
    Label,
    Doc,
    Step,
}

/// A push-button declared by a node type. Pressing it asks the peer to run
/// the named callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub callback: String,
    pub label: String,
}

impl ButtonSpec {
    pub fn new(callback: &str, label: &str) -> Self {
        Self {
            callback: callback.to_string(),
            label: label.to_string(),
        }
    }
}
