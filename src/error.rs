use thiserror::Error;

/// Errors raised by the definitions registry.
///
/// A lookup miss here is a configuration problem (the UI asked for a type the
/// catalog never declared), not a recoverable runtime condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Node type '{0}' is not defined")]
    UnknownType(String),

    #[error("Node variant '{0}' has no registered box counterpart")]
    UnknownVariant(String),

    #[error("Failed to parse definitions JSON: {0}")]
    Json(String),
}

/// Structural validation errors raised by graph and node mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("{role} node '{name}' is not in the graph")]
    NodeNotInGraph { role: &'static str, name: String },

    #[error("Output '{port}' is not declared by source node '{node}'")]
    UnknownOutput { node: String, port: String },

    #[error("Input '{port}' is not declared by destination node '{node}'")]
    UnknownInput { node: String, port: String },

    #[error("Node '{0}' must declare at least one input or output port")]
    NoPorts(String),

    #[error("A node named '{0}' already exists in the graph")]
    DuplicateNode(String),

    #[error("Node name '{0}' uses the reserved edge prefix")]
    ReservedName(String),

    #[error("Node '{node}' has no parameter named '{param}'")]
    UnknownParam { node: String, param: String },

    #[error("Parameter '{param}' of node '{node}' is locked by an incoming edge")]
    LockedParam { node: String, param: String },

    #[error("Node '{node}' has no button with callback '{callback}'")]
    UnknownButton { node: String, callback: String },

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Errors from the synchronization link and its wire codec.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Failed to encode command: {0}")]
    Encode(String),

    #[error("Channel is not ready")]
    NotReady,

    #[error("Channel is closed")]
    Closed,
}

/// Errors from saving, loading or restoring graph snapshots.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization failed: {0}")]
    Encode(String),

    #[error("Snapshot deserialization failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors from loading editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}
