use crate::readiness::NodeDiagnostic;
use thiserror::Error;

/// Errors raised while decoding a handle identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("'{0}' is not a valid handle id")]
    NotAHandleId(String),
}

/// Why a new connection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejection {
    /// The edge would connect a node to itself.
    SelfLoop,
    /// The target input port already has an upstream producer.
    TargetHandleOccupied,
    /// One of the endpoints is not part of the graph.
    UnknownNode,
}

impl std::fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeRejection::SelfLoop => write!(f, "a node cannot be connected to itself"),
            EdgeRejection::TargetHandleOccupied => {
                write!(f, "the target input is already connected")
            }
            EdgeRejection::UnknownNode => write!(f, "an endpoint does not exist in the graph"),
        }
    }
}

/// Errors that can occur while editing or loading a flow graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to serialize flow JSON: {0}")]
    JsonSerializeError(String),

    #[error("Node '{0}' not found in the flow")]
    NodeNotFound(String),

    #[error("A node with id '{0}' already exists in the flow")]
    DuplicateNode(String),

    #[error(
        "Connection from '{source_node_id}' to '{target_node_id}' on handle {target_handle:?} was rejected: {reason}"
    )]
    DuplicateOrInvalidEdge {
        source_node_id: String,
        target_node_id: String,
        target_handle: Option<String>,
        reason: EdgeRejection,
    },

    #[error("Unknown execution event '{0}'")]
    UnknownEvent(String),
}

/// Raised by the readiness gate when nodes required for a run lack mandatory data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadinessError {
    #[error("{} node(s) are missing required fields", .0.len())]
    MissingRequiredFields(Vec<NodeDiagnostic>),
}

/// Errors that prevent a flow from being handed to the execution backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("A run is already in progress")]
    RunInProgress,

    #[error(transparent)]
    NotReady(#[from] ReadinessError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Failed to serialize the flow document: {0}")]
    Serialization(String),
}
