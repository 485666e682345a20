//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the aiflow
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use aiflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/flow.json")?;
//! let graph = FlowGraph::from_json(&json)?;
//!
//! let document = graph.to_document(&ExportOptions::full());
//! let diagnostics = nodes_in_error(&document, &graph.sorted_nodes(), None);
//! if !diagnostics.is_empty() {
//!     println!("{}", missing_fields_message(&diagnostics));
//! }
//! # Ok(())
//! # }
//! ```

// Graph model and ordering
pub use crate::graph::{
    Connection, Edge, FlowGraph, Node, NodeData, OutputData, Position, find_cycle, find_parents,
    topological_sort,
};

// Configuration
pub use crate::config::{ConfigRegistry, Field, FieldType, NodeConfig, OutputType};

// Documents
pub use crate::document::{
    ExportOptions, FlowDocument, NodeInput, NodeRecord, SavedFlow, from_document, to_document,
};

// Readiness
pub use crate::readiness::{
    NodeDiagnostic, missing_fields_message, node_missing_fields, nodes_in_error,
    required_nodes_for_launch,
};

// Dispatch
pub use crate::dispatch::{DispatchRequest, ExecutionEvent, Operation, PreparedRun};

// Errors and handles
pub use crate::error::{DispatchError, EdgeRejection, FlowError, HandleError, ReadinessError};
pub use crate::handle::HandleId;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
