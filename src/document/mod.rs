//! The portable flow document.
//!
//! A flow document is a JSON array with one record per node, already in dependency
//! order. Each record carries the node's name, its flattened field values and an
//! `inputs` list naming which upstream node (and which of its outputs) feeds each input
//! slot. It is what the execution backend consumes and what templates are stored as.
//!
//! ```
//! use aiflow::prelude::*;
//!
//! let nodes = vec![
//!     Node::new("n1", "A", "input-text"),
//!     Node::new("n2", "B", "llm-prompt")
//!         .with_config(NodeConfig::new("LLMPrompt").with_input_names(&["x"])),
//! ];
//! let edges = vec![Edge::between_ports("n1", 0, "n2", 0)];
//!
//! let doc = to_document(&topological_sort(&nodes, &edges), &edges, &ExportOptions::default());
//! let input = &doc.record("B").unwrap().inputs[0];
//! assert_eq!(input.input_name.as_deref(), Some("x"));
//! assert_eq!(input.input_node, "A");
//! assert_eq!(input.input_node_output_key, Some(0));
//! ```

use crate::config::NodeConfig;
use crate::error::FlowError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

mod export;
mod import;
pub mod legacy;
mod saved;

pub use export::*;
pub use import::*;
pub use saved::*;

/// One resolved input slot of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
    #[serde(default)]
    pub input_node: String,
    #[serde(
        default,
        deserialize_with = "lenient_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_node_output_key: Option<u32>,
}

impl NodeInput {
    pub fn new(input_node: &str, output_key: Option<u32>) -> Self {
        Self {
            input_name: None,
            input_node: input_node.to_string(),
            input_node_output_key: output_key,
        }
    }

    pub fn named(mut self, input_name: &str) -> Self {
        self.input_name = Some(input_name.to_string());
        self
    }

    /// The declared input name, ignoring empty strings.
    pub fn name(&self) -> Option<&str> {
        self.input_name.as_deref().filter(|n| !n.is_empty())
    }
}

/// A node as it appears in a flow document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub inputs: Vec<NodeInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl NodeRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn with_input(mut self, input: NodeInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn processor_type(&self) -> Option<&str> {
        self.fields.get(crate::graph::PROCESSOR_TYPE).and_then(Value::as_str)
    }
}

/// An ordered list of node records, upstream nodes first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowDocument {
    pub nodes: Vec<NodeRecord>,
}

impl FlowDocument {
    pub fn new(nodes: Vec<NodeRecord>) -> Self {
        Self { nodes }
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        serde_json::to_string(self).map_err(|e| FlowError::JsonSerializeError(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FlowError::JsonSerializeError(e.to_string()))
    }

    pub fn record(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// Output keys written by older editors may be numeric strings.
fn lenient_port<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(port_from_value))
}

pub(crate) fn port_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
