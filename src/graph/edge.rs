use crate::handle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_EDGE_TYPE: &str = "buttonedge";

/// A directed wire from an output port of `source` to an input port of `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    /// Creates an edge whose id is derived from its endpoints and handles.
    pub fn new(
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> Self {
        Self {
            id: edge_id(source, source_handle, target, target_handle),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.map(str::to_string),
            target_handle: target_handle.map(str::to_string),
            edge_type: None,
            extra: Map::new(),
        }
    }

    /// Creates an edge between two numbered ports.
    pub fn between_ports(source: &str, source_port: u32, target: &str, target_port: u32) -> Self {
        let source_handle = handle::encode(source_port, true);
        let target_handle = handle::encode(target_port, false);
        Self::new(source, Some(&source_handle), target, Some(&target_handle))
    }

    pub fn with_type(mut self, edge_type: &str) -> Self {
        self.edge_type = Some(edge_type.to_string());
        self
    }

    /// Output port of the source node, if the source handle is decodable.
    pub fn source_port(&self) -> Option<u32> {
        self.source_handle.as_deref().and_then(handle::port_index)
    }

    /// Input port of the target node, if the target handle is decodable.
    pub fn target_port(&self) -> Option<u32> {
        self.target_handle.as_deref().and_then(handle::port_index)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Deterministic edge id, so the same wiring always gets the same id.
pub fn edge_id(
    source: &str,
    source_handle: Option<&str>,
    target: &str,
    target_handle: Option<&str>,
) -> String {
    let mut id = source.to_string();
    if let Some(h) = source_handle {
        id.push('_');
        id.push_str(h);
    }
    id.push_str("-to-");
    id.push_str(target);
    if let Some(h) = target_handle {
        id.push('_');
        id.push_str(h);
    }
    id
}
