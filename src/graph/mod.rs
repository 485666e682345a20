//! The visual flow graph: nodes, edges and the editing operations on them.

use crate::config::ConfigRegistry;
use crate::document::{self, ExportOptions, FlowDocument};
use crate::error::{EdgeRejection, FlowError};
use crate::readiness::NodeDiagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod edge;
pub mod layout;
mod node;
pub mod ordering;

pub use edge::*;
pub use node::*;
pub use ordering::{find_cycle, find_parents, topological_sort};

/// A connection the user is trying to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: String,
    pub source_handle: Option<String>,
    pub target: String,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> Self {
        Self {
            source: source.to_string(),
            source_handle: source_handle.map(str::to_string),
            target: target.to_string(),
            target_handle: target_handle.map(str::to_string),
        }
    }
}

/// A snapshot of the editor's nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub fn node_by_name_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name() == name)
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), FlowError> {
        if self.node(&node.id).is_some() {
            return Err(FlowError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Checks a connection against the wiring rules without applying it.
    pub fn validate_connection(&self, connection: &Connection) -> Result<(), EdgeRejection> {
        if connection.source == connection.target {
            return Err(EdgeRejection::SelfLoop);
        }
        if self.node(&connection.source).is_none() || self.node(&connection.target).is_none() {
            return Err(EdgeRejection::UnknownNode);
        }
        let occupied = self.edges.iter().any(|e| {
            e.target == connection.target && e.target_handle == connection.target_handle
        });
        if occupied {
            return Err(EdgeRejection::TargetHandleOccupied);
        }
        Ok(())
    }

    /// Adds an edge for `connection` if it passes [`Self::validate_connection`].
    pub fn connect(&mut self, connection: Connection) -> Result<&Edge, FlowError> {
        if let Err(reason) = self.validate_connection(&connection) {
            tracing::debug!(
                source_node = %connection.source,
                target_node = %connection.target,
                %reason,
                "connection rejected"
            );
            return Err(FlowError::DuplicateOrInvalidEdge {
                source_node_id: connection.source,
                target_node_id: connection.target,
                target_handle: connection.target_handle,
                reason,
            });
        }

        let edge = Edge::new(
            &connection.source,
            connection.source_handle.as_deref(),
            &connection.target,
            connection.target_handle.as_deref(),
        )
        .with_type(DEFAULT_EDGE_TYPE);
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(index))
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == node_id)?;
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        Some(self.nodes.remove(index))
    }

    /// Removes all edges feeding `node_id` and returns them.
    pub fn remove_incoming_edges(&mut self, node_id: &str) -> Vec<Edge> {
        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.target == node_id);
        self.edges = kept;
        removed
    }

    pub fn has_parent(&self, node_id: &str) -> bool {
        self.edges.iter().any(|e| e.target == node_id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Drops `outputData` and `lastRun` from every node.
    pub fn clear_outputs(&mut self) {
        for node in &mut self.nodes {
            node.data.clear_output();
        }
    }

    /// Whether any node is currently flagged as running.
    pub fn is_running(&self) -> bool {
        self.nodes.iter().any(|n| n.data.is_running())
    }

    /// Nodes in dependency order.
    pub fn sorted_nodes(&self) -> Vec<Node> {
        topological_sort(&self.nodes, &self.edges)
    }

    pub fn find_cycle(&self) -> Option<Vec<String>> {
        find_cycle(&self.nodes, &self.edges)
    }

    /// Sorts the graph and exports it as a flow document.
    pub fn to_document(&self, options: &ExportOptions) -> FlowDocument {
        document::to_document(&self.sorted_nodes(), &self.edges, options)
    }

    /// Rebuilds a graph from a flow document, attaching configs from `registry`.
    pub fn from_document(doc: &FlowDocument, registry: &ConfigRegistry) -> Self {
        let (nodes, edges) = document::from_document(doc, registry);
        Self { nodes, edges }
    }

    /// Recomputes node positions column by column. See [`layout::arrange_levels`].
    pub fn arrange_levels(&mut self) {
        layout::arrange_levels(&mut self.nodes, &self.edges);
    }

    /// Records readiness diagnostics on the nodes they concern; other nodes are cleared.
    pub fn mark_missing_fields(&mut self, diagnostics: &[NodeDiagnostic]) {
        for node in &mut self.nodes {
            match diagnostics.iter().find(|d| d.node == node.name()) {
                Some(diagnostic) => {
                    let fields: Vec<Value> = diagnostic
                        .missing_fields
                        .iter()
                        .map(|f| Value::from(f.as_str()))
                        .collect();
                    node.data.set(MISSING_FIELDS, fields);
                }
                None => {
                    node.data.remove(MISSING_FIELDS);
                }
            }
        }
    }
}
