use super::{FlowDocument, NodeInput, NodeRecord};
use crate::graph::{Edge, IS_RUNNING, LAST_RUN, MISSING_FIELDS, NAME, Node, OUTPUT_DATA};
use ahash::AHashMap;
use serde_json::Map;

/// Keys that never leave the editor.
const TRANSIENT_FIELDS: &[&str] = &[
    "id",
    "nodeType",
    "input",
    "output",
    MISSING_FIELDS,
    IS_RUNNING,
];

/// Keys owned by the record itself rather than by the flattened field map.
const RESERVED_FIELDS: &[&str] = &[NAME, "inputs", "config", "x", "y"];

/// What to include when exporting a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Attach `x`/`y` canvas coordinates.
    pub with_coordinates: bool,
    /// Attach the essential part of each node's configuration.
    pub with_config: bool,
    /// Drop run results (`outputData`, `lastRun`).
    pub lightweight: bool,
}

impl ExportOptions {
    /// Coordinates and configuration, suitable for saving and reloading.
    pub fn full() -> Self {
        Self {
            with_coordinates: true,
            with_config: true,
            lightweight: false,
        }
    }

    /// What gets sent to the execution backend.
    pub fn dispatch() -> Self {
        Self::full()
    }

    pub fn with_coordinates(mut self, yes: bool) -> Self {
        self.with_coordinates = yes;
        self
    }

    pub fn with_config(mut self, yes: bool) -> Self {
        self.with_config = yes;
        self
    }

    pub fn lightweight(mut self, yes: bool) -> Self {
        self.lightweight = yes;
        self
    }
}

/// Converts a graph into a flow document.
///
/// `nodes` must already be in dependency order (see
/// [`topological_sort`](crate::graph::topological_sort)); records are emitted in the
/// same order.
pub fn to_document(nodes: &[Node], edges: &[Edge], options: &ExportOptions) -> FlowDocument {
    let names: AHashMap<&str, &str> = nodes.iter().map(|n| (n.id.as_str(), n.name())).collect();

    let records = nodes
        .iter()
        .map(|node| NodeRecord {
            name: node.name().to_string(),
            fields: exported_fields(node, options),
            inputs: resolve_inputs(node, edges, &names),
            config: options
                .with_config
                .then(|| node.config().map(|c| c.essentials()))
                .flatten(),
            x: options.with_coordinates.then_some(node.position.x),
            y: options.with_coordinates.then_some(node.position.y),
        })
        .collect();

    FlowDocument::new(records)
}

/// Resolves the inputs of `node` from the edges targeting it, in edge-list order.
///
/// The input name comes from the node's declared `inputNames` at the target port; when
/// the target handle cannot be decoded the edge's position among the node's incoming
/// edges stands in for the port.
pub fn resolve_inputs(node: &Node, edges: &[Edge], names: &AHashMap<&str, &str>) -> Vec<NodeInput> {
    edges
        .iter()
        .filter(|e| e.target == node.id)
        .enumerate()
        .map(|(position, edge)| {
            let input_node = match names.get(edge.source.as_str()) {
                Some(name) => name.to_string(),
                None => {
                    tracing::warn!(
                        source_node = %edge.source,
                        target_node = %node.id,
                        "upstream node not found, exporting empty input"
                    );
                    String::new()
                }
            };
            let port = edge.target_port().map_or(position, |p| p as usize);

            NodeInput {
                input_name: node
                    .config()
                    .and_then(|c| c.input_name(port))
                    .map(str::to_string),
                input_node,
                input_node_output_key: edge.source_port(),
            }
        })
        .collect()
}

fn exported_fields(node: &Node, options: &ExportOptions) -> Map<String, serde_json::Value> {
    node.data
        .fields
        .iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            !RESERVED_FIELDS.contains(&key)
                && !TRANSIENT_FIELDS.contains(&key)
                && !(options.lightweight && (key == OUTPUT_DATA || key == LAST_RUN))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
