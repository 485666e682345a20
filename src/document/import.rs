use super::{FlowDocument, legacy};
use crate::config::ConfigRegistry;
use crate::graph::{DEFAULT_EDGE_TYPE, Edge, NAME, Node, NodeData, Position};
use crate::handle;
use serde_json::{Map, Value};

/// Rebuilds nodes and edges from a flow document.
///
/// Each record becomes a node whose id is the record's name. Configuration is taken
/// from `registry` by processor type; the embedded configuration is only used for
/// processor types the registry does not know. Every input entry becomes one edge.
pub fn from_document(doc: &FlowDocument, registry: &ConfigRegistry) -> (Vec<Node>, Vec<Edge>) {
    let mut nodes = Vec::with_capacity(doc.len());
    let mut edges = Vec::new();

    for record in &doc.nodes {
        let record = legacy::normalize(record.clone());
        let processor_type = record.processor_type().map(str::to_string);

        let config = processor_type
            .as_deref()
            .and_then(|t| registry.get(t))
            .cloned()
            .or_else(|| {
                if record.config.is_some() {
                    tracing::debug!(
                        node = %record.name,
                        processor_type = ?processor_type,
                        "processor type not registered, keeping embedded config"
                    );
                }
                record.config.clone()
            });

        for (index, input) in record.inputs.iter().enumerate() {
            if input.input_node.is_empty() {
                tracing::warn!(node = %record.name, index, "skipping input without upstream node");
                continue;
            }
            let target_port = input
                .name()
                .and_then(|name| config.as_ref().and_then(|c| c.input_port(name)))
                .unwrap_or(index);
            let source_handle = handle::encode(input.input_node_output_key.unwrap_or(0), true);
            let target_handle = handle::encode(target_port as u32, false);

            edges.push(
                Edge::new(
                    &input.input_node,
                    Some(&source_handle),
                    &record.name,
                    Some(&target_handle),
                )
                .with_type(DEFAULT_EDGE_TYPE),
            );
        }

        let mut fields = Map::with_capacity(record.fields.len() + 1);
        fields.insert(NAME.to_string(), Value::from(record.name.as_str()));
        fields.extend(record.fields);

        nodes.push(Node {
            id: record.name,
            node_type: processor_type,
            position: Position::new(record.x.unwrap_or_default(), record.y.unwrap_or_default()),
            data: NodeData { config, fields },
            extra: Map::new(),
        });
    }

    (nodes, edges)
}
