//! Pre-dispatch validation.
//!
//! Before a flow is sent for execution we work out which nodes have to run for the
//! requested target, and whether any of them is missing a mandatory field. Everything
//! here is advisory and total: unknown targets and nodes without configuration degrade
//! to "just the target" and "nothing missing".

use crate::config::Field;
use crate::document::{FlowDocument, NodeRecord};
use crate::error::ReadinessError;
use crate::graph::Node;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Missing mandatory fields of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDiagnostic {
    /// Name of the node.
    pub node: String,
    /// Display name of the node's processor, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_label: Option<String>,
    pub missing_fields: Vec<String>,
}

/// Names of the nodes that must run for `target` to run, ancestors first and `target`
/// last, without duplicates.
///
/// A target that is not in the document yields just `[target]`; callers decide whether
/// that is an error. Recursion depth follows the longest chain of inputs above
/// `target`.
pub fn required_nodes_for_launch(document: &FlowDocument, target: &str) -> Vec<String> {
    let records: AHashMap<&str, &NodeRecord> =
        document.nodes.iter().map(|r| (r.name.as_str(), r)).collect();
    let mut visited = AHashSet::new();
    let mut required = Vec::new();

    fn visit<'a>(
        name: &'a str,
        records: &AHashMap<&'a str, &'a NodeRecord>,
        visited: &mut AHashSet<&'a str>,
        required: &mut Vec<String>,
    ) {
        if !visited.insert(name) {
            return;
        }
        if let Some(record) = records.get(name) {
            for input in &record.inputs {
                if input.input_node.is_empty() {
                    continue;
                }
                visit(input.input_node.as_str(), records, visited, required);
            }
        }
        required.push(name.to_string());
    }

    visit(target, &records, &mut visited, &mut required);
    required
}

/// Required fields of `record` that are neither set nor fed by an input, in
/// declaration order.
///
/// A field is fed when an input carries its name, or when an unnamed input sits at the
/// position the field occupies in the node's `inputNames`.
pub fn node_missing_fields(record: &NodeRecord) -> Vec<String> {
    let Some(config) = record.config.as_ref() else {
        return Vec::new();
    };

    let linked: AHashSet<&str> = record
        .inputs
        .iter()
        .enumerate()
        .filter(|(_, input)| !input.input_node.is_empty())
        .filter_map(|(position, input)| input.name().or_else(|| config.input_name(position)))
        .collect();

    config
        .required_fields()
        .filter(|field| !is_field_set(record, field) && !linked.contains(field.name.as_str()))
        .map(|field| field.name.clone())
        .collect()
}

/// Diagnostics for every node that has to run and is missing required fields.
///
/// With a `target`, only the nodes returned by [`required_nodes_for_launch`] are
/// checked; otherwise the whole document is. Results follow the order of `ordered`.
pub fn nodes_in_error(
    document: &FlowDocument,
    ordered: &[Node],
    target: Option<&str>,
) -> Vec<NodeDiagnostic> {
    let to_check: AHashSet<String> = match target {
        Some(target) => required_nodes_for_launch(document, target)
            .into_iter()
            .collect(),
        None => document.names().map(str::to_string).collect(),
    };

    ordered
        .iter()
        .map(Node::name)
        .filter(|name| to_check.contains(*name))
        .unique()
        .filter_map(|name| {
            let record = document.record(name)?;
            let missing_fields = node_missing_fields(record);
            if missing_fields.is_empty() {
                return None;
            }
            Some(NodeDiagnostic {
                node: name.to_string(),
                node_label: record
                    .config
                    .as_ref()
                    .map(|c| c.node_name.clone())
                    .filter(|l| !l.is_empty()),
                missing_fields,
            })
        })
        .collect()
}

/// The readiness gate: fails with every diagnostic when anything is missing.
pub fn ensure_ready(
    document: &FlowDocument,
    ordered: &[Node],
    target: Option<&str>,
) -> Result<(), ReadinessError> {
    let diagnostics = nodes_in_error(document, ordered, target);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            nodes = diagnostics.len(),
            target_node = ?target,
            "flow is missing required fields"
        );
        Err(ReadinessError::MissingRequiredFields(diagnostics))
    }
}

/// A user-facing summary of the missing fields, one block per node.
pub fn missing_fields_message(diagnostics: &[NodeDiagnostic]) -> String {
    let mut message = String::from("Some required fields are missing.\n\n");
    for diagnostic in diagnostics {
        match &diagnostic.node_label {
            Some(label) => message.push_str(&format!("Node: {} ({})\n", diagnostic.node, label)),
            None => message.push_str(&format!("Node: {}\n", diagnostic.node)),
        }
        message.push_str("Missing fields:\n");
        for field in &diagnostic.missing_fields {
            message.push_str(&format!(" - {}\n", field));
        }
        message.push('\n');
    }
    message
}

fn is_field_set(record: &NodeRecord, field: &Field) -> bool {
    record.fields.get(&field.name).is_some_and(value_is_set)
}

/// Whether a field value counts as filled in: `null`, `""`, `[]` and `{}` do not.
pub fn value_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
