//! Older document shapes.
//!
//! Everything the importer knows about earlier formats lives here; the rest of the
//! pipeline only ever sees normalized records with an `inputs` list.

use super::{NodeInput, NodeRecord, port_from_value};
use crate::graph::PROCESSOR_TYPE;
use serde_json::{Map, Value};

const SCALAR_INPUT: &str = "input";
const SCALAR_INPUT_KEY: &str = "inputKey";

/// Normalizes a record written by an older editor version.
///
/// - a scalar `input`/`inputKey` pair becomes a single unnamed entry of `inputs`,
///   fed from output `inputKey` (or the default output) of node `input`;
/// - renamed processor types and fields are migrated, see [`migrate_fields`].
pub fn normalize(mut record: NodeRecord) -> NodeRecord {
    let scalar_input = record.fields.shift_remove(SCALAR_INPUT);
    let scalar_key = record.fields.shift_remove(SCALAR_INPUT_KEY);

    if record.inputs.is_empty() {
        if let Some(Value::String(upstream)) = scalar_input.filter(|v| v.as_str() != Some("")) {
            tracing::debug!(node = %record.name, %upstream, "converting scalar input");
            record.inputs.push(NodeInput::new(
                &upstream,
                scalar_key.as_ref().and_then(port_from_value),
            ));
        }
    }

    migrate_fields(&mut record.fields);
    record
}

/// Renames fields of processors whose schema changed.
///
/// `gpt-no-context-prompt` nodes become `llm-prompt` nodes, and for those and
/// `ai-action` nodes the old `gptVersion`/`inputText` fields move to `model`/`prompt`.
/// Returns whether anything changed.
pub fn migrate_fields(fields: &mut Map<String, Value>) -> bool {
    let processor_type = fields
        .get(PROCESSOR_TYPE)
        .and_then(Value::as_str)
        .map(str::to_string);

    match processor_type.as_deref() {
        Some("gpt-no-context-prompt") => {
            fields.insert(PROCESSOR_TYPE.to_string(), Value::from("llm-prompt"));
            move_field(fields, "gptVersion", "model");
            move_field(fields, "inputText", "prompt");
            true
        }
        Some("ai-action") if fields.contains_key("inputText") => {
            move_field(fields, "gptVersion", "model");
            move_field(fields, "inputText", "prompt");
            true
        }
        _ => false,
    }
}

/// The processor type a legacy node type maps to, if it was renamed.
pub fn migrate_type(node_type: &str) -> Option<&'static str> {
    match node_type {
        "gpt-no-context-prompt" => Some("llm-prompt"),
        _ => None,
    }
}

fn move_field(fields: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = fields.shift_remove(from) {
        fields.insert(to.to_string(), value);
    }
}
