//! Common test utilities for building graphs and documents.
use aiflow::config::{Field, FieldType};
use aiflow::prelude::*;

/// A config with one required textarea field and the given named inputs.
#[allow(dead_code)]
pub fn prompt_config(input_names: &[&str]) -> NodeConfig {
    let config = NodeConfig::new("Prompt")
        .with_field(Field::new("prompt", FieldType::Textarea).required())
        .with_output_type(OutputType::Text);
    if input_names.is_empty() {
        config
    } else {
        config.with_input_names(input_names)
    }
}

/// Creates a simple chain graph.
///
/// `text (input-text) -> summary (llm-prompt) -> title (llm-prompt)`
#[allow(dead_code)]
pub fn create_chain_graph() -> FlowGraph {
    let registry = ConfigRegistry::with_defaults();
    let llm = registry.get("llm-prompt").cloned().unwrap_or_default();

    FlowGraph::new(
        vec![
            Node::new("n3", "title", "llm-prompt")
                .with_config(llm.clone())
                .with_field("model", "gpt-4")
                .with_field("prompt", "Give it a title")
                .at(1400.0, 0.0),
            Node::new("n1", "text", "input-text")
                .with_config(registry.get("input-text").cloned().unwrap_or_default())
                .with_field("inputText", "Rust is a systems language.")
                .at(0.0, 0.0),
            Node::new("n2", "summary", "llm-prompt")
                .with_config(llm)
                .with_field("model", "gpt-3.5-turbo-1106")
                .with_field("prompt", "Summarize")
                .at(700.0, 0.0),
        ],
        vec![
            Edge::between_ports("n2", 0, "n3", 0),
            Edge::between_ports("n1", 0, "n2", 0),
        ],
    )
}

/// Creates a graph with a merge node fed by two branches, plus a lone node.
///
/// `a -> merge(input-1)`, `b -> merge(input-2)`, `lonely`
#[allow(dead_code)]
pub fn create_merge_graph() -> FlowGraph {
    let registry = ConfigRegistry::with_defaults();
    let text = registry.get("input-text").cloned().unwrap_or_default();

    FlowGraph::new(
        vec![
            Node::new("m", "merge", "merger-prompt")
                .with_config(registry.get("merger-prompt").cloned().unwrap_or_default())
                .with_field("mergeMode", "2")
                .with_field("prompt", "Combine both")
                .at(700.0, 0.0),
            Node::new("a", "a", "input-text")
                .with_config(text.clone())
                .with_field("inputText", "first")
                .at(0.0, 0.0),
            Node::new("b", "b", "input-text")
                .with_config(text.clone())
                .with_field("inputText", "second")
                .at(0.0, 400.0),
            Node::new("l", "lonely", "input-text")
                .with_config(text)
                .with_field("inputText", "alone")
                .at(0.0, 800.0),
        ],
        vec![
            Edge::between_ports("a", 0, "m", 0),
            Edge::between_ports("b", 0, "m", 1),
        ],
    )
}

/// The five-node document used by the dependency closure tests.
///
/// `Start -> Middle -> End`, `Start -> Branch`, `Independent -> Branch`
#[allow(dead_code)]
pub fn create_branching_document() -> FlowDocument {
    FlowDocument::new(vec![
        NodeRecord::new("Start"),
        NodeRecord::new("Middle").with_input(NodeInput::new("Start", Some(0))),
        NodeRecord::new("End").with_input(NodeInput::new("Middle", Some(0))),
        NodeRecord::new("Independent"),
        NodeRecord::new("Branch")
            .with_input(NodeInput::new("Start", Some(0)))
            .with_input(NodeInput::new("Independent", Some(0))),
    ])
}

/// Position of the node with `id` in `nodes`.
#[allow(dead_code)]
pub fn index_of(nodes: &[Node], id: &str) -> usize {
    nodes
        .iter()
        .position(|n| n.id == id)
        .unwrap_or_else(|| panic!("node '{}' missing from result", id))
}
