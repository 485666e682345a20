//! Tests for exporting graphs to flow documents and importing them back.
mod common;
use aiflow::document::{FLOW_VERSION, legacy};
use aiflow::graph::{IS_RUNNING, LAST_RUN, MISSING_FIELDS, OUTPUT_DATA};
use aiflow::prelude::*;
use common::*;
use serde_json::json;

/// `(source name, target name, source port, target port)` for every edge.
fn wiring(graph: &FlowGraph) -> Vec<(String, String, Option<u32>, Option<u32>)> {
    let mut wires: Vec<_> = graph
        .edges
        .iter()
        .map(|e| {
            let source = graph.node(&e.source).map(|n| n.name().to_string()).unwrap_or_default();
            let target = graph.node(&e.target).map(|n| n.name().to_string()).unwrap_or_default();
            (source, target, e.source_port(), e.target_port())
        })
        .collect();
    wires.sort();
    wires
}

#[test]
fn test_export_resolves_named_input() {
    let graph = FlowGraph::new(
        vec![
            Node::new("n1", "A", "input-text"),
            Node::new("n2", "B", "llm-prompt").with_config(prompt_config(&["x"])),
        ],
        vec![Edge::between_ports("n1", 0, "n2", 0)],
    );

    let doc = graph.to_document(&ExportOptions::default());
    assert_eq!(doc.names().collect::<Vec<_>>(), ["A", "B"]);
    assert_eq!(
        doc.record("B").unwrap().inputs,
        vec![NodeInput::new("A", Some(0)).named("x")]
    );
    assert!(doc.record("A").unwrap().inputs.is_empty());
}

#[test]
fn test_export_uses_target_port_for_input_name() {
    let doc = create_merge_graph().to_document(&ExportOptions::default());
    let merge = doc.record("merge").unwrap();

    assert_eq!(
        merge.inputs,
        vec![
            NodeInput::new("a", Some(0)).named("input-1"),
            NodeInput::new("b", Some(0)).named("input-2"),
        ]
    );
}

#[test]
fn test_export_records_follow_dependency_order() {
    let doc = create_chain_graph().to_document(&ExportOptions::full());
    assert_eq!(doc.names().collect::<Vec<_>>(), ["text", "summary", "title"]);
}

#[test]
fn test_export_without_handles_or_config() {
    let graph = FlowGraph::new(
        vec![Node::new("s", "src", "input-text"), Node::new("t", "dst", "custom")],
        vec![Edge::new("s", None, "t", Some("garbage"))],
    );

    let doc = graph.to_document(&ExportOptions::full());
    let input = &doc.record("dst").unwrap().inputs[0];
    assert_eq!(input.input_node, "src");
    assert_eq!(input.input_node_output_key, None);
    assert_eq!(input.input_name, None);
    assert_eq!(doc.record("dst").unwrap().config, None);
}

#[test]
fn test_export_dangling_edge_gives_empty_upstream() {
    let graph = FlowGraph::new(
        vec![Node::new("t", "dst", "custom")],
        vec![Edge::between_ports("ghost", 1, "t", 0)],
    );

    let doc = graph.to_document(&ExportOptions::default());
    let input = &doc.record("dst").unwrap().inputs[0];
    assert_eq!(input.input_node, "");
    assert_eq!(input.input_node_output_key, Some(1));
}

#[test]
fn test_export_option_flags() {
    let graph = create_chain_graph();

    let bare = graph.to_document(&ExportOptions::default());
    let summary = bare.record("summary").unwrap();
    assert_eq!((summary.x, summary.y), (None, None));
    assert!(summary.config.is_none());

    let full = graph.to_document(&ExportOptions::full());
    let summary = full.record("summary").unwrap();
    assert_eq!((summary.x, summary.y), (Some(700.0), Some(0.0)));
    let config = summary.config.as_ref().unwrap();
    assert_eq!(config.node_name, "LLMPrompt");
    assert_eq!(config.input_names.as_deref(), Some(&["initData".to_string()][..]));
    // Only the essentials travel with the document.
    assert_eq!(config.section, None);
    assert_eq!(config.processor_type, None);
}

#[test]
fn test_export_strips_transient_fields() {
    let mut graph = create_chain_graph();
    let node = graph.node_mut("n2").unwrap();
    node.data.set(IS_RUNNING, true);
    node.data.set(MISSING_FIELDS, json!(["prompt"]));
    node.data.set("nodeType", "llm-prompt");
    node.data.set("input", "text");
    node.data.set(OUTPUT_DATA, "a summary");

    let doc = graph.to_document(&ExportOptions::default());
    let fields = &doc.record("summary").unwrap().fields;
    for key in [IS_RUNNING, MISSING_FIELDS, "nodeType", "input", "name"] {
        assert!(!fields.contains_key(key), "{} should not be exported", key);
    }
    assert_eq!(fields["prompt"], json!("Summarize"));
    assert_eq!(fields["processorType"], json!("llm-prompt"));
    assert_eq!(fields[OUTPUT_DATA], json!("a summary"));
}

#[test]
fn test_lightweight_export_drops_run_results() {
    let mut graph = create_chain_graph();
    let node = graph.node_mut("n2").unwrap();
    node.data.set(OUTPUT_DATA, "a summary");
    node.data.set(LAST_RUN, "2024-01-01T00:00:00Z");

    let doc = graph.to_document(&ExportOptions::full().lightweight(true));
    let fields = &doc.record("summary").unwrap().fields;
    assert!(!fields.contains_key(OUTPUT_DATA));
    assert!(!fields.contains_key(LAST_RUN));
    assert!(fields.contains_key("model"));
}

#[test]
fn test_document_json_shape() {
    let doc = create_merge_graph().to_document(&ExportOptions::default());
    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    let merge = value
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "merge")
        .unwrap();
    assert_eq!(
        merge["inputs"],
        json!([
            {"inputName": "input-1", "inputNode": "a", "inputNodeOutputKey": 0},
            {"inputName": "input-2", "inputNode": "b", "inputNodeOutputKey": 0},
        ])
    );
    assert_eq!(merge["mergeMode"], "2");
}

#[test]
fn test_parse_document_json() {
    let json = r#"[
        {"name": "A", "processorType": "input-text", "inputText": "hi", "inputs": []},
        {"name": "B", "processorType": "llm-prompt", "prompt": "p",
         "inputs": [{"inputName": "initData", "inputNode": "A", "inputNodeOutputKey": "1"}],
         "x": 10, "y": 20}
    ]"#;

    let doc = FlowDocument::from_json(json).unwrap();
    assert_eq!(doc.len(), 2);
    let b = doc.record("B").unwrap();
    assert_eq!(b.inputs[0].input_node_output_key, Some(1));
    assert_eq!(b.processor_type(), Some("llm-prompt"));
    assert_eq!((b.x, b.y), (Some(10.0), Some(20.0)));
    assert!(!b.fields.contains_key("inputs"));

    assert!(matches!(
        FlowDocument::from_json("{not json"),
        Err(FlowError::JsonParseError(_))
    ));
}

#[test]
fn test_import_builds_nodes_and_edges() {
    let registry = ConfigRegistry::with_defaults();
    let doc = FlowDocument::new(vec![
        NodeRecord::new("A")
            .with_field("processorType", "input-text")
            .with_field("inputText", "hello"),
        NodeRecord::new("M")
            .with_field("processorType", "merger-prompt")
            .with_input(NodeInput::new("A", Some(0)).named("input-2"))
            .with_input(NodeInput::new("A", Some(1))),
    ]);

    let graph = FlowGraph::from_document(&doc, &registry);
    assert_eq!(graph.nodes.len(), 2);

    let m = graph.node("M").unwrap();
    assert_eq!(m.name(), "M");
    assert_eq!(m.node_type.as_deref(), Some("merger-prompt"));
    assert_eq!(m.config().unwrap().node_name, "MergerNode");
    assert_eq!(m.position, Position::default());

    // A named input lands on its declared slot, an unnamed one on its position.
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.edges[0].source_handle.as_deref(), Some("handle-out-0"));
    assert_eq!(graph.edges[0].target_handle.as_deref(), Some("handle-in-1"));
    assert_eq!(graph.edges[1].source_handle.as_deref(), Some("handle-out-1"));
    assert_eq!(graph.edges[1].target_handle.as_deref(), Some("handle-in-1"));
    assert!(graph.edges.iter().all(|e| e.edge_type.as_deref() == Some("buttonedge")));
}

#[test]
fn test_import_falls_back_to_embedded_config() {
    let registry = ConfigRegistry::new();
    let doc = FlowDocument::new(vec![
        NodeRecord::new("X")
            .with_field("processorType", "unregistered")
            .with_config(prompt_config(&[])),
        NodeRecord::new("Y").with_field("processorType", "unregistered"),
    ]);

    let graph = FlowGraph::from_document(&doc, &registry);
    assert_eq!(graph.node("X").unwrap().config().unwrap().node_name, "Prompt");
    assert!(graph.node("Y").unwrap().config().is_none());
}

#[test]
fn test_import_skips_inputs_without_upstream() {
    let doc = FlowDocument::new(vec![
        NodeRecord::new("X").with_input(NodeInput::new("", Some(0))),
    ]);
    let graph = FlowGraph::from_document(&doc, &ConfigRegistry::new());
    assert!(graph.edges.is_empty());
}

#[test]
fn test_round_trip_preserves_wiring_and_values() {
    let registry = ConfigRegistry::with_defaults();
    for original in [create_chain_graph(), create_merge_graph()] {
        let doc = original.to_document(&ExportOptions::full());
        let restored = FlowGraph::from_document(&doc, &registry);

        assert_eq!(wiring(&restored), wiring(&original));
        for node in &original.nodes {
            let back = restored.node_by_name(node.name()).unwrap();
            assert_eq!(back.position, node.position);
            for (key, value) in &node.data.fields {
                assert_eq!(back.data.get(key), Some(value), "field {} of {}", key, node.name());
            }
        }
    }
}

#[test]
fn test_unnamed_inputs_come_back_on_positional_ports() {
    // Without inputNames the document keeps no target port, so import falls back to
    // the input's position.
    let original = FlowGraph::new(
        vec![Node::new("s", "src", "input-text"), Node::new("t", "dst", "custom")],
        vec![Edge::between_ports("s", 0, "t", 1)],
    );
    let doc = original.to_document(&ExportOptions::full());
    assert_eq!(doc.record("dst").unwrap().inputs, vec![NodeInput::new("src", Some(0))]);

    let restored = FlowGraph::from_document(&doc, &ConfigRegistry::new());
    assert_eq!(restored.edges[0].target_handle.as_deref(), Some("handle-in-0"));
}

#[test]
fn test_round_trip_through_json() {
    let original = create_merge_graph();
    let json = original.to_document(&ExportOptions::full()).to_json().unwrap();
    let doc = FlowDocument::from_json(&json).unwrap();
    let restored = FlowGraph::from_document(&doc, &ConfigRegistry::with_defaults());

    assert_eq!(wiring(&restored), wiring(&original));
}

#[test]
fn test_import_legacy_scalar_input() {
    let doc = FlowDocument::from_json(
        r#"[
            {"name": "A", "processorType": "input-text", "inputText": "x"},
            {"name": "B", "processorType": "ai-action", "input": "A", "inputKey": "2"}
        ]"#,
    )
    .unwrap();

    let graph = FlowGraph::from_document(&doc, &ConfigRegistry::with_defaults());
    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A", "B"));
    assert_eq!(edge.source_port(), Some(2));
    assert_eq!(edge.target_port(), Some(0));

    let b = graph.node("B").unwrap();
    assert!(b.data.get("input").is_none());
    assert!(b.data.get("inputKey").is_none());
}

#[test]
fn test_normalize_keeps_existing_inputs() {
    let record = NodeRecord::new("B")
        .with_field("input", "Old")
        .with_input(NodeInput::new("New", Some(0)));

    let normalized = legacy::normalize(record);
    assert_eq!(normalized.inputs, vec![NodeInput::new("New", Some(0))]);
    assert!(!normalized.fields.contains_key("input"));
}

#[test]
fn test_normalize_ignores_empty_scalar_input() {
    let normalized = legacy::normalize(NodeRecord::new("B").with_field("input", ""));
    assert!(normalized.inputs.is_empty());
}

#[test]
fn test_legacy_prompt_fields_are_migrated() {
    let record = NodeRecord::new("G")
        .with_field("processorType", "gpt-no-context-prompt")
        .with_field("gptVersion", "gpt-4")
        .with_field("inputText", "Tell me a joke");

    let normalized = legacy::normalize(record);
    assert_eq!(normalized.processor_type(), Some("llm-prompt"));
    assert_eq!(normalized.fields["model"], json!("gpt-4"));
    assert_eq!(normalized.fields["prompt"], json!("Tell me a joke"));
    assert!(!normalized.fields.contains_key("inputText"));
    assert!(!normalized.fields.contains_key("gptVersion"));
}

#[test]
fn test_input_text_of_other_processors_is_untouched() {
    let mut fields = NodeRecord::new("T")
        .with_field("processorType", "input-text")
        .with_field("inputText", "keep me")
        .fields;

    assert!(!legacy::migrate_fields(&mut fields));
    assert_eq!(fields["inputText"], json!("keep me"));
}

#[test]
fn test_saved_flow_round_trip_and_version() {
    let saved = SavedFlow::new(create_chain_graph(), "my flow");
    assert!(saved.is_compatible());

    let json = saved.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["version"], FLOW_VERSION);
    assert_eq!(value["metadata"]["name"], "my flow");
    assert!(value["nodes"].is_array());
    assert!(value["edges"].is_array());

    let loaded = SavedFlow::from_json(&json).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn test_saved_flow_migrates_only_without_metadata() {
    let registry = ConfigRegistry::with_defaults();
    let json = r#"{
        "nodes": [
            {"id": "g", "type": "gpt-no-context-prompt", "position": {"x": 0, "y": 0},
             "data": {"name": "g", "processorType": "gpt-no-context-prompt",
                      "gptVersion": "gpt-4", "inputText": "hi"}},
            {"id": "t", "type": "input-text", "position": {"x": 0, "y": 400},
             "data": {"name": "t", "processorType": "input-text", "inputText": "x"}}
        ],
        "edges": []
    }"#;

    let mut legacy_tab = SavedFlow::from_json(json).unwrap();
    assert!(!legacy_tab.is_compatible());
    assert_eq!(legacy_tab.migrate(&registry), 1);

    let g = legacy_tab.graph.node("g").unwrap();
    assert_eq!(g.node_type.as_deref(), Some("llm-prompt"));
    assert_eq!(g.data.processor_type(), Some("llm-prompt"));
    assert_eq!(g.data.get_str("prompt"), Some("hi"));
    assert_eq!(g.config().unwrap().node_name, "LLMPrompt");
    assert_eq!(legacy_tab.graph.node("t").unwrap().data.get_str("inputText"), Some("x"));

    let mut current = SavedFlow::new(legacy_tab.graph.clone(), "tab");
    current.graph.node_mut("g").unwrap().data.set("processorType", "gpt-no-context-prompt");
    assert_eq!(current.migrate(&registry), 0);
}

#[test]
fn test_editor_state_survives_graph_json() {
    let json = r#"{
        "nodes": [{"id": "a", "type": "input-text", "position": {"x": 1, "y": 2},
                   "width": 300, "selected": true,
                   "data": {"name": "a", "processorType": "input-text"}}],
        "edges": [{"id": "e", "source": "a", "target": "b", "sourceHandle": "handle-out-0",
                   "targetHandle": "handle-in-0", "type": "buttonedge", "animated": true}]
    }"#;

    let graph = FlowGraph::from_json(json).unwrap();
    let back: serde_json::Value = serde_json::to_value(&graph).unwrap();
    assert_eq!(back["nodes"][0]["width"], 300);
    assert_eq!(back["nodes"][0]["selected"], true);
    assert_eq!(back["edges"][0]["animated"], true);
    assert_eq!(back["edges"][0]["sourceHandle"], "handle-out-0");
}
