//! # aiflow - Flow Graph Conversion, Ordering and Readiness
//!
//! **aiflow** is the non-visual core of a node-based editor for chaining AI model calls.
//! The editor hands over its nodes and edges; aiflow orders them, turns them into the
//! portable flow document the execution backend understands, reads such documents back
//! into a graph, and checks that everything a run needs is filled in before the flow is
//! dispatched.
//!
//! ## Core Workflow
//!
//! 1.  **Build or load a graph**: nodes carry a `name`, a `processorType`, field values
//!     and an optional `NodeConfig`; edges connect numbered output handles to numbered
//!     input handles (`handle-out-0` → `handle-in-1`).
//! 2.  **Order**: `topological_sort` places every producer before its consumers.
//! 3.  **Export**: `to_document` resolves each node's inputs from the edges and flattens
//!     its fields into a `FlowDocument`.
//! 4.  **Check**: `nodes_in_error` lists nodes about to run that miss required fields.
//! 5.  **Dispatch**: `PreparedRun::prepare` does steps 2 to 4 and builds the request.
//!
//! ## Quick Start
//!
//! ```rust
//! use aiflow::prelude::*;
//!
//! let registry = ConfigRegistry::with_defaults();
//! let mut graph = FlowGraph::default();
//!
//! graph.add_node(
//!     Node::new("1", "question", "input-text")
//!         .with_config(registry.get("input-text").unwrap().clone())
//!         .with_field("inputText", "What is Rust?"),
//! ).unwrap();
//! graph.add_node(
//!     Node::new("2", "answer", "llm-prompt")
//!         .with_config(registry.get("llm-prompt").unwrap().clone()),
//! ).unwrap();
//! graph.connect(Connection::new("1", Some("handle-out-0"), "2", Some("handle-in-0"))).unwrap();
//!
//! // The LLM node has no prompt yet, so the run is refused.
//! let err = PreparedRun::prepare(&graph, Some("answer")).unwrap_err();
//! assert!(matches!(err, DispatchError::NotReady(_)));
//!
//! graph.node_mut("2").unwrap().data.set("prompt", "Answer briefly.");
//! let run = PreparedRun::prepare(&graph, Some("answer")).unwrap();
//! assert_eq!(run.operation, Operation::RunNode);
//! assert_eq!(run.document.names().collect::<Vec<_>>(), ["question", "answer"]);
//! ```

pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod graph;
pub mod handle;
pub mod prelude;
pub mod readiness;
