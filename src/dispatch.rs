//! The boundary with the execution backend.
//!
//! A run request carries the serialized flow document and, for single-node runs, the
//! name of the node to run. Requests are only built after the readiness gate passes.
//! While the backend works it reports back through [`ExecutionEvent`]s, which are
//! applied to the graph with [`FlowGraph::apply_event`].

use crate::document::{ExportOptions, FlowDocument};
use crate::error::{DispatchError, FlowError};
use crate::graph::{FlowGraph, IS_DONE, IS_RUNNING, LAST_RUN, OUTPUT_DATA};
use crate::readiness;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend operation a request is sent under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Run one node and whatever it depends on.
    RunNode,
    /// Run every node of the flow.
    ProcessFile,
}

impl Operation {
    pub fn event_name(self) -> &'static str {
        match self {
            Operation::RunNode => "run_node",
            Operation::ProcessFile => "process_file",
        }
    }
}

/// Payload of a run request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// The flow document, serialized as a JSON string.
    pub json_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

/// A request that passed the readiness gate, ready to be emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRun {
    pub operation: Operation,
    pub request: DispatchRequest,
    /// The document serialized into `request.json_file`.
    pub document: FlowDocument,
}

impl PreparedRun {
    /// Orders, exports and checks `graph`, producing a request for `target` (or for the
    /// whole flow when `target` is `None`).
    ///
    /// Fails if a run is still in flight, if `target` names no node of the graph, or if
    /// any node that would run is missing required fields.
    pub fn prepare(graph: &FlowGraph, target: Option<&str>) -> Result<Self, DispatchError> {
        if graph.is_running() {
            return Err(DispatchError::RunInProgress);
        }
        if let Some(name) = target {
            if graph.node_by_name(name).is_none() {
                return Err(FlowError::NodeNotFound(name.to_string()).into());
            }
        }

        let ordered = graph.sorted_nodes();
        let document =
            crate::document::to_document(&ordered, &graph.edges, &ExportOptions::dispatch());
        readiness::ensure_ready(&document, &ordered, target)?;

        let json_file = document
            .to_json()
            .map_err(|e| DispatchError::Serialization(e.to_string()))?;
        let operation = match target {
            Some(_) => Operation::RunNode,
            None => Operation::ProcessFile,
        };
        tracing::debug!(
            operation = operation.event_name(),
            nodes = document.len(),
            "flow ready for dispatch"
        );

        Ok(Self {
            operation,
            request: DispatchRequest {
                json_file,
                node_name: target.map(str::to_string),
            },
            document,
        })
    }

    pub fn payload(&self) -> Result<Value, DispatchError> {
        serde_json::to_value(&self.request).map_err(|e| DispatchError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub instance_name: String,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub is_done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default, alias = "node_name")]
    pub node_name: Option<String>,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub credits_error: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRunningEvent {
    pub instance_name: String,
}

/// Something the backend reported about a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    Progress(ProgressEvent),
    Error(ErrorEvent),
    CurrentNodeRunning(NodeRunningEvent),
    RunEnd,
}

impl ExecutionEvent {
    /// Decodes an event from its wire name and payload.
    pub fn from_wire(event_name: &str, payload: Value) -> Result<Self, FlowError> {
        let parse_err = |e: serde_json::Error| FlowError::JsonParseError(e.to_string());
        match event_name {
            "progress" => Ok(Self::Progress(serde_json::from_value(payload).map_err(parse_err)?)),
            "error" => Ok(Self::Error(serde_json::from_value(payload).map_err(parse_err)?)),
            "current_node_running" => Ok(Self::CurrentNodeRunning(
                serde_json::from_value(payload).map_err(parse_err)?,
            )),
            "run_end" => Ok(Self::RunEnd),
            other => Err(FlowError::UnknownEvent(other.to_string())),
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ExecutionEvent::Progress(_) => "progress",
            ExecutionEvent::Error(_) => "error",
            ExecutionEvent::CurrentNodeRunning(_) => "current_node_running",
            ExecutionEvent::RunEnd => "run_end",
        }
    }
}

impl FlowGraph {
    /// Applies a backend event to the node it concerns.
    ///
    /// Progress stores the output and stamps `lastRun`; errors and the end of a run
    /// clear the running flag. Events about unknown nodes are ignored. Returns whether
    /// any node changed.
    pub fn apply_event(&mut self, event: &ExecutionEvent) -> bool {
        match event {
            ExecutionEvent::Progress(progress) => {
                let Some(node) = self.node_by_name_mut(&progress.instance_name) else {
                    tracing::debug!(node = %progress.instance_name, "progress for unknown node");
                    return false;
                };
                node.data.set(OUTPUT_DATA, progress.output.clone());
                node.data.set(LAST_RUN, chrono::Utc::now().to_rfc3339());
                node.data.set(IS_DONE, progress.is_done);
                node.data.set(IS_RUNNING, false);
                true
            }
            ExecutionEvent::CurrentNodeRunning(running) => {
                match self.node_by_name_mut(&running.instance_name) {
                    Some(node) => {
                        node.data.set(IS_RUNNING, true);
                        true
                    }
                    None => false,
                }
            }
            ExecutionEvent::Error(error) => {
                tracing::warn!(
                    node = ?error.instance_name.as_ref().or(error.node_name.as_ref()),
                    error = %error.error,
                    "backend reported an error"
                );
                let name = error.instance_name.as_ref().or(error.node_name.as_ref());
                match name.and_then(|n| self.node_by_name_mut(n)) {
                    Some(node) => {
                        node.data.set(IS_RUNNING, false);
                        true
                    }
                    None => false,
                }
            }
            ExecutionEvent::RunEnd => {
                let mut changed = false;
                for node in &mut self.nodes {
                    if node.data.is_running() {
                        node.data.set(IS_RUNNING, false);
                        changed = true;
                    }
                }
                changed
            }
        }
    }
}
