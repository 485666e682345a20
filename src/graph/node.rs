use crate::config::NodeConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NAME: &str = "name";
pub const PROCESSOR_TYPE: &str = "processorType";
pub const OUTPUT_DATA: &str = "outputData";
pub const LAST_RUN: &str = "lastRun";
pub const HANDLES: &str = "handles";
pub const IS_DONE: &str = "isDone";
pub const IS_RUNNING: &str = "isRunning";
pub const MISSING_FIELDS: &str = "missingFields";

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Last computed result of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputData {
    Single(String),
    Many(Vec<String>),
}

/// Per-node data: the optional configuration plus an open, ordered field map.
///
/// Conventional keys (`name`, `processorType`, `outputData`, ...) have typed accessors;
/// everything else is processor-specific payload kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NodeData {
    pub fn name(&self) -> &str {
        self.get_str(NAME).unwrap_or_default()
    }

    pub fn processor_type(&self) -> Option<&str> {
        self.get_str(PROCESSOR_TYPE)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn output_data(&self) -> Option<OutputData> {
        self.fields
            .get(OUTPUT_DATA)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn last_run(&self) -> Option<&str> {
        self.get_str(LAST_RUN)
    }

    pub fn is_running(&self) -> bool {
        self.fields
            .get(IS_RUNNING)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Drops the result of the last run.
    pub fn clear_output(&mut self) {
        self.remove(OUTPUT_DATA);
        self.remove(LAST_RUN);
    }
}

/// A visual node of the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    /// Editor state such as `width`, `height` or `selected`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Creates a node whose `name` and `processorType` are set.
    pub fn new(id: &str, name: &str, processor_type: &str) -> Self {
        let mut data = NodeData::default();
        data.set(NAME, name);
        data.set(PROCESSOR_TYPE, processor_type);
        Self {
            id: id.to_string(),
            node_type: Some(processor_type.to_string()),
            position: Position::default(),
            data,
            extra: Map::new(),
        }
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.data.config = Some(config);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.set(key, value);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }

    pub fn config(&self) -> Option<&NodeConfig> {
        self.data.config.as_ref()
    }
}
