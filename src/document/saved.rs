use super::legacy;
use crate::config::ConfigRegistry;
use crate::error::FlowError;
use crate::graph::FlowGraph;
use serde::{Deserialize, Serialize};

/// Version written into saved flows by this crate.
pub const FLOW_VERSION: &str = "1.0.0";

pub fn is_compatible_version(version: Option<&str>) -> bool {
    version == Some(FLOW_VERSION)
}

/// Bookkeeping attached to a saved editor tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_flow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_save: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// A whole editor tab as persisted locally: the visual graph plus its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedFlow {
    #[serde(flatten)]
    pub graph: FlowGraph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FlowMetadata>,
}

impl SavedFlow {
    pub fn new(graph: FlowGraph, name: &str) -> Self {
        Self {
            graph,
            metadata: Some(FlowMetadata {
                name: Some(name.to_string()),
                version: Some(FLOW_VERSION.to_string()),
                ..Default::default()
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        serde_json::to_string(self).map_err(|e| FlowError::JsonSerializeError(e.to_string()))
    }

    pub fn is_compatible(&self) -> bool {
        is_compatible_version(self.metadata.as_ref().and_then(|m| m.version.as_deref()))
    }

    /// Upgrades tabs saved before metadata existed.
    ///
    /// Renamed node types are mapped to their current processor type (taking the
    /// current configuration from `registry`) and renamed fields are migrated. Tabs
    /// that already carry metadata are left untouched. Returns the number of nodes
    /// changed.
    pub fn migrate(&mut self, registry: &ConfigRegistry) -> usize {
        if self.metadata.is_some() {
            return 0;
        }

        let mut changed = 0;
        for node in &mut self.graph.nodes {
            let mut touched = false;
            if let Some(new_type) = node.node_type.as_deref().and_then(legacy::migrate_type) {
                node.node_type = Some(new_type.to_string());
                if let Some(config) = registry.get(new_type) {
                    node.data.config = Some(config.clone());
                }
                touched = true;
            }
            touched |= legacy::migrate_fields(&mut node.data.fields);
            if touched {
                changed += 1;
            }
        }
        tracing::debug!(changed, "migrated saved flow");
        changed
    }
}
