//! Kubernetes object references
//!
//! Mirrors the subset of `core/v1.ObjectReference` the actuator records when
//! linking a Machine to its registered Node.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to the cluster node backing a machine
///
/// Set once, when the node first becomes discoverable, and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeReference {
    /// Kind of the referenced object (always "Node" today)
    pub kind: String,

    /// API version of the referenced object
    pub api_version: String,

    /// Name of the node
    pub name: String,
}

impl NodeReference {
    pub fn new(kind: impl Into<String>, api_version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            api_version: api_version.into(),
            name: name.into(),
        }
    }
}
