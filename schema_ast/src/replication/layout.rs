//! Records produced by the engine's replication layout computation
//!
//! The layout is computed independently of the type tree, per class. Each record
//! carries the checksum the engine derived for the field it describes; merging
//! looks that checksum up in the tree.

use std::collections::HashMap;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{LifetimeCondition, RepLayoutCmdType, RepNotifyCondition};
use crate::error::{Error, Result};
use crate::reflection::TypePath;

/// One replicated command of a class's replication layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepLayoutRecord {
    /// Checksum of the field this command replicates
    pub checksum:             u32,
    /// Position in the class's replicated-property table, starting at 1
    pub handle:               u16,
    /// Wire encoding
    pub cmd_type:             RepLayoutCmdType,
    /// Audience restriction of the owning top-level property
    #[serde(default)]
    pub condition:            LifetimeCondition,
    /// Rep-notify condition of the owning top-level property
    #[serde(default)]
    pub rep_notify_condition: RepNotifyCondition,
    /// Handle of the property this one swaps with on role change (`Role`/`RemoteRole`)
    #[serde(default)]
    pub role_swap_handle:     Option<u16>,
}

/// One entry of a server-to-server handover table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRecord {
    /// Checksum of the field handed over
    pub checksum: u32,
    /// Position in the handover table, starting at 1
    pub handle:   u16,
}

/// Source of replication layouts, one per class
pub trait RepLayoutSource: Send + Sync {
    /// Layout records for `class`, or `None` if the class has no replicated properties
    fn layout_for(&self, class: &TypePath) -> Option<&[RepLayoutRecord]>;
}

/// Replication layouts keyed by class path
#[derive(Debug, Clone, Default)]
pub struct RepLayoutRegistry {
    layouts: HashMap<TypePath, Vec<RepLayoutRecord>>,
}

impl RepLayoutRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout of `class`, replacing any previous one
    pub fn insert(&mut self, class: TypePath, records: Vec<RepLayoutRecord>) {
        self.layouts.insert(class, records);
    }

    /// Build a registry from a JSON object mapping class paths to record arrays
    pub fn from_json(value: Value) -> Result<Self> {
        let layouts: HashMap<TypePath, Vec<RepLayoutRecord>> = serde_json::from_value(value)
            .change_context(Error::invalid("replication layout", "expected map of class path to records"))?;
        Ok(Self { layouts })
    }
}

impl RepLayoutSource for RepLayoutRegistry {
    fn layout_for(&self, class: &TypePath) -> Option<&[RepLayoutRecord]> {
        self.layouts.get(class).map(Vec::as_slice)
    }
}
