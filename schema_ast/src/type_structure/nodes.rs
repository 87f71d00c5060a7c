//! Nodes of the type tree
//!
//! Nodes live in the arena of a [`super::TypeTree`] and refer to each other by id.
//! Ownership runs strictly downwards: a property owns the type node it recursed into
//! (`PropertyNode::type_node`) and a type node owns its properties and RPCs. The upward
//! links (`TypeNode::parent_property`, `PropertyNode::container`) are lookups only.

use serde::Serialize;

use super::ownership::FieldClass;
use crate::reflection::{FieldFlags, FieldKind, TypeCategory, TypePath};
use crate::replication::{LifetimeCondition, RepLayoutCmdType, RepNotifyCondition, RpcType};

/// Index of a [`TypeNode`] in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeNodeId(pub(super) usize);

/// Index of a [`PropertyNode`] in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PropertyNodeId(pub(super) usize);

/// Index of an [`RpcNode`] in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RpcNodeId(pub(super) usize);

/// One reflected class or struct instance in the tree: the root type, an owned sub-object
/// or an embedded struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    /// Path of the reflected type
    pub object_path:        TypePath,
    /// Display name of the reflected type
    pub name:               String,
    /// Class or struct
    pub category:           TypeCategory,
    /// The type is an actor class
    pub is_actor_class:     bool,
    /// The type is an actor component class
    pub is_actor_component: bool,
    /// The type exists only in editor builds
    pub editor_only:        bool,
    /// Static array slot of the owning property, 0 for the root
    pub static_array_index: u32,
    /// Properties in declaration order, one per static array slot
    pub properties:         Vec<PropertyNodeId>,
    /// RPCs declared on this type
    pub rpcs:               Vec<RpcNodeId>,
    /// Property this type was recursed from; `None` for the root
    pub parent_property:    Option<PropertyNodeId>,
}

impl TypeNode {
    /// Number of RPCs declared on this type
    pub fn rpc_count(&self) -> usize {
        self.rpcs.len()
    }
}

/// Replication data taken from the engine's replication layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplicationInfo {
    /// Wire encoding
    pub cmd_type:             RepLayoutCmdType,
    /// Position in the class's replicated-property table
    pub handle:               u16,
    /// Handle of the role-swap partner, if any
    pub role_swap_handle:     Option<u16>,
    /// Static array slot of the property
    pub array_index:          u32,
    /// Audience restriction
    pub condition:            LifetimeCondition,
    /// Rep-notify condition
    pub rep_notify_condition: RepNotifyCondition,
}

/// Server-to-server handover data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandoverInfo {
    /// Position in the handover table
    pub handle: u16,
}

/// Network data of a property. A replicated property is never also handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetData {
    /// Replicated to clients
    Replicated(ReplicationInfo),
    /// Handed over between servers
    Handover(HandoverInfo),
}

/// One static array slot of a reflected field, or of an RPC parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNode {
    /// Declaring path, `<owner path>.<field name>` with `[index]` for static array slots
    pub property_path:      String,
    /// Declared field name
    pub name:               String,
    /// Sanitized, lower-cased name of this segment, unique among its siblings
    pub schema_name:        String,
    /// C++ type spelling
    pub cpp_type:           String,
    /// Schema data type
    pub data_type:          String,
    /// Declared kind
    pub kind:               FieldKind,
    /// Container classification
    pub class:              FieldClass,
    /// Fixed array dimension of the field
    pub array_dim:          u32,
    /// Slot of this node within the fixed array, 0 for non-array fields
    pub static_array_index: u32,
    /// Reflection flags
    pub flags:              FieldFlags,
    /// Type recursed into; only set for owned sub-objects and embedded structs
    pub type_node:          Option<TypeNodeId>,
    /// Type declaring this property; `None` for RPC parameters
    pub container:          Option<TypeNodeId>,
    /// Replication or handover data, once merged
    pub net:                Option<NetData>,
    /// Checksum of this property
    pub checksum:           u32,
    /// Checksum of the enclosing property, 0 at the top of a class or RPC
    pub parent_checksum:    u32,
}

impl PropertyNode {
    /// Replication data, if the property is replicated
    pub fn replication(&self) -> Option<&ReplicationInfo> {
        match &self.net {
            Some(NetData::Replicated(info)) => Some(info),
            _ => None,
        }
    }

    /// Handover data, if the property is handed over
    pub fn handover(&self) -> Option<&HandoverInfo> {
        match &self.net {
            Some(NetData::Handover(info)) => Some(info),
            _ => None,
        }
    }
}

/// A remote procedure call declared on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcNode {
    /// Path of the declaring class
    pub caller_type:   TypePath,
    /// Type node of the declaring class
    pub caller:        TypeNodeId,
    /// Function name
    pub function_name: String,
    /// Routing category
    pub rpc_type:      RpcType,
    /// Delivery is guaranteed
    pub reliable:      bool,
    /// Parameters in declaration order, one node per static array slot
    pub parameters:    Vec<PropertyNodeId>,
}
