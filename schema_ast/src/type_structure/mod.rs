//! The type tree of a root class and everything derived from it
//!
//! A [`TypeTree`] is built once per root by [`TypeTreeBuilder`], receives replication and
//! handover data through the checksum merges in [`merge`], and is then read by the
//! flatteners. Nothing mutates a tree after flattening starts.

mod flatten;
mod merge;
mod nodes;
mod ownership;
mod property_builder;
mod recursion_context;
mod tree;
mod type_builder;


pub use flatten::{
    FlatHandoverTable, FlatReplicatedTable, SubobjectId, SubobjectIndex, collect_subobjects, flatten_handover,
    flatten_replicated, rpcs_by_type, subobject_id,
};
pub use merge::{HandoverLayout, merge_handover_layout, merge_replication_layout};
pub use nodes::{
    HandoverInfo, NetData, PropertyNode, PropertyNodeId, ReplicationInfo, RpcNode, RpcNodeId, TypeNode, TypeNodeId,
};
pub use ownership::{FieldClass, OwnershipEdge, StopReason, Traversal, field_traversal, target_allows_recursion};
pub use tree::TypeTree;
pub use type_builder::TypeTreeBuilder;
