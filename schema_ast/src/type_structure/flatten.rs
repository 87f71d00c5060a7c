//! Flat views of a merged type tree, consumed by schema emitters
//!
//! Replicated properties are flattened per layout root only: every owned sub-object is
//! replicated through its own channel and gets its own table. Handover data crosses
//! server boundaries regardless of nesting, so the handover table covers the full tree.

use std::collections::BTreeMap;
use std::fmt;

use error_stack::Report;
use serde::Serialize;

use super::nodes::{PropertyNodeId, RpcNodeId, TypeNodeId};
use super::tree::TypeTree;
use crate::checksum;
use crate::error::{Error, HandleTable, Result};
use crate::replication::{ReplicatedPropertyGroup, RpcType};

/// Replicated properties of one layout root, by audience group and handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatReplicatedTable {
    groups: BTreeMap<ReplicatedPropertyGroup, BTreeMap<u16, PropertyNodeId>>,
}

impl FlatReplicatedTable {
    /// Properties of `group` keyed by handle. Every group is present, possibly empty.
    pub fn group(&self, group: ReplicatedPropertyGroup) -> &BTreeMap<u16, PropertyNodeId> {
        &self.groups[&group]
    }

    /// Groups in schema order
    pub fn groups(&self) -> impl Iterator<Item = (ReplicatedPropertyGroup, &BTreeMap<u16, PropertyNodeId>)> {
        self.groups.iter().map(|(group, entries)| (*group, entries))
    }

    /// Group a handle was placed in, if any
    pub fn group_of(&self, handle: u16) -> Option<ReplicatedPropertyGroup> {
        self.groups
            .iter()
            .find(|(_, entries)| entries.contains_key(&handle))
            .map(|(group, _)| *group)
    }

    /// Number of replicated properties across both groups
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// No property is replicated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handed-over properties of a full tree, by handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlatHandoverTable {
    entries: BTreeMap<u16, PropertyNodeId>,
}

impl FlatHandoverTable {
    /// Property with `handle`
    pub fn get(&self, handle: u16) -> Option<PropertyNodeId> {
        self.entries.get(&handle).copied()
    }

    /// Entries in handle order
    pub fn iter(&self) -> impl Iterator<Item = (u16, PropertyNodeId)> + '_ {
        self.entries.iter().map(|(handle, id)| (*handle, *id))
    }

    /// Number of handed-over properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No property is handed over
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable identity of an owned sub-object within its root type.
///
/// Derived from the checksums of the property chain leading to the sub-object, so two
/// sub-objects of the same class held by different properties get different identities,
/// and the identity does not change between generation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubobjectId(u32);

impl SubobjectId {
    /// Raw identity value
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubobjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Every owned sub-object of a tree, in depth-first order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubobjectIndex {
    entries: Vec<(SubobjectId, TypeNodeId)>,
}

impl SubobjectIndex {
    /// Type node of the sub-object with `id`
    pub fn get(&self, id: SubobjectId) -> Option<TypeNodeId> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, type_id)| *type_id)
    }

    /// Entries in depth-first order
    pub fn iter(&self) -> impl Iterator<Item = (SubobjectId, TypeNodeId)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of sub-objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The tree has no owned sub-objects
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bucket the replicated properties of `type_id` by audience group, keyed by handle.
///
/// Does not descend into owned sub-objects. Fails with [`Error::DuplicateHandle`] if two
/// properties share a handle, whether in the same group or not.
pub fn flatten_replicated(tree: &TypeTree, type_id: TypeNodeId) -> Result<FlatReplicatedTable> {
    let mut groups: BTreeMap<_, BTreeMap<u16, PropertyNodeId>> = ReplicatedPropertyGroup::all()
        .into_iter()
        .map(|group| (group, BTreeMap::new()))
        .collect();

    let mut duplicate = None;
    tree.visit_properties(type_id, false, &mut |property_id, property| {
        let Some(info) = property.replication() else {
            return true;
        };
        let group = info.condition.group();
        // Handles are per class, so one may not show up in both groups either
        if groups.values().any(|entries| entries.contains_key(&info.handle)) {
            duplicate.get_or_insert((group, info.handle, property_id));
            return true;
        }
        groups.entry(group).or_default().insert(info.handle, property_id);
        true
    });

    if let Some((group, handle, property_id)) = duplicate {
        return Err(Report::new(Error::DuplicateHandle {
            group: HandleTable::Replicated(group),
            handle,
        })
        .attach(format!("Property: {}", tree.property(property_id).property_path)));
    }
    Ok(FlatReplicatedTable { groups })
}

/// Collect every handed-over property of the full tree, keyed by handle
pub fn flatten_handover(tree: &TypeTree) -> Result<FlatHandoverTable> {
    let mut table = FlatHandoverTable::default();
    let mut duplicate = None;
    tree.visit_properties(tree.root(), true, &mut |property_id, property| {
        if let Some(info) = property.handover() {
            if table.entries.insert(info.handle, property_id).is_some() {
                duplicate.get_or_insert((info.handle, property_id));
            }
        }
        true
    });

    if let Some((handle, property_id)) = duplicate {
        return Err(Report::new(Error::DuplicateHandle {
            group: HandleTable::Handover,
            handle,
        })
        .attach(format!("Property: {}", tree.property(property_id).property_path)));
    }
    Ok(table)
}

/// Identity of the sub-object held by `property_id`
pub fn subobject_id(tree: &TypeTree, property_id: PropertyNodeId) -> SubobjectId {
    let id = tree
        .property_chain(property_id)
        .into_iter()
        .fold(0, |seed, link| checksum::combine(seed, tree.property(link).checksum));
    SubobjectId(id)
}

/// Record every type node reached through an owned object reference
pub fn collect_subobjects(tree: &TypeTree) -> Result<SubobjectIndex> {
    let mut index = SubobjectIndex::default();
    let mut clash = None;
    tree.visit_properties(tree.root(), true, &mut |property_id, property| {
        if let (true, Some(nested)) = (property.class.is_object(), property.type_node) {
            let id = subobject_id(tree, property_id);
            if index.get(id).is_some() {
                clash.get_or_insert((id, property_id));
            }
            index.entries.push((id, nested));
        }
        true
    });

    if let Some((id, property_id)) = clash {
        return Err(Report::new(Error::invalid(
            "sub-object identity",
            format!("{id} is shared by {}", tree.property(property_id).property_path),
        )));
    }
    Ok(index)
}

/// Group every RPC of the full tree by routing category, in traversal order
pub fn rpcs_by_type(tree: &TypeTree) -> BTreeMap<RpcType, Vec<RpcNodeId>> {
    let mut types = vec![tree.root()];
    tree.visit_properties(tree.root(), true, &mut |_, property| {
        types.extend(property.type_node);
        true
    });

    let mut grouped: BTreeMap<RpcType, Vec<RpcNodeId>> = BTreeMap::new();
    for type_id in types {
        for &rpc_id in &tree.type_node(type_id).rpcs {
            grouped.entry(tree.rpc(rpc_id).rpc_type).or_default().push(rpc_id);
        }
    }
    grouped
}
