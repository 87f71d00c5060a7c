//! Attaching replication and handover data to property nodes
//!
//! The replication layout is computed per class outside of the type tree. Its records
//! carry the checksum of the field they describe, so merging is a lookup of that checksum
//! among the flat properties of the class. A record that matches nothing means the two
//! computations disagree about the class and is reported, never dropped.

use std::collections::HashMap;

use error_stack::Report;
use tracing::{debug, warn};

use super::nodes::{HandoverInfo, NetData, PropertyNodeId, ReplicationInfo, TypeNodeId};
use super::tree::TypeTree;
use crate::error::{Error, Result};
use crate::replication::{HandoverRecord, RepLayoutCmdType, RepLayoutRecord};

/// Checksum to property lookup over the flat properties of one layout root
fn checksum_index(tree: &TypeTree, type_id: TypeNodeId) -> Result<HashMap<u32, PropertyNodeId>> {
    let mut index = HashMap::new();
    for property_id in tree.flat_properties(type_id) {
        let property = tree.property(property_id);
        if let Some(previous) = index.insert(property.checksum, property_id) {
            return Err(Report::new(Error::invalid(
                "checksum",
                format!(
                    "{} and {} share checksum {:#010x}",
                    tree.property(previous).property_path,
                    property.property_path,
                    property.checksum
                ),
            )));
        }
    }
    Ok(index)
}

/// Turn the unmatched checksums of a merge into one report, the first as the error and the
/// rest attached
fn mismatch_report(tree: &TypeTree, type_id: TypeNodeId, unmatched: &[u32]) -> Option<Report<Error>> {
    let type_path = &tree.type_node(type_id).object_path;
    let (first, rest) = unmatched.split_first()?;
    let mut report = Report::new(Error::StructuralMismatch {
        type_path: type_path.clone(),
        checksum:  *first,
    });
    for checksum in rest {
        report = report.attach(format!("Also unmatched: {checksum:#010x}"));
    }
    Some(report)
}

/// Advance past the element commands of a dynamic array whose header was just consumed,
/// including its `Return`. Nested arrays carry their own `Return`.
fn skip_array_elements(records: &mut std::slice::Iter<'_, RepLayoutRecord>) {
    let mut depth = 1_usize;
    for record in records {
        match record.cmd_type {
            RepLayoutCmdType::DynamicArray => depth += 1,
            RepLayoutCmdType::Return => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Attach replication data from `records` to the flat properties of `type_id`.
///
/// `type_id` must be a layout root (see [`TypeTree::layout_roots`]). Returns the number of
/// properties that received replication data.
pub fn merge_replication_layout(
    tree: &mut TypeTree,
    type_id: TypeNodeId,
    records: &[RepLayoutRecord],
) -> Result<usize> {
    let index = checksum_index(tree, type_id)?;

    let mut unmatched = Vec::new();
    let mut merged = 0;
    let mut records = records.iter();
    while let Some(record) = records.next() {
        // Terminates an array's element commands; describes no property
        if record.cmd_type == RepLayoutCmdType::Return {
            continue;
        }
        // Array elements are not part of the tree
        if record.cmd_type == RepLayoutCmdType::DynamicArray {
            skip_array_elements(&mut records);
        }
        let Some(&property_id) = index.get(&record.checksum) else {
            unmatched.push(record.checksum);
            continue;
        };

        let property = tree.property_mut(property_id);
        if property.replication().is_some() {
            return Err(Report::new(Error::invalid(
                "replication layout",
                format!("{} has more than one record", property.property_path),
            )));
        }
        property.net = Some(NetData::Replicated(ReplicationInfo {
            cmd_type:             record.cmd_type,
            handle:               record.handle,
            role_swap_handle:     record.role_swap_handle,
            array_index:          property.static_array_index,
            condition:            record.condition,
            rep_notify_condition: record.rep_notify_condition,
        }));
        merged += 1;
    }

    if let Some(report) = mismatch_report(tree, type_id, &unmatched) {
        return Err(report);
    }
    debug!(
        type_path = %tree.type_node(type_id).object_path,
        merged,
        "Merged replication layout"
    );
    Ok(merged)
}

/// Attach handover data from `records` to the flat properties of `type_id`.
///
/// Records that land on a replicated property are skipped with a warning since a
/// property is never both replicated and handed over. Returns the number of properties
/// that received handover data.
pub fn merge_handover_layout(tree: &mut TypeTree, type_id: TypeNodeId, records: &[HandoverRecord]) -> Result<usize> {
    let index = checksum_index(tree, type_id)?;

    let mut unmatched = Vec::new();
    let mut merged = 0;
    for record in records {
        let Some(&property_id) = index.get(&record.checksum) else {
            unmatched.push(record.checksum);
            continue;
        };

        let property = tree.property_mut(property_id);
        if property.flags.replicated || property.replication().is_some() {
            warn!(
                property = %property.property_path,
                handle = record.handle,
                "Handover record targets a replicated property, skipping"
            );
            continue;
        }
        property.net = Some(NetData::Handover(HandoverInfo {
            handle: record.handle,
        }));
        merged += 1;
    }

    if let Some(report) = mismatch_report(tree, type_id, &unmatched) {
        return Err(report);
    }
    Ok(merged)
}

/// Handover records for a whole tree, grouped by layout root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoverLayout {
    entries: Vec<(TypeNodeId, Vec<HandoverRecord>)>,
}

impl HandoverLayout {
    /// Number handover-eligible properties of the full tree.
    ///
    /// Handles run from 1 in depth-first declaration order across the root and all owned
    /// sub-objects, so they are unique within the tree. Replicated properties are never
    /// eligible. A handed-over struct travels as a whole, so its fields are not numbered.
    pub fn compute(tree: &TypeTree) -> Self {
        let mut layout = Self::default();
        let mut next_handle: u16 = 1;

        tree.visit_properties(tree.root(), true, &mut |property_id, property| {
            // Fields of a replicated struct travel with it
            if property.flags.replicated {
                return !property.class.is_struct();
            }
            if !property.flags.handover {
                return true;
            }
            let Some(owner) = tree.layout_owner(property_id) else {
                return true;
            };
            layout.push(owner, HandoverRecord {
                checksum: property.checksum,
                handle:   next_handle,
            });
            next_handle = next_handle.saturating_add(1);
            !property.class.is_struct()
        });
        layout
    }

    fn push(&mut self, owner: TypeNodeId, record: HandoverRecord) {
        match self.entries.iter_mut().find(|(id, _)| *id == owner) {
            Some((_, records)) => records.push(record),
            None => self.entries.push((owner, vec![record])),
        }
    }

    /// Records belonging to the layout root `type_id`
    pub fn records_for(&self, type_id: TypeNodeId) -> &[HandoverRecord] {
        self.entries
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, records)| records.as_slice())
            .unwrap_or_default()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    /// No property is handed over
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge every record into `tree`. Returns the number of properties handed over.
    pub fn apply(&self, tree: &mut TypeTree) -> Result<usize> {
        let mut merged = 0;
        for (type_id, records) in &self.entries {
            merged += merge_handover_layout(tree, *type_id, records)?;
        }
        Ok(merged)
    }
}
