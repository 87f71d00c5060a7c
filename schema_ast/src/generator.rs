//! Runs the full pipeline for one or many root types
//!
//! For each root: build the type tree, merge the replication layout of every layout root
//! (the root class and each owned sub-object), number and merge handover properties, then
//! flatten. A failure aborts only the root it happened in; batch runs keep going and report
//! every failure at the end.

use std::collections::BTreeMap;
use std::thread;

use error_stack::{Report, ResultExt};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::naming::{SchemaNames, rpc_name};
use crate::reflection::{ReflectionSource, TypePath};
use crate::replication::{RepLayoutSource, ReplicatedPropertyGroup, RpcType};
use crate::type_structure::{
    FlatHandoverTable, FlatReplicatedTable, HandoverLayout, PropertyNodeId, RpcNodeId, SubobjectId, SubobjectIndex,
    TypeNodeId, TypeTree, TypeTreeBuilder, collect_subobjects, flatten_handover, flatten_replicated,
    merge_replication_layout, rpcs_by_type,
};

/// Everything generated for one root type
#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    /// Root class
    pub root:                 TypePath,
    /// Merged type tree
    pub tree:                 TypeTree,
    /// Replicated properties of the root class
    pub replicated:           FlatReplicatedTable,
    /// Replicated properties of each owned sub-object, in sub-object order
    pub subobject_replicated: Vec<(SubobjectId, FlatReplicatedTable)>,
    /// Handed-over properties of the full tree
    pub handover:             FlatHandoverTable,
    /// Owned sub-objects of the full tree
    pub subobjects:           SubobjectIndex,
    /// RPCs of the full tree by routing category
    pub rpcs_by_type:         BTreeMap<RpcType, Vec<RpcNodeId>>,
}

/// Serializable view of one schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    /// Field name, unique within the root's schema
    pub name:          String,
    /// Schema data type
    pub data_type:     String,
    /// Declaring path of the property
    pub property_path: String,
}

/// Serializable view of one replicated component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicatedComponentSummary {
    /// Component name, if the class has an assigned schema name
    pub component: Option<String>,
    /// Class whose layout this is
    pub class:     TypePath,
    /// Sub-object identity; `None` for the root class
    pub subobject: Option<SubobjectId>,
    /// Audience group
    pub group:     ReplicatedPropertyGroup,
    /// Fields by handle
    pub fields:    BTreeMap<u16, FieldSummary>,
}

/// Serializable view of a [`GeneratedSchema`], as printed by `schema_dump`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    /// Root class
    pub root:               TypePath,
    /// Replicated components, root class first
    pub replicated:         Vec<ReplicatedComponentSummary>,
    /// Handover component name, if the root has an assigned schema name
    pub handover_component: Option<String>,
    /// Handed-over fields by handle
    pub handover:           BTreeMap<u16, FieldSummary>,
    /// Sub-objects with their classes
    pub subobjects:         Vec<(SubobjectId, TypePath)>,
    /// RPC schema names by routing category
    pub rpcs:               BTreeMap<RpcType, Vec<String>>,
}

impl GeneratedSchema {
    fn field_summary(&self, property_id: PropertyNodeId) -> FieldSummary {
        let property = self.tree.property(property_id);
        FieldSummary {
            name:          self.tree.schema_field_name(property_id),
            data_type:     property.data_type.clone(),
            property_path: property.property_path.clone(),
        }
    }

    fn component_summaries(
        &self,
        names: &SchemaNames,
        type_id: TypeNodeId,
        subobject: Option<SubobjectId>,
        table: &FlatReplicatedTable,
    ) -> Vec<ReplicatedComponentSummary> {
        let class = &self.tree.type_node(type_id).object_path;
        table
            .groups()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(group, entries)| ReplicatedComponentSummary {
                component: names.replicated_data_name(group, class),
                class: class.clone(),
                subobject,
                group,
                fields: entries
                    .iter()
                    .map(|(handle, id)| (*handle, self.field_summary(*id)))
                    .collect(),
            })
            .collect()
    }

    /// Serializable summary, naming components with `names`
    pub fn summary(&self, names: &SchemaNames) -> SchemaSummary {
        let mut replicated = self.component_summaries(names, self.tree.root(), None, &self.replicated);
        for (id, table) in &self.subobject_replicated {
            if let Some(type_id) = self.subobjects.get(*id) {
                replicated.extend(self.component_summaries(names, type_id, Some(*id), table));
            }
        }

        SchemaSummary {
            root: self.root.clone(),
            replicated,
            handover_component: names.handover_data_name(&self.root),
            handover: self
                .handover
                .iter()
                .map(|(handle, id)| (handle, self.field_summary(id)))
                .collect(),
            subobjects: self
                .subobjects
                .iter()
                .map(|(id, type_id)| (id, self.tree.type_node(type_id).object_path.clone()))
                .collect(),
            rpcs: self
                .rpcs_by_type
                .iter()
                .map(|(rpc_type, ids)| {
                    let rpc_names = ids
                        .iter()
                        .map(|id| rpc_name(&self.tree.rpc(*id).function_name))
                        .collect_vec();
                    (*rpc_type, rpc_names)
                })
                .collect(),
        }
    }

    /// Classes that get their own schema components: the root and every sub-object class
    fn component_classes(&self) -> impl Iterator<Item = &TypePath> {
        std::iter::once(&self.root).chain(
            self.subobjects
                .iter()
                .map(|(_, type_id)| &self.tree.type_node(type_id).object_path),
        )
    }
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct GenerationReport {
    /// Roots generated successfully, in input order
    pub generated:    Vec<GeneratedSchema>,
    /// Roots that failed, in input order
    pub failed:       Vec<(TypePath, Report<Error>)>,
    /// Schema names of every class in `generated`
    pub schema_names: SchemaNames,
}

impl GenerationReport {
    /// No root failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Summaries of every generated root
    pub fn summaries(&self) -> Vec<SchemaSummary> {
        self.generated
            .iter()
            .map(|schema| schema.summary(&self.schema_names))
            .collect()
    }

    /// The generated schemas, or an error if any root failed. The first failure is the
    /// error and the others are attached to it.
    pub fn into_result(self) -> Result<Vec<GeneratedSchema>> {
        let mut failures = self.failed.into_iter();
        let Some((root, first)) = failures.next() else {
            return Ok(self.generated);
        };
        let mut combined = first.attach(format!("Root: {root}"));
        for (root, err) in failures {
            combined = combined.attach(format!("Also failed: {root}: {}", err.current_context()));
        }
        Err(combined)
    }
}

/// Generates schemas from a reflection source and the engine's replication layouts
pub struct Generator<'a> {
    reflection: &'a dyn ReflectionSource,
    layouts:    &'a dyn RepLayoutSource,
    config:     &'a GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Create a generator
    pub const fn new(
        reflection: &'a dyn ReflectionSource,
        layouts: &'a dyn RepLayoutSource,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            reflection,
            layouts,
            config,
        }
    }

    /// Generate the schema of one root type
    pub fn generate(&self, root: &TypePath) -> Result<GeneratedSchema> {
        let mut tree = TypeTreeBuilder::new(self.reflection, self.config).build(root)?;

        for type_id in tree.layout_roots() {
            let class = tree.type_node(type_id).object_path.clone();
            let Some(records) = self.layouts.layout_for(&class) else {
                debug!(class = %class, "No replication layout");
                continue;
            };
            merge_replication_layout(&mut tree, type_id, records)
                .attach(format!("Merging replication layout of {class}"))?;
        }

        HandoverLayout::compute(&tree).apply(&mut tree)?;

        let replicated = flatten_replicated(&tree, tree.root())?;
        let subobjects = collect_subobjects(&tree)?;
        let subobject_replicated = subobjects
            .iter()
            .map(|(id, type_id)| flatten_replicated(&tree, type_id).map(|table| (id, table)))
            .collect::<Result<Vec<_>>>()?;
        let handover = flatten_handover(&tree)?;
        let rpcs_by_type = rpcs_by_type(&tree);

        info!(
            root = %root,
            replicated = replicated.len(),
            handover = handover.len(),
            subobjects = subobjects.len(),
            "Generated schema"
        );
        Ok(GeneratedSchema {
            root: root.clone(),
            tree,
            replicated,
            subobject_replicated,
            handover,
            subobjects,
            rpcs_by_type,
        })
    }

    fn generate_each(&self, roots: &[TypePath]) -> Vec<(TypePath, Result<GeneratedSchema>)> {
        roots
            .iter()
            .map(|root| (root.clone(), self.generate(root)))
            .collect()
    }

    /// Generate every root, collecting failures instead of stopping at the first.
    ///
    /// With more than one worker thread the roots are split into contiguous chunks, one per
    /// thread. Results keep the input order either way, and schema names are assigned
    /// afterwards in that order, so the output does not depend on the thread count.
    pub fn generate_all(&self, roots: &[TypePath]) -> GenerationReport {
        let workers = self.config.worker_threads.max(1);
        let results = if workers == 1 || roots.len() < 2 {
            self.generate_each(roots)
        } else {
            let chunk_size = roots.len().div_ceil(workers);
            thread::scope(|scope| {
                let handles = roots
                    .chunks(chunk_size)
                    .map(|chunk| scope.spawn(move || self.generate_each(chunk)))
                    .collect_vec();
                handles
                    .into_iter()
                    .flat_map(|handle| match handle.join() {
                        Ok(results) => results,
                        Err(payload) => std::panic::resume_unwind(payload),
                    })
                    .collect_vec()
            })
        };

        let mut report = GenerationReport {
            generated:    Vec::new(),
            failed:       Vec::new(),
            schema_names: SchemaNames::new(self.config.schema_names.clone()),
        };
        for (root, result) in results {
            match result {
                Ok(schema) => {
                    for class in schema.component_classes() {
                        report.schema_names.assign(class);
                    }
                    report.generated.push(schema);
                }
                Err(err) => {
                    error!(root = %root, "Schema generation failed: {err:?}");
                    report.failed.push((root, err));
                }
            }
        }
        report
    }
}
