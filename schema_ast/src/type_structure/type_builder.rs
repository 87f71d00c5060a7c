//! Builds the type tree of a root class by walking its reflection data depth-first.
//!
//! Every field slot becomes a property node. The walk continues into a field's nested type
//! only when the ownership policy in [`super::ownership`] allows it; RPC parameters go through
//! the same property builder but never recurse into objects. Struct fields inherit the
//! struct property's checksum as their parent checksum, matching how the replication layout
//! inlines structs. Owned sub-objects start from 0 since each object gets its own layout.

use std::collections::HashSet;

use error_stack::Report;
use tracing::{debug, warn};

use super::nodes::{PropertyNodeId, RpcNode, RpcNodeId, TypeNode, TypeNodeId};
use super::ownership::{OwnershipEdge, Traversal, field_traversal, target_allows_recursion};
use super::property_builder::build_property;
use super::recursion_context::RecursionContext;
use super::tree::TypeTree;
use crate::config::{CyclePolicy, GeneratorConfig};
use crate::error::{Error, Result};
use crate::reflection::{FunctionFlag, ReflectedField, ReflectedFunction, ReflectedType, ReflectionSource, TypePath};
use crate::replication::RpcType;

/// Builds [`TypeTree`]s from reflection data
pub struct TypeTreeBuilder<'a> {
    source: &'a dyn ReflectionSource,
    config: &'a GeneratorConfig,
}

impl<'a> TypeTreeBuilder<'a> {
    /// Create a builder reading from `source`
    pub const fn new(source: &'a dyn ReflectionSource, config: &'a GeneratorConfig) -> Self {
        Self { source, config }
    }

    /// Build the tree rooted at the class `root`
    pub fn build(&self, root: &TypePath) -> Result<TypeTree> {
        let mut ctx = RecursionContext::new(self.source, self.config);
        let reflected = ctx.require_type(root)?;

        let mut tree = TypeTree::empty();
        build_type(&mut tree, &mut ctx, reflected, 0, 0, false, None)?;
        debug!(
            root = %root,
            types = tree.type_nodes().count(),
            properties = tree.property_nodes().count(),
            "Built type tree"
        );
        Ok(tree)
    }
}

/// Sibling names already used within one scope (a type, or an RPC's parameter list)
struct NameScope<'s> {
    scope: &'s str,
    names: HashSet<String>,
}

impl<'s> NameScope<'s> {
    fn new(scope: &'s str) -> Self {
        Self {
            scope,
            names: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> Result<()> {
        if self.names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(Report::new(Error::NameCollision {
                scope: self.scope.to_string(),
                name:  name.to_string(),
            }))
        }
    }
}

fn build_type(
    tree: &mut TypeTree,
    ctx: &mut RecursionContext<'_>,
    reflected: &ReflectedType,
    parent_checksum: u32,
    static_array_index: u32,
    is_rpc: bool,
    parent_property: Option<PropertyNodeId>,
) -> Result<TypeNodeId> {
    ctx.enter(&reflected.path);

    let type_id = tree.push_type(TypeNode {
        object_path: reflected.path.clone(),
        name: reflected.name.clone(),
        category: reflected.category,
        is_actor_class: reflected.is_actor,
        is_actor_component: reflected.is_actor_component,
        editor_only: reflected.editor_only,
        static_array_index,
        properties: Vec::new(),
        rpcs: Vec::new(),
        parent_property,
    });

    let mut scope = NameScope::new(reflected.path.as_str());
    for field in &reflected.fields {
        for index in 0..field.array_dim {
            let property = build_property(
                field,
                reflected.path.as_str(),
                Some(type_id),
                parent_checksum,
                index,
            );
            scope.claim(&property.schema_name)?;

            let property_id = tree.push_property(property);
            tree.type_node_mut(type_id).properties.push(property_id);
            build_nested(tree, ctx, field, property_id, is_rpc)?;
        }
    }

    if !is_rpc {
        for function in reflected.rpcs() {
            let rpc_id = build_rpc(tree, ctx, reflected, type_id, function)?;
            tree.type_node_mut(type_id).rpcs.push(rpc_id);
        }
    }

    ctx.leave();
    Ok(type_id)
}

/// Recurse into the nested type of `property_id` if the ownership policy allows it
fn build_nested(
    tree: &mut TypeTree,
    ctx: &mut RecursionContext<'_>,
    field: &ReflectedField,
    property_id: PropertyNodeId,
    is_rpc: bool,
) -> Result<()> {
    let (target_path, edge) = match field_traversal(field, is_rpc, ctx.skip_editor_only) {
        Traversal::Candidate { target, edge } => (target, edge),
        Traversal::Stop(reason) => {
            debug!(property = %tree.property(property_id).property_path, %reason, "Not recursing");
            return Ok(());
        }
    };

    let target = ctx.require_type(target_path)?;
    if let Err(reason) = target_allows_recursion(target, edge, ctx.skip_editor_only) {
        debug!(property = %tree.property(property_id).property_path, %reason, "Not recursing");
        return Ok(());
    }

    if let Some(chain) = ctx.open_chain(target_path) {
        let property_path = &tree.property(property_id).property_path;
        match ctx.cycle_policy {
            CyclePolicy::Truncate => {
                warn!(
                    property = %property_path,
                    target = %target_path,
                    "Cyclic ownership, treating property as a reference"
                );
                return Ok(());
            }
            CyclePolicy::Error => {
                return Err(Report::new(Error::CyclicOwnership { chain })
                    .attach(format!("Property: {property_path}")));
            }
        }
    }

    let property = tree.property(property_id);
    let child_parent_checksum = match edge {
        OwnershipEdge::EmbeddedStruct => property.checksum,
        OwnershipEdge::OwnedObject => 0,
    };
    let child_index = property.static_array_index;
    debug!(
        property = %property.property_path,
        target = %target_path,
        %edge,
        depth = ctx.depth(),
        "Recursing"
    );

    let child = build_type(
        tree,
        ctx,
        target,
        child_parent_checksum,
        child_index,
        is_rpc,
        Some(property_id),
    )?;
    tree.property_mut(property_id).type_node = Some(child);
    Ok(())
}

fn build_rpc(
    tree: &mut TypeTree,
    ctx: &mut RecursionContext<'_>,
    caller: &ReflectedType,
    caller_id: TypeNodeId,
    function: &ReflectedFunction,
) -> Result<RpcNodeId> {
    let owner_path = format!("{}.{}", caller.path, function.name);
    let mut scope = NameScope::new(&owner_path);

    let mut parameters = Vec::new();
    for parameter in &function.parameters {
        for index in 0..parameter.array_dim {
            let property = build_property(parameter, &owner_path, None, 0, index);
            scope.claim(&property.schema_name)?;

            let property_id = tree.push_property(property);
            build_nested(tree, ctx, parameter, property_id, true)?;
            parameters.push(property_id);
        }
    }

    Ok(tree.push_rpc(RpcNode {
        caller_type: caller.path.clone(),
        caller: caller_id,
        function_name: function.name.clone(),
        rpc_type: RpcType::from_function(function),
        reliable: function.has_flag(FunctionFlag::NetReliable),
        parameters,
    }))
}
