//! Arena holding every node built for one root type

use super::nodes::{PropertyNode, PropertyNodeId, RpcNode, RpcNodeId, TypeNode, TypeNodeId};
use crate::naming::FIELD_NAME_SEPARATOR;

/// The type tree of one root type.
///
/// All nodes of a generation run for that root are stored here and addressed by id, so
/// upward links never keep anything alive and the tree has no reference cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTree {
    types:      Vec<TypeNode>,
    properties: Vec<PropertyNode>,
    rpcs:       Vec<RpcNode>,
    root:       TypeNodeId,
}

impl TypeTree {
    /// Create an empty tree; the builder adds the root as its first type node
    pub(super) const fn empty() -> Self {
        Self {
            types:      Vec::new(),
            properties: Vec::new(),
            rpcs:       Vec::new(),
            root:       TypeNodeId(0),
        }
    }

    pub(super) fn push_type(&mut self, node: TypeNode) -> TypeNodeId {
        self.types.push(node);
        TypeNodeId(self.types.len() - 1)
    }

    pub(super) fn push_property(&mut self, node: PropertyNode) -> PropertyNodeId {
        self.properties.push(node);
        PropertyNodeId(self.properties.len() - 1)
    }

    pub(super) fn push_rpc(&mut self, node: RpcNode) -> RpcNodeId {
        self.rpcs.push(node);
        RpcNodeId(self.rpcs.len() - 1)
    }

    pub(super) fn type_node_mut(&mut self, id: TypeNodeId) -> &mut TypeNode {
        &mut self.types[id.0]
    }

    pub(super) fn property_mut(&mut self, id: PropertyNodeId) -> &mut PropertyNode {
        &mut self.properties[id.0]
    }

    /// Id of the root type node
    pub const fn root(&self) -> TypeNodeId {
        self.root
    }

    /// Type node by id
    pub fn type_node(&self, id: TypeNodeId) -> &TypeNode {
        &self.types[id.0]
    }

    /// Property node by id
    pub fn property(&self, id: PropertyNodeId) -> &PropertyNode {
        &self.properties[id.0]
    }

    /// RPC node by id
    pub fn rpc(&self, id: RpcNodeId) -> &RpcNode {
        &self.rpcs[id.0]
    }

    /// Every type node, in creation order (depth-first, root first)
    pub fn type_nodes(&self) -> impl Iterator<Item = (TypeNodeId, &TypeNode)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, node)| (TypeNodeId(index), node))
    }

    /// Every property node, in creation order
    pub fn property_nodes(&self) -> impl Iterator<Item = (PropertyNodeId, &PropertyNode)> {
        self.properties
            .iter()
            .enumerate()
            .map(|(index, node)| (PropertyNodeId(index), node))
    }

    /// Depth-first visit of the properties under `type_id`, in declaration order.
    ///
    /// The visitor's return value decides whether to descend into the property's nested
    /// type. Embedded structs are always descended into since they are inlined into their
    /// container; owned sub-objects only when `recurse_into_subobjects` is set.
    pub fn visit_properties<F>(&self, type_id: TypeNodeId, recurse_into_subobjects: bool, visitor: &mut F)
    where
        F: FnMut(PropertyNodeId, &PropertyNode) -> bool,
    {
        for &property_id in &self.type_node(type_id).properties {
            let property = self.property(property_id);
            if !visitor(property_id, property) {
                continue;
            }
            if let Some(nested) = property.type_node {
                if recurse_into_subobjects || property.class.is_struct() {
                    self.visit_properties(nested, recurse_into_subobjects, visitor);
                }
            }
        }
    }

    /// Properties under `type_id` that share its replication layout: its own properties and
    /// those of embedded structs, but not those of owned sub-objects
    pub fn flat_properties(&self, type_id: TypeNodeId) -> Vec<PropertyNodeId> {
        let mut flat = Vec::new();
        self.visit_properties(type_id, false, &mut |property_id, _| {
            flat.push(property_id);
            true
        });
        flat
    }

    /// Type nodes with their own replication layout: the root and every owned sub-object,
    /// in depth-first order. Embedded structs are not included since their properties
    /// belong to the layout of the enclosing class.
    pub fn layout_roots(&self) -> Vec<TypeNodeId> {
        let mut roots = vec![self.root];
        self.visit_properties(self.root, true, &mut |_, property| {
            if let (true, Some(nested)) = (property.class.is_object(), property.type_node) {
                roots.push(nested);
            }
            true
        });
        roots
    }

    /// The layout root whose flat property list contains `property`, walking up through
    /// embedded structs. `None` for RPC parameters.
    pub fn layout_owner(&self, property: PropertyNodeId) -> Option<TypeNodeId> {
        let mut owner = self.property(property).container?;
        while let Some(parent) = self.type_node(owner).parent_property {
            let parent = self.property(parent);
            if !parent.class.is_struct() {
                break;
            }
            owner = parent.container?;
        }
        Some(owner)
    }

    /// Properties from the root down to `leaf`.
    ///
    /// For `foo -> bar -> baz` this returns `[foo, bar, baz]`. RPC parameters have no
    /// container, so the chain of a parameter starts at the parameter itself.
    pub fn property_chain(&self, leaf: PropertyNodeId) -> Vec<PropertyNodeId> {
        let mut chain = vec![leaf];
        let mut current = self.property(leaf);
        while let Some(parent) = current
            .container
            .and_then(|container| self.type_node(container).parent_property)
        {
            chain.push(parent);
            current = self.property(parent);
        }
        chain.reverse();
        chain
    }

    /// Schema field name of `leaf`: the sanitized names of its property chain joined
    /// root to leaf, so fields of different sub-objects never collide with each other or
    /// with fields the root inherits
    pub fn schema_field_name(&self, leaf: PropertyNodeId) -> String {
        self.property_chain(leaf)
            .into_iter()
            .map(|id| self.property(id).schema_name.as_str())
            .collect::<Vec<_>>()
            .join(FIELD_NAME_SEPARATOR)
    }
}
