//! Field classification and the recursion policy
//!
//! The builder only recurses where the container owns what the field points at: an
//! embedded struct, or an object the container created as its own sub-object. References
//! to objects the container does not own (its owning actor, a controller, a peer) stop the
//! walk, as do fields explicitly marked not to be traversed.

use serde::Serialize;
use strum_macros::Display;

use crate::reflection::{FieldKind, Ownership, ReflectedField, ReflectedType, TypePath};

/// Container classification of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Plain value or enum
    Scalar,
    /// Object reference
    Object,
    /// Embedded struct
    Struct,
    /// Dynamic array of non-object elements
    Array,
    /// Dynamic array of object references
    ObjectArray,
}

impl FieldClass {
    /// Classify a declared field kind
    pub fn classify(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Scalar { .. } | FieldKind::Enum { .. } => Self::Scalar,
            FieldKind::Object { .. } => Self::Object,
            FieldKind::Struct { .. } => Self::Struct,
            FieldKind::Array { inner } => match inner.as_ref() {
                FieldKind::Object { .. } => Self::ObjectArray,
                _ => Self::Array,
            },
        }
    }

    /// The field is an object reference
    pub const fn is_object(self) -> bool {
        matches!(self, Self::Object)
    }

    /// The field is an embedded struct
    pub const fn is_struct(self) -> bool {
        matches!(self, Self::Struct)
    }

    /// The field is a dynamic array of any element type
    pub const fn is_array(self) -> bool {
        matches!(self, Self::Array | Self::ObjectArray)
    }

    /// The field is a dynamic array of object references
    pub const fn is_object_array(self) -> bool {
        matches!(self, Self::ObjectArray)
    }
}

/// Kind of edge the builder follows when it recurses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OwnershipEdge {
    /// Into a sub-object the container owns
    OwnedObject,
    /// Into a struct embedded in the container
    EmbeddedStruct,
}

/// Why the builder does not recurse into a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StopReason {
    /// Scalar or dynamic array; nothing to recurse into
    NotComposite,
    /// Reference to an object the container does not own
    WeakReference,
    /// Field is marked not to be traversed
    SkipTraversal,
    /// Object reference passed as an RPC parameter
    RpcObjectParameter,
    /// Editor-only field or class
    EditorOnly,
    /// Struct sent as one opaque value by its own serializer
    NativeNetSerialize,
}

/// First-stage decision, made from the field alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal<'a> {
    /// Recurse into `target` if the target type allows it
    Candidate {
        /// Path of the nested type
        target: &'a TypePath,
        /// Edge being followed
        edge:   OwnershipEdge,
    },
    /// Do not recurse
    Stop(StopReason),
}

/// Decide from the field declaration whether the builder may recurse into it
pub fn field_traversal(field: &ReflectedField, is_rpc: bool, skip_editor_only: bool) -> Traversal<'_> {
    if field.flags.skip_traversal {
        return Traversal::Stop(StopReason::SkipTraversal);
    }
    if skip_editor_only && field.flags.editor_only {
        return Traversal::Stop(StopReason::EditorOnly);
    }

    match &field.kind {
        FieldKind::Struct { struct_path } => Traversal::Candidate {
            target: struct_path,
            edge:   OwnershipEdge::EmbeddedStruct,
        },
        FieldKind::Object { .. } if is_rpc => Traversal::Stop(StopReason::RpcObjectParameter),
        FieldKind::Object {
            class,
            ownership: Ownership::Owned,
        } => Traversal::Candidate {
            target: class,
            edge:   OwnershipEdge::OwnedObject,
        },
        FieldKind::Object {
            ownership: Ownership::Weak,
            ..
        } => Traversal::Stop(StopReason::WeakReference),
        FieldKind::Scalar { .. } | FieldKind::Enum { .. } | FieldKind::Array { .. } => {
            Traversal::Stop(StopReason::NotComposite)
        }
    }
}

/// Second-stage decision, once the nested type has been looked up
pub fn target_allows_recursion(
    target: &ReflectedType,
    edge: OwnershipEdge,
    skip_editor_only: bool,
) -> Result<(), StopReason> {
    match edge {
        OwnershipEdge::EmbeddedStruct if target.native_net_serialize => {
            Err(StopReason::NativeNetSerialize)
        }
        OwnershipEdge::OwnedObject if skip_editor_only && target.editor_only => {
            Err(StopReason::EditorOnly)
        }
        OwnershipEdge::EmbeddedStruct | OwnershipEdge::OwnedObject => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{FieldFlags, Primitive};

    fn field(kind: FieldKind) -> ReflectedField {
        ReflectedField {
            name: "Field".to_string(),
            cpp_type: "T".to_string(),
            kind,
            array_dim: 1,
            flags: FieldFlags::default(),
        }
    }

    fn object(ownership: Ownership) -> FieldKind {
        FieldKind::Object {
            class: TypePath::from("/Game/Component"),
            ownership,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            FieldClass::classify(&FieldKind::Scalar {
                primitive: Primitive::Bool,
            }),
            FieldClass::Scalar
        );
        assert!(FieldClass::classify(&object(Ownership::Weak)).is_object());
        let object_array = FieldClass::classify(&FieldKind::Array {
            inner: Box::new(object(Ownership::Owned)),
        });
        assert!(object_array.is_array());
        assert!(object_array.is_object_array());
        let int_array = FieldClass::classify(&FieldKind::Array {
            inner: Box::new(FieldKind::Scalar {
                primitive: Primitive::Int32,
            }),
        });
        assert!(int_array.is_array());
        assert!(!int_array.is_object_array());
    }

    #[test]
    fn test_owned_object_is_candidate_and_weak_stops() {
        let owned = field(object(Ownership::Owned));
        assert!(matches!(
            field_traversal(&owned, false, true),
            Traversal::Candidate {
                edge: OwnershipEdge::OwnedObject,
                ..
            }
        ));

        let weak = field(object(Ownership::Weak));
        assert_eq!(
            field_traversal(&weak, false, true),
            Traversal::Stop(StopReason::WeakReference)
        );
    }

    #[test]
    fn test_rpc_parameters_never_recurse_into_objects() {
        let owned = field(object(Ownership::Owned));
        assert_eq!(
            field_traversal(&owned, true, true),
            Traversal::Stop(StopReason::RpcObjectParameter)
        );
    }

    #[test]
    fn test_skip_traversal_wins_over_ownership() {
        let mut owned = field(object(Ownership::Owned));
        owned.flags.skip_traversal = true;
        assert_eq!(
            field_traversal(&owned, false, true),
            Traversal::Stop(StopReason::SkipTraversal)
        );
    }

    #[test]
    fn test_editor_only_field_respects_setting() {
        let mut owned = field(object(Ownership::Owned));
        owned.flags.editor_only = true;
        assert_eq!(
            field_traversal(&owned, false, true),
            Traversal::Stop(StopReason::EditorOnly)
        );
        assert!(matches!(
            field_traversal(&owned, false, false),
            Traversal::Candidate { .. }
        ));
    }
}
