//! Builds a single property node from a reflected field slot. Recursion into the field's
//! nested type is left to the type builder.

use super::nodes::{PropertyNode, TypeNodeId};
use super::ownership::FieldClass;
use crate::checksum::checksum;
use crate::data_types::schema_type;
use crate::naming::property_segment_name;
use crate::reflection::ReflectedField;

/// Declaring path of one slot of `field` under `owner_path`
fn property_path(owner_path: &str, field: &ReflectedField, static_array_index: u32) -> String {
    if field.array_dim > 1 {
        format!("{owner_path}.{}[{static_array_index}]", field.name)
    } else {
        format!("{owner_path}.{}", field.name)
    }
}

/// Build the node for slot `static_array_index` of `field`.
///
/// `container` is the declaring type node, or `None` for RPC parameters.
pub fn build_property(
    field: &ReflectedField,
    owner_path: &str,
    container: Option<TypeNodeId>,
    parent_checksum: u32,
    static_array_index: u32,
) -> PropertyNode {
    PropertyNode {
        property_path: property_path(owner_path, field, static_array_index),
        name: field.name.clone(),
        schema_name: property_segment_name(&field.name, field.array_dim, static_array_index),
        cpp_type: field.cpp_type.clone(),
        data_type: schema_type(&field.kind),
        kind: field.kind.clone(),
        class: FieldClass::classify(&field.kind),
        array_dim: field.array_dim,
        static_array_index,
        flags: field.flags,
        type_node: None,
        container,
        net: None,
        checksum: checksum(field, parent_checksum, static_array_index),
        parent_checksum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum_parts;
    use crate::reflection::{FieldFlags, FieldKind, Primitive};

    fn ammo() -> ReflectedField {
        ReflectedField {
            name:      "Ammo_Count".to_string(),
            cpp_type:  "int32".to_string(),
            kind:      FieldKind::Scalar {
                primitive: Primitive::Int32,
            },
            array_dim: 3,
            flags:     FieldFlags {
                replicated: true,
                ..FieldFlags::default()
            },
        }
    }

    #[test]
    fn test_static_array_slot_gets_own_name_path_and_checksum() {
        let field = ammo();
        let first = build_property(&field, "/Game/Pawn", None, 0, 0);
        let third = build_property(&field, "/Game/Pawn", None, 0, 2);

        assert_eq!(first.schema_name, "ammocount0");
        assert_eq!(third.schema_name, "ammocount2");
        assert_eq!(third.property_path, "/Game/Pawn.Ammo_Count[2]");
        assert_ne!(first.checksum, third.checksum);
        assert_eq!(third.checksum, checksum_parts("Ammo_Count", "int32", 0, 2));
        assert_eq!(third.data_type, "int32");
        assert!(third.flags.replicated);
    }

    #[test]
    fn test_single_slot_has_plain_name() {
        let mut field = ammo();
        field.array_dim = 1;
        let node = build_property(&field, "/Game/Pawn", None, 99, 0);

        assert_eq!(node.schema_name, "ammocount");
        assert_eq!(node.property_path, "/Game/Pawn.Ammo_Count");
        assert_eq!(node.parent_checksum, 99);
        assert!(node.type_node.is_none());
        assert!(node.net.is_none());
    }
}
