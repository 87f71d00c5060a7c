//! Schema data types for reflected fields

use crate::reflection::{FieldKind, Primitive};

/// Schema type of an object reference
pub const OBJECT_REF_SCHEMA_TYPE: &str = "UnrealObjectRef";

/// Schema type of values serialized as an opaque blob
pub const BYTES_SCHEMA_TYPE: &str = "bytes";

const fn primitive_schema_type(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Bool => "bool",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::Int8 | Primitive::Int16 | Primitive::Int32 => "int32",
        Primitive::Int64 => "int64",
        Primitive::UInt8 | Primitive::UInt16 | Primitive::UInt32 => "uint32",
        Primitive::UInt64 => "uint64",
        Primitive::String | Primitive::Name | Primitive::Text => "string",
    }
}

/// Schema type a field of `kind` is written as.
///
/// Structs map to `bytes`: a struct that is flattened into its fields never has its own
/// value written, so the type only matters for structs sent as one opaque value.
pub fn schema_type(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Scalar { primitive } => primitive_schema_type(*primitive).to_string(),
        FieldKind::Enum { underlying } => primitive_schema_type(*underlying).to_string(),
        FieldKind::Object { .. } => OBJECT_REF_SCHEMA_TYPE.to_string(),
        FieldKind::Struct { .. } => BYTES_SCHEMA_TYPE.to_string(),
        FieldKind::Array { inner } => format!("list<{}>", schema_type(inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{Ownership, TypePath};

    #[test]
    fn test_scalar_and_enum_types() {
        assert_eq!(
            schema_type(&FieldKind::Scalar {
                primitive: Primitive::UInt8,
            }),
            "uint32"
        );
        assert_eq!(
            schema_type(&FieldKind::Scalar {
                primitive: Primitive::Name,
            }),
            "string"
        );
        assert_eq!(
            schema_type(&FieldKind::Enum {
                underlying: Primitive::Int16,
            }),
            "int32"
        );
    }

    #[test]
    fn test_reference_and_container_types() {
        let object = FieldKind::Object {
            class:     TypePath::from("/Game/Weapon"),
            ownership: Ownership::Weak,
        };
        assert_eq!(schema_type(&object), OBJECT_REF_SCHEMA_TYPE);
        assert_eq!(
            schema_type(&FieldKind::Array {
                inner: Box::new(object),
            }),
            "list<UnrealObjectRef>"
        );
        assert_eq!(
            schema_type(&FieldKind::Struct {
                struct_path: TypePath::from("/Script/CoreUObject.Vector"),
            }),
            BYTES_SCHEMA_TYPE
        );
    }
}
