//! Reflected type descriptions consumed by the type tree builder
//!
//! These mirror what the host engine's reflection system exposes about a class or struct:
//! its fields in declaration order, their kinds and flags, and its network functions.
//! They deserialize from the JSON reflection dumps the host tooling writes.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// A fully-qualified reflected type path such as `/Script/Engine.Character`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TypePath(String);

impl TypePath {
    /// Create a type path from any string-like value
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get the underlying string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, after the final `.` or `/`
    /// For example: `/Script/Engine.Character` returns `Character`
    pub fn short_name(&self) -> &str {
        self.0
            .rsplit(['.', '/'])
            .next()
            .unwrap_or(&self.0)
    }
}

impl Display for TypePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for TypePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Whether a reflected type is a class (an object with its own identity) or a plain struct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Object class; instances are separate objects referenced by pointer
    #[default]
    Class,
    /// Value struct; instances are embedded in their container
    Struct,
}

/// Primitive value types a scalar or enum field can hold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Primitive {
    /// `bool`
    Bool,
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    UInt8,
    /// `uint16`
    UInt16,
    /// `uint32`
    UInt32,
    /// `uint64`
    UInt64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `FString`
    String,
    /// `FName`
    Name,
    /// `FText`
    Text,
}

/// How an object-reference field relates to the object it points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// The container created and owns the referenced object (a default sub-object)
    Owned,
    /// A back or peer reference, such as a pointer to the owning actor or its controller
    #[default]
    Weak,
}

/// Declared kind of a reflected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain value
    Scalar {
        /// Value type
        primitive: Primitive,
    },
    /// Enumeration stored as its underlying integer
    Enum {
        /// Underlying integer type
        underlying: Primitive,
    },
    /// Pointer to another object
    Object {
        /// Declared class of the referenced object
        class:     TypePath,
        /// Whether the container owns the referenced object
        #[serde(default)]
        ownership: Ownership,
    },
    /// Embedded struct value
    Struct {
        /// Path of the struct type
        struct_path: TypePath,
    },
    /// Dynamic array
    Array {
        /// Element kind
        inner: Box<FieldKind>,
    },
}

/// Per-field flags from the reflection metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "mirrors the independent property flags of the reflection data"
)]
pub struct FieldFlags {
    /// Replicated to clients
    pub replicated:     bool,
    /// Handed over between authoritative servers
    pub handover:       bool,
    /// Not serialized to disk
    pub transient:      bool,
    /// Exists only in editor builds
    pub editor_only:    bool,
    /// Never traverse into the field's nested type, whatever its ownership
    pub skip_traversal: bool,
}

/// A single reflected field or function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedField {
    /// Declared name
    pub name:      String,
    /// C++ type spelling, part of the checksum
    pub cpp_type:  String,
    /// Declared kind
    pub kind:      FieldKind,
    /// Fixed array dimension, 1 for non-array fields
    #[serde(default = "default_array_dim")]
    pub array_dim: u32,
    /// Reflection flags
    #[serde(default)]
    pub flags:     FieldFlags,
}

const fn default_array_dim() -> u32 {
    1
}

/// Network function flags that classify an RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
pub enum FunctionFlag {
    /// Function is a network function at all
    Net,
    /// Executed on the owning client
    NetClient,
    /// Executed on the server
    NetServer,
    /// Executed on another server worker
    NetCrossServer,
    /// Executed on the server and every client
    NetMulticast,
    /// Delivery is guaranteed
    NetReliable,
}

/// Tags that say where a network function runs
const ROUTING_FLAGS: [FunctionFlag; 4] = [
    FunctionFlag::NetClient,
    FunctionFlag::NetServer,
    FunctionFlag::NetCrossServer,
    FunctionFlag::NetMulticast,
];

/// A reflected member function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedFunction {
    /// Function name
    pub name:       String,
    /// Calling-convention tags
    #[serde(default)]
    pub flags:      Vec<FunctionFlag>,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ReflectedField>,
}

impl ReflectedFunction {
    /// Whether the function carries `flag`
    pub fn has_flag(&self, flag: FunctionFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Whether the function is a remote procedure call: a network function with at least
    /// one routing tag
    pub fn is_rpc(&self) -> bool {
        self.has_flag(FunctionFlag::Net) && ROUTING_FLAGS.iter().any(|flag| self.has_flag(*flag))
    }
}

/// A reflected class or struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "mirrors the independent class flags of the reflection data"
)]
pub struct ReflectedType {
    /// Fully-qualified path
    pub path:                 TypePath,
    /// Display name
    pub name:                 String,
    /// Class or struct
    #[serde(default)]
    pub category:             TypeCategory,
    /// The class derives from the engine's actor class
    #[serde(default)]
    pub is_actor:             bool,
    /// The class derives from the engine's actor component class
    #[serde(default)]
    pub is_actor_component:   bool,
    /// Exists only in editor builds
    #[serde(default)]
    pub editor_only:          bool,
    /// Struct provides its own network serializer and is sent as one opaque value
    #[serde(default)]
    pub native_net_serialize: bool,
    /// Fields in declaration order
    #[serde(default)]
    pub fields:               Vec<ReflectedField>,
    /// Member functions in declaration order
    #[serde(default)]
    pub functions:            Vec<ReflectedFunction>,
}

impl ReflectedType {
    /// Whether the type is a class rather than a struct
    pub fn is_class(&self) -> bool {
        self.category == TypeCategory::Class
    }

    /// Network functions declared on this type
    pub fn rpcs(&self) -> impl Iterator<Item = &ReflectedFunction> {
        self.functions.iter().filter(|function| function.is_rpc())
    }
}
