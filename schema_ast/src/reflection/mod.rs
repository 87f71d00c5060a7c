//! Read-only view of the host engine's reflection data
//!
//! The builder only ever reads reflection data, so one source can be shared across worker
//! threads generating different root types.

mod registry;
mod types;

pub use registry::ReflectionRegistry;
pub use types::{
    FieldFlags, FieldKind, FunctionFlag, Ownership, Primitive, ReflectedField, ReflectedFunction,
    ReflectedType, TypeCategory, TypePath,
};

/// Lookup of reflected types by path
pub trait ReflectionSource: Send + Sync {
    /// Find a reflected class or struct
    fn find_type(&self, path: &TypePath) -> Option<&ReflectedType>;
}
