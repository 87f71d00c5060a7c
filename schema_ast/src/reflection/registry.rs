//! In-memory reflection registry loaded from reflection dumps

use std::collections::HashMap;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde_json::Value;

use super::ReflectionSource;
use super::types::{ReflectedType, TypePath};
use crate::error::{Error, Result};

/// Reflected types keyed by path
#[derive(Debug, Clone, Default)]
pub struct ReflectionRegistry {
    types: HashMap<TypePath, ReflectedType>,
}

impl ReflectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from reflected types, rejecting duplicate paths
    pub fn from_types(types: impl IntoIterator<Item = ReflectedType>) -> Result<Self> {
        let mut registry = Self::new();
        for reflected in types {
            registry.insert(reflected)?;
        }
        Ok(registry)
    }

    /// Build a registry from a JSON array of reflected types
    pub fn from_json(value: Value) -> Result<Self> {
        let types: Vec<ReflectedType> = serde_json::from_value(value)
            .change_context(Error::invalid("reflection dump", "not an array of types"))?;
        Self::from_types(types)
    }

    /// Load a registry from a JSON file holding an array of reflected types
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Report::new(Error::io_failed("read", path, e)))?;
        let value: Value = serde_json::from_str(&contents)
            .change_context(Error::invalid("reflection dump", path.display()))?;
        Self::from_json(value)
    }

    /// Add a type, failing if its path is already registered
    pub fn insert(&mut self, reflected: ReflectedType) -> Result<()> {
        if self.types.contains_key(&reflected.path) {
            return Err(Report::new(Error::invalid(
                "reflection dump",
                format!("type '{}' declared twice", reflected.path),
            )));
        }
        self.types.insert(reflected.path.clone(), reflected);
        Ok(())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ReflectionSource for ReflectionRegistry {
    fn find_type(&self, path: &TypePath) -> Option<&ReflectedType> {
        self.types.get(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests")]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::reflection::{FieldKind, Ownership, Primitive, TypeCategory};

    fn pawn_dump() -> Value {
        json!([
            {
                "path": "/Game/Pawn",
                "name": "Pawn",
                "is_actor": true,
                "fields": [
                    {
                        "name": "Health",
                        "cpp_type": "float",
                        "kind": { "type": "scalar", "primitive": "float" },
                        "flags": { "replicated": true }
                    },
                    {
                        "name": "Inventory",
                        "cpp_type": "UInventory*",
                        "kind": { "type": "object", "class": "/Game/Inventory", "ownership": "owned" }
                    }
                ]
            },
            {
                "path": "/Game/Inventory",
                "name": "Inventory",
                "is_actor_component": true
            }
        ])
    }

    #[test]
    fn test_from_json_reads_types_and_defaults() {
        let registry = ReflectionRegistry::from_json(pawn_dump()).expect("valid dump");
        assert_eq!(registry.len(), 2);

        let pawn = registry
            .find_type(&TypePath::from("/Game/Pawn"))
            .expect("pawn registered");
        assert!(pawn.is_actor);
        assert_eq!(pawn.category, TypeCategory::Class);
        assert_eq!(pawn.fields[0].array_dim, 1);
        assert_eq!(
            pawn.fields[0].kind,
            FieldKind::Scalar {
                primitive: Primitive::Float,
            }
        );
        assert!(pawn.fields[0].flags.replicated);
        assert_eq!(
            pawn.fields[1].kind,
            FieldKind::Object {
                class:     TypePath::from("/Game/Inventory"),
                ownership: Ownership::Owned,
            }
        );
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut dump = pawn_dump();
        let first = dump[0].clone();
        dump.as_array_mut().unwrap().push(first);

        let err = ReflectionRegistry::from_json(dump).unwrap_err();
        assert!(matches!(err.current_context(), Error::InvalidReflection(_)));
    }

    #[test]
    fn test_from_file_reads_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reflection.json");
        std::fs::write(&path, pawn_dump().to_string()).unwrap();

        let registry = ReflectionRegistry::from_file(&path).unwrap();
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_from_file_missing_reports_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReflectionRegistry::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err.current_context(), Error::FileOperation(_)));
    }
}
