//! Error type shared by every stage of generation

use thiserror::Error;

use crate::reflection::TypePath;
use crate::replication::ReplicatedPropertyGroup;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `schema_ast` library
pub type Result<T> = core::result::Result<T, error_stack::Report<Error>>;

/// Errors raised while building, merging or flattening a type tree
#[derive(Debug, Error)]
pub enum Error {
    /// A replication layout record has no property with a matching checksum.
    /// The property graph and the replication layout disagree about the type.
    #[error("Structural mismatch in '{type_path}': no property with checksum {checksum:#010x}")]
    StructuralMismatch {
        /// Type whose layout was being merged
        type_path: TypePath,
        /// Checksum carried by the unmatched record
        checksum:  u32,
    },

    /// A chain of owned references re-entered a type that is still being built
    #[error("Cyclic ownership: {}", chain.iter().map(TypePath::as_str).collect::<Vec<_>>().join(" -> "))]
    CyclicOwnership {
        /// Types from the outermost open ancestor down to the re-entered type
        chain: Vec<TypePath>,
    },

    /// Two fields sanitize to the same schema name within one scope
    #[error("Name collision in '{scope}': more than one field maps to '{name}'")]
    NameCollision {
        /// Type or RPC in which the collision occurred
        scope: String,
        /// The colliding sanitized name
        name:  String,
    },

    /// Two properties claim the same handle in one flattened table
    #[error("Duplicate handle {handle} in {group}")]
    DuplicateHandle {
        /// Table in which the handle repeats
        group:  HandleTable,
        /// The repeated handle
        handle: u16,
    },

    /// Type referenced by a field or requested as a root is not in the reflection source
    #[error("Type not found in reflection data: {0}")]
    TypeNotFound(TypePath),

    /// Reflection data violates an invariant the builder relies on
    #[error("Invalid reflection data: {0}")]
    InvalidReflection(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading or writing a file failed
    #[error("File operation failed: {0}")]
    FileOperation(String),
}

/// Flattened table a handle belongs to, used in [`Error::DuplicateHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleTable {
    /// One of the replicated property groups
    Replicated(ReplicatedPropertyGroup),
    /// The handover table
    Handover,
}

impl std::fmt::Display for HandleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replicated(group) => write!(f, "replicated group {group}"),
            Self::Handover => write!(f, "handover table"),
        }
    }
}

impl Error {
    /// Create an "Invalid X" reflection error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidReflection(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create error for file operations
    pub fn io_failed(
        operation: &str,
        path: &std::path::Path,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::FileOperation(format!(
            "{MSG_FAILED_TO_PREFIX} {operation} {}: {error}",
            path.display()
        ))
    }

    /// Create a configuration error
    pub fn config_failed(what: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_FAILED_TO_PREFIX} {what}: {details}"))
    }
}
