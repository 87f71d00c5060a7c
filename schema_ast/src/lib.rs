//! # Schema AST
//!
//! Builds an abstract syntax tree over a reflected game type graph (classes, structs,
//! their fields and RPCs) and overlays the replication layout computed by the engine.
//! The tree is the input for schema and code emitters; this crate stops at the data
//! structure they consume.
//!
//! The pipeline for a single root type:
//!
//! 1. [`type_structure::TypeTreeBuilder`] walks the reflection graph depth-first, building one
//!    [`type_structure::PropertyNode`] per field and recursing only into owned sub-objects and
//!    embedded structs.
//! 2. [`type_structure::merge_replication_layout`] attaches replication data to properties by
//!    matching checksums with the engine's replication layout records.
//! 3. [`type_structure::merge_handover_layout`] does the same for server-to-server handover data.
//! 4. [`type_structure::flatten_replicated`], [`type_structure::flatten_handover`] and
//!    [`type_structure::collect_subobjects`] produce the flat tables consumed by emitters.
//!
//! [`Generator`] runs that pipeline for many root types, aggregating failures per root.

pub mod checksum;
pub mod config;
pub mod data_types;
pub mod error;
pub mod generator;
pub mod naming;
pub mod reflection;
pub mod replication;
pub mod support;
pub mod type_structure;

pub use config::{CyclePolicy, GeneratorConfig};
pub use error::{Error, Result};
pub use generator::{GeneratedSchema, GenerationReport, Generator};
