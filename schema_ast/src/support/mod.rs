//! Process-level support shared by the library and the `schema_dump` binary

mod tracing;

pub use self::tracing::{LOG_ENV_VAR, TracingLevel, init_tracing};
