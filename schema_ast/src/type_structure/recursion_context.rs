//! Context threaded through the type tree build
//!
//! Holds the reflection source, the traversal settings and the chain of types currently
//! open on the build stack, which is what cycle detection checks against.

use error_stack::Report;

use crate::config::{CyclePolicy, GeneratorConfig};
use crate::error::{Error, Result};
use crate::reflection::{ReflectedType, ReflectionSource, TypePath};

/// Per-build traversal state
pub struct RecursionContext<'a> {
    /// Reflection data being walked
    pub source:           &'a dyn ReflectionSource,
    /// What to do on cyclic ownership
    pub cycle_policy:     CyclePolicy,
    /// Whether editor-only sub-objects are skipped
    pub skip_editor_only: bool,
    /// Types currently being built, outermost first
    open_types:           Vec<TypePath>,
}

impl<'a> RecursionContext<'a> {
    /// Create a context for one root build
    pub fn new(source: &'a dyn ReflectionSource, config: &GeneratorConfig) -> Self {
        Self {
            source,
            cycle_policy: config.cycle_policy,
            skip_editor_only: config.skip_editor_only,
            open_types: Vec::new(),
        }
    }

    /// Look up a reflected type, failing if it is not registered
    pub fn require_type(&self, path: &TypePath) -> Result<&'a ReflectedType> {
        self.source
            .find_type(path)
            .ok_or_else(|| Report::new(Error::TypeNotFound(path.clone())))
    }

    /// Mark `path` as being built
    pub fn enter(&mut self, path: &TypePath) {
        self.open_types.push(path.clone());
    }

    /// Close the innermost open type
    pub fn leave(&mut self) {
        self.open_types.pop();
    }

    /// Number of types currently open
    pub fn depth(&self) -> usize {
        self.open_types.len()
    }

    /// If `path` is already open, the chain from its outermost occurrence back to `path`
    pub fn open_chain(&self, path: &TypePath) -> Option<Vec<TypePath>> {
        self.open_types
            .iter()
            .position(|open| open == path)
            .map(|start| {
                let mut chain = self.open_types[start..].to_vec();
                chain.push(path.clone());
                chain
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::reflection::ReflectionRegistry;

    #[test]
    fn test_open_chain_reports_cycle_from_first_occurrence() {
        let registry = ReflectionRegistry::new();
        let config = GeneratorConfig::default();
        let mut ctx = RecursionContext::new(&registry, &config);

        let root = TypePath::from("/Game/Root");
        let a = TypePath::from("/Game/A");
        let b = TypePath::from("/Game/B");
        ctx.enter(&root);
        ctx.enter(&a);
        ctx.enter(&b);

        assert_eq!(ctx.depth(), 3);
        assert_eq!(ctx.open_chain(&a), Some(vec![a.clone(), b.clone(), a.clone()]));
        assert!(ctx.open_chain(&TypePath::from("/Game/C")).is_none());

        ctx.leave();
        ctx.leave();
        assert!(ctx.open_chain(&b).is_none());
    }

    #[test]
    fn test_require_type_reports_missing_type() {
        let registry = ReflectionRegistry::new();
        let config = GeneratorConfig::default();
        let ctx = RecursionContext::new(&registry, &config);

        let err = ctx.require_type(&TypePath::from("/Game/Missing")).unwrap_err();
        assert!(matches!(err.current_context(), Error::TypeNotFound(_)));
    }
}
