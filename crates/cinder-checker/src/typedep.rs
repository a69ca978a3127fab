//! Type-alias dependency cycle detection.
//!
//! Aliases are unwrapped eagerly all over the checker, so a cycle among
//! them must be detected the moment an alias is resolved, before anything
//! recurses through it. On detection the resolver rewrites the
//! cycle-closing referent to `unknown`, cutting the loop.

use cinder_ast::{NodeId, TypeKind};
use rustc_hash::FxHashSet;

use crate::context::Checker;

impl Checker<'_> {
    /// Check the alias dependency chain starting at `t`. Reports a
    /// diagnostic and returns false when the chain is cyclic.
    pub(crate) fn check_typedep(&mut self, t: NodeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut cur = t;
        loop {
            if !seen.insert(cur) {
                let name = match self.ast.type_kind(t) {
                    Some(TypeKind::Alias(at)) => self.name(at.name).to_string(),
                    _ => self.fmt(t),
                };
                self.error(t, format!("cyclic type alias \"{name}\""));
                return false;
            }
            cur = match self.ast.type_kind(cur) {
                Some(TypeKind::Alias(at)) => at.elem,
                Some(TypeKind::Unresolved { resolved: Some(r), .. }) => *r,
                _ => return true,
            };
        }
    }
}
