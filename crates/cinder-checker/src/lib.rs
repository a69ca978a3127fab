//! Semantic analysis for the Cinder compiler.
//!
//! One pass over a package's AST forest performing late name resolution,
//! bidirectional type inference and checking, optional-type narrowing,
//! method and field resolution, template instantiation, struct layout and
//! user-type interning.
//!
//! The pass is strictly single-threaded over a package: a checker owns its
//! scope stack, interning maps and memoization tables without
//! synchronization. Diagnostics accumulate on the [`Compiler`]; a fatal
//! condition is returned as a [`CheckError`].

pub mod assignability;
pub mod call;
pub mod compiler;
pub mod comptime;
pub mod context;
pub mod control_flow;
pub mod declarations;
pub mod dispatch;
pub mod exprs;
pub mod flow_narrowing;
pub mod imports;
pub mod intern;
pub mod literals;
pub mod postanalyze;
pub mod scope;
pub mod spelling;
pub mod templates;
pub mod typedep;
pub mod types;

use cinder_ast::{NodeArena, NodeId, NodeKind};

pub use compiler::{Compiler, Package, TypeFunTab};
pub use comptime::comptime_eval_uint;
pub use context::Checker;
pub use intern::typeid_of;
pub use scope::Scope;

/// Fatal conditions. User-facing type errors are reported as diagnostics
/// on the [`Compiler`] instead and never abort the pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckError {
    /// An internal invariant did not hold.
    Internal(&'static str),
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for CheckError {}

/// Type-check a package: one AST forest, one unit node per source file.
///
/// Reads the units' children, mutates nodes in place (flags, types,
/// in-slot rewrites) and emits diagnostics through the compiler.
pub fn typecheck(
    compiler: &mut Compiler,
    ast: &mut NodeArena,
    pkg: &mut Package,
    units: &[NodeId],
) -> Result<(), CheckError> {
    let mut checker = Checker::new(compiler, ast, pkg);

    // package scope
    checker.enter_scope();

    for &unit in units {
        if !matches!(checker.ast.node(unit).kind, NodeKind::Unit(_)) {
            return Err(CheckError::Internal("typecheck unit is not a unit node"));
        }

        checker.enter_scope();
        checker.enter_ns(unit);

        let (imports, children) = match &checker.ast.node(unit).kind {
            NodeKind::Unit(u) => (u.imports.clone(), u.children.clone()),
            _ => unreachable!(),
        };

        for im in imports {
            checker.check_import(im);
        }

        // hoist: assign namespace parents and pre-define function names so
        // bodies can refer to siblings in any order
        for &child in &children {
            checker.assign_ns_parent(child);
            checker.define_at_unit_level(child);
        }

        // then check declarations in source order
        for (i, &child) in children.iter().enumerate() {
            let c2 = checker.check_stmt(child);
            if c2 != child
                && let NodeKind::Unit(u) = &mut checker.ast.node_mut(unit).kind
            {
                u.children[i] = c2;
            }
        }

        checker.leave_ns();
        checker.leave_scope();
    }

    checker.drain_postanalyze();

    checker.leave_scope();

    match checker.err.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
