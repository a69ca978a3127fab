//! Shared helpers for checker behavior tests.
//!
//! Tests build ASTs through the arena constructors the way the parser
//! would, run the full `typecheck` entry and assert on diagnostics and
//! node types.
#![allow(dead_code)]

use cinder_ast::{NodeArena, NodeId};
use cinder_checker::{Compiler, Package, typecheck};
use cinder_common::diagnostics::DiagnosticCategory;
use cinder_common::interner::Atom;
use cinder_common::options::CompilerOptions;
use cinder_common::srcloc::SrcLoc;

pub struct Tc {
    pub compiler: Compiler,
    pub ast: NodeArena,
    pub pkg: Package,
    next_line: u32,
}

impl Tc {
    pub fn new() -> Self {
        let compiler = Compiler::new(CompilerOptions::default());
        let ast = NodeArena::new(compiler.options.target);
        let pkg = Package::new("main");
        Tc { compiler, ast, pkg, next_line: 0 }
    }

    pub fn atom(&mut self, s: &str) -> Atom {
        self.compiler.interner.intern(s)
    }

    /// A fresh source location so every node is addressable in diagnostics.
    pub fn loc(&mut self) -> SrcLoc {
        self.next_line += 1;
        SrcLoc::new(1, self.next_line, 1, 1)
    }

    pub fn unit(&mut self, children: Vec<NodeId>) -> NodeId {
        let unit = self.ast.mk_unit();
        for c in children {
            self.ast.unit_add_child(unit, c);
        }
        unit
    }

    pub fn check(&mut self, units: &[NodeId]) {
        typecheck(&mut self.compiler, &mut self.ast, &mut self.pkg, units)
            .expect("typecheck failed fatally");
    }

    /// Build a named function with a body and check-ready function type.
    pub fn fun(
        &mut self,
        name: &str,
        params: Vec<NodeId>,
        result: NodeId,
        body_stmts: Vec<NodeId>,
    ) -> NodeId {
        let loc = self.loc();
        let ft = self.ast.mk_fun_type(loc, params, result);
        let body = self.ast.mk_block(loc, body_stmts, loc);
        let name = self.atom(name);
        self.ast.mk_fun(loc, Some(name), ft, Some(body), None)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.compiler
            .diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.compiler
            .diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn helps(&self) -> Vec<&str> {
        self.compiler
            .diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Help)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn assert_ok(&self) {
        assert!(
            self.compiler.diagnostics.is_empty(),
            "unexpected diagnostics: {:#?}",
            self.compiler.diagnostics
        );
    }

    pub fn assert_error_contains(&self, want: &str) {
        assert!(
            self.errors().iter().any(|m| m.contains(want)),
            "no error containing {want:?}; got {:#?}",
            self.compiler.diagnostics
        );
    }

    pub fn assert_warning_contains(&self, want: &str) {
        assert!(
            self.warnings().iter().any(|m| m.contains(want)),
            "no warning containing {want:?}; got {:#?}",
            self.compiler.diagnostics
        );
    }

    pub fn assert_help_contains(&self, want: &str) {
        assert!(
            self.helps().iter().any(|m| m.contains(want)),
            "no help containing {want:?}; got {:#?}",
            self.compiler.diagnostics
        );
    }
}
