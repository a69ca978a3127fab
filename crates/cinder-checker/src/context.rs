//! Checker state.
//!
//! Holds the mutable state shared by every checking rule: the scope stack,
//! the expected-type ("type context") stack, the interning and memoization
//! maps, and the diagnostic plumbing. Rule implementations live in sibling
//! modules as `impl Checker` blocks.

use cinder_ast::{NodeArena, NodeFlags, NodeId};
use cinder_common::interner::{Atom, kw};
use cinder_common::srcloc::{Origin, SrcLoc};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::compiler::{Compiler, Package};
use crate::scope::Scope;
use crate::{CheckError, spelling::DidYouMean};

pub struct Checker<'a> {
    pub compiler: &'a mut Compiler,
    pub ast: &'a mut NodeArena,
    pub pkg: &'a mut Package,
    pub(crate) scope: Scope,
    /// Current function, when checking inside a function body.
    pub(crate) fun: Option<NodeId>,
    /// The expected type at the current recursion point.
    pub(crate) typectx: NodeId,
    pub(crate) typectx_stack: Vec<NodeId>,
    /// Namespace path: unit, then enclosing types/functions.
    pub(crate) ns_path: Vec<NodeId>,
    /// Nodes to re-examine after the main pass; value = done.
    pub(crate) postanalyze: IndexMap<NodeId, bool>,
    /// Structural type id => canonical user type node.
    pub(crate) typeid_map: FxHashMap<Box<[u8]>, NodeId>,
    /// (template, arg type ids) => instance.
    pub(crate) template_instances: FxHashMap<(NodeId, Box<[u8]>), NodeId>,
    /// True once an error diagnostic has been reported; later statements
    /// and expressions become no-ops (best-effort bail-out).
    pub(crate) reported_error: bool,
    pub(crate) err: Option<CheckError>,
    /// Public-visibility nesting level.
    pub(crate) pub_nest: u32,
    /// Template-definition nesting level.
    pub(crate) template_nest: u32,
    /// Names worth suggesting when an identifier cannot be resolved.
    pub(crate) didyoumean: Vec<DidYouMean>,
}

impl<'a> Checker<'a> {
    pub fn new(compiler: &'a mut Compiler, ast: &'a mut NodeArena, pkg: &'a mut Package) -> Self {
        Checker {
            compiler,
            ast,
            pkg,
            scope: Scope::new(),
            fun: None,
            typectx: NodeId::VOID,
            typectx_stack: Vec::new(),
            ns_path: Vec::new(),
            postanalyze: IndexMap::new(),
            typeid_map: FxHashMap::default(),
            template_instances: FxHashMap::default(),
            reported_error: false,
            err: None,
            pub_nest: 0,
            template_nest: 0,
            didyoumean: Vec::new(),
        }
    }

    /// True if no error diagnostic has been reported.
    pub(crate) fn no_error(&self) -> bool {
        self.compiler.errcount() == 0
    }

    // -----------------------------------------------------------------------
    // diagnostics

    pub(crate) fn origin_of(&self, n: NodeId) -> Origin {
        Origin::from_loc(self.ast.node(n).loc)
    }

    pub(crate) fn error(&mut self, n: NodeId, message: String) {
        self.reported_error = true;
        let origin = self.origin_of(n);
        self.compiler.error(origin, message);
    }

    pub(crate) fn error_loc(&mut self, loc: SrcLoc, message: String) {
        self.reported_error = true;
        self.compiler.error(Origin::from_loc(loc), message);
    }

    pub(crate) fn warning(&mut self, n: NodeId, message: String) {
        let origin = self.origin_of(n);
        self.compiler.warning(origin, message);
    }

    pub(crate) fn warning_loc(&mut self, loc: SrcLoc, message: String) {
        self.compiler.warning(Origin::from_loc(loc), message);
    }

    pub(crate) fn help(&mut self, n: NodeId, message: String) {
        let origin = self.origin_of(n);
        self.compiler.help(origin, message);
    }

    pub(crate) fn help_loc(&mut self, loc: SrcLoc, message: String) {
        self.compiler.help(Origin::from_loc(loc), message);
    }

    /// Short form of a node for diagnostic messages.
    pub(crate) fn fmt(&self, n: NodeId) -> String {
        cinder_ast::fmt_node(self.ast, &self.compiler.interner, n)
    }

    /// A noun describing a node's kind.
    pub(crate) fn kindname(&self, n: NodeId) -> &'static str {
        cinder_ast::fmt_kind(self.ast, n)
    }

    pub(crate) fn name(&self, atom: Atom) -> &str {
        self.compiler.interner.resolve(atom)
    }

    // -----------------------------------------------------------------------
    // type context stack

    pub(crate) fn typectx_push(&mut self, t: NodeId) {
        trace!(depth = self.typectx_stack.len(), ty = %self.fmt(t), "typectx push");
        self.typectx_stack.push(self.typectx);
        self.typectx = t;
    }

    pub(crate) fn typectx_pop(&mut self) {
        debug_assert!(!self.typectx_stack.is_empty());
        self.typectx = self.typectx_stack.pop().unwrap_or(NodeId::VOID);
        trace!(depth = self.typectx_stack.len(), ty = %self.fmt(self.typectx), "typectx pop");
    }

    // -----------------------------------------------------------------------
    // scope

    pub(crate) fn enter_scope(&mut self) {
        self.scope.enter();
        trace!(level = self.scope.level(), "enter scope");
    }

    pub(crate) fn leave_scope(&mut self) {
        trace!(level = self.scope.level(), "leave scope");
        self.scope.leave();
    }

    pub(crate) fn enter_ns(&mut self, n: NodeId) {
        self.ns_path.push(n);
    }

    pub(crate) fn leave_ns(&mut self) {
        self.ns_path.pop();
    }

    pub(crate) fn current_ns(&self) -> Option<NodeId> {
        self.ns_path.last().copied()
    }

    /// Resolve a name through the scope stack, falling back to package
    /// definitions. A package-level hit upgrades the node's visibility so
    /// the cross-unit use is recorded. Bumps the target's use count.
    pub(crate) fn lookup(&mut self, name: Atom) -> Option<NodeId> {
        debug_assert!(name != kw::UNDERSCORE);
        let n = match self.scope.lookup(name, usize::MAX) {
            Some(n) => {
                trace!(name = %self.name(name), "lookup in scope");
                n
            }
            None => {
                let n = self.pkg.def(name)?;
                trace!(name = %self.name(name), "lookup in package");
                self.ast.node_mut(n).flags.upgrade_visibility(NodeFlags::VIS_PKG);
                n
            }
        };
        self.ast.inc_use(n);
        Some(n)
    }

    /// Define `name` in the current scope. A no-op for the ignored name
    /// `_`. Defining a duplicate in the same scope is a program error in
    /// debug builds: the parser reports duplicate definitions.
    pub(crate) fn define(&mut self, name: Atom, n: NodeId) {
        if name == kw::UNDERSCORE {
            return;
        }
        trace!(name = %self.name(name), node = %self.fmt(n), "define");

        #[cfg(debug_assertions)]
        if let Some(existing) = self.scope.lookup(name, 0) {
            self.error(n, format!("duplicate definition \"{}\"", self.name(name)));
            if self.ast.node(existing).loc.is_known() {
                let msg = format!("\"{}\" previously defined here", self.name(name));
                self.warning(existing, msg);
            }
            debug_assert!(false, "duplicate definition");
        }

        self.scope.define(name, n);
    }
}
