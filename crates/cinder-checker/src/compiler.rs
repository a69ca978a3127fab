//! Compiler context and per-package state consumed by the checker.

use cinder_ast::{NodeArena, NodeId};
use cinder_common::diagnostics::{Diagnostic, DiagnosticCategory};
use cinder_common::interner::{Atom, Interner};
use cinder_common::options::CompilerOptions;
use cinder_common::srcloc::{LocMap, Origin};
use rustc_hash::FxHashMap;

use crate::intern::typeid_of;

/// Shared compiler state: target description, interners, the location map
/// and the diagnostic sink.
///
/// Diagnostics funnel through [`Compiler::report`]; the checker never
/// renders them.
#[derive(Debug)]
pub struct Compiler {
    pub options: CompilerOptions,
    pub interner: Interner,
    pub locmap: LocMap,
    /// The concrete type of native `int` (I32 or I64 per target int size).
    pub int_type: NodeId,
    /// The concrete type of native `uint`.
    pub uint_type: NodeId,
    /// Canonical alias used for untargeted string literals, when the
    /// runtime package providing `str` has been loaded.
    pub str_type: Option<NodeId>,
    pub diagnostics: Vec<Diagnostic>,
    errcount: u32,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        let (int_type, uint_type) = if options.target.int_size == 8 {
            (NodeId::I64, NodeId::U64)
        } else {
            (NodeId::I32, NodeId::U32)
        };
        Compiler {
            options,
            interner: Interner::new(),
            locmap: LocMap::new(),
            int_type,
            uint_type,
            str_type: None,
            diagnostics: Vec::new(),
            errcount: 0,
        }
    }

    pub fn report(&mut self, diag: Diagnostic) {
        tracing::trace!(category = ?diag.category, message = %diag.message, "diagnostic");
        if diag.category == DiagnosticCategory::Error {
            self.errcount += 1;
        }
        self.diagnostics.push(diag);
    }

    pub fn error(&mut self, origin: Origin, message: impl Into<String>) {
        self.report(Diagnostic::error(origin, message));
    }

    pub fn warning(&mut self, origin: Origin, message: impl Into<String>) {
        self.report(Diagnostic::warning(origin, message));
    }

    pub fn help(&mut self, origin: Origin, message: impl Into<String>) {
        self.report(Diagnostic::help(origin, message));
    }

    /// Number of error diagnostics reported so far.
    pub fn errcount(&self) -> u32 {
        self.errcount
    }
}

/// Maps receiver types to their type functions ("methods"), keyed by the
/// receiver's structural type id.
#[derive(Debug, Default)]
pub struct TypeFunTab {
    funs: FxHashMap<(Box<[u8]>, Atom), NodeId>,
}

impl TypeFunTab {
    pub fn define(&mut self, recv_typeid: Box<[u8]>, name: Atom, fun: NodeId) {
        self.funs.insert((recv_typeid, name), fun);
    }

    pub fn lookup(&self, recv_typeid: &[u8], name: Atom) -> Option<NodeId> {
        self.funs.get(&(Box::from(recv_typeid), name)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.funs.is_empty()
    }
}

/// One package's worth of state, populated by the parser and build driver.
#[derive(Debug)]
pub struct Package {
    /// Import path, e.g. "main" or "std/runtime".
    pub path: String,
    /// Package-level definitions, populated by the parser.
    pub defs: FxHashMap<Atom, NodeId>,
    /// Type functions defined by this package.
    pub type_funs: TypeFunTab,
    /// The package's API namespace, available to importers.
    pub api_ns: Option<NodeId>,
    /// `fun main()`, if any; recorded by the checker.
    pub main_fun: Option<NodeId>,
}

impl Package {
    pub fn new(path: impl Into<String>) -> Self {
        Package {
            path: path.into(),
            defs: FxHashMap::default(),
            type_funs: TypeFunTab::default(),
            api_ns: None,
            main_fun: None,
        }
    }

    pub fn define(&mut self, name: Atom, node: NodeId) {
        self.defs.insert(name, node);
    }

    pub fn def(&self, name: Atom) -> Option<NodeId> {
        self.defs.get(&name).copied()
    }

    /// Register a type function for `recv_type`, e.g. `fun Foo.bar(this)`.
    pub fn define_type_fun(
        &mut self,
        ast: &mut NodeArena,
        interner: &Interner,
        recv_type: NodeId,
        name: Atom,
        fun: NodeId,
    ) {
        let key = typeid_of(ast, interner, recv_type);
        self.type_funs.define(key, name, fun);
    }
}
