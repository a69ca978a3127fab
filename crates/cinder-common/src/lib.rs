//! Common types shared across the Cinder compiler phases.
//!
//! This crate is the base layer of the workspace: it has no dependency on
//! the AST or the checker and can be used by every later phase.
//!
//! ```text
//! cinder-common (base layer)
//!   ↓
//! cinder-ast → cinder-checker
//! ```

pub mod diagnostics;
pub mod interner;
pub mod options;
pub mod srcloc;

pub use diagnostics::{Diagnostic, DiagnosticCategory};
pub use interner::{Atom, Interner, kw};
pub use options::{CompilerOptions, TargetInfo};
pub use srcloc::{LocMap, Origin, SourceFile, SrcLoc};
