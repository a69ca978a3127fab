//! Diagnostic values produced by the compiler phases.
//!
//! The checker never renders diagnostics; it produces [`Diagnostic`] values
//! and hands them to a single sink (see `Compiler::report` in the checker
//! crate). Rendering with source context is the driver's concern.

use serde::{Deserialize, Serialize};

use crate::srcloc::Origin;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    /// A follow-up note attached to a preceding error or warning.
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub message: String,
    pub origin: Origin,
}

impl Diagnostic {
    pub fn error(origin: Origin, message: impl Into<String>) -> Self {
        Diagnostic { category: DiagnosticCategory::Error, message: message.into(), origin }
    }

    pub fn warning(origin: Origin, message: impl Into<String>) -> Self {
        Diagnostic { category: DiagnosticCategory::Warning, message: message.into(), origin }
    }

    pub fn help(origin: Origin, message: impl Into<String>) -> Self {
        Diagnostic { category: DiagnosticCategory::Help, message: message.into(), origin }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let d = Diagnostic::error(Origin::UNKNOWN, "boom");
        assert!(d.is_error());
        let w = Diagnostic::warning(Origin::UNKNOWN, "hm");
        assert!(!w.is_error());
        assert_eq!(w.category, DiagnosticCategory::Warning);
    }
}
