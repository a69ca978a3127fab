//! Compilation target description and checker-facing options.

use serde::{Deserialize, Serialize};

/// The parts of the compilation target the semantic pass consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Size of a pointer in bytes.
    pub ptr_size: u32,
    /// Size of the native `int`/`uint` types in bytes (4 or 8).
    pub int_size: u32,
}

impl TargetInfo {
    /// A 64-bit target with 4-byte native ints, the most common default.
    pub const DEFAULT: TargetInfo = TargetInfo { ptr_size: 8, int_size: 4 };
}

impl Default for TargetInfo {
    fn default() -> Self {
        TargetInfo::DEFAULT
    }
}

/// Options consumed by the semantic pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    pub target: TargetInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target() {
        let t = TargetInfo::default();
        assert_eq!(t.ptr_size, 8);
        assert_eq!(t.int_size, 4);
    }
}
