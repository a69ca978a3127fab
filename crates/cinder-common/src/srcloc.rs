//! SrcLoc - compact source location tracking for AST nodes and diagnostics
//!
//! A `SrcLoc` packs file, line, column and width into a single u64 so that
//! every AST node can carry its origin at no real cost. The zero value means
//! "unknown location". A separate [`LocMap`] resolves the file id back to a
//! [`SourceFile`].
//!
//! Layout (most significant bits first):
//!
//! ```text
//! file-id : 20 bits (63..44)
//! line    : 20 bits (43..24)
//! column  : 12 bits (23..12)
//! width   : 12 bits (11..0)
//! ```
//!
//! All fields saturate at their maximum on construction.

use serde::{Deserialize, Serialize};

const WIDTH_BITS: u64 = 12;
const COL_BITS: u64 = 12;
const LINE_BITS: u64 = 20;

const FILE_MAX: u64 = (1 << (64 - LINE_BITS - COL_BITS - WIDTH_BITS)) - 1;
const LINE_MAX: u64 = (1 << LINE_BITS) - 1;
const COL_MAX: u64 = (1 << COL_BITS) - 1;
const WIDTH_MAX: u64 = (1 << WIDTH_BITS) - 1;

const FILE_SHIFT: u64 = LINE_BITS + COL_BITS + WIDTH_BITS;
const LINE_SHIFT: u64 = COL_BITS + WIDTH_BITS;
const COL_SHIFT: u64 = WIDTH_BITS;

/// A packed source location: file, line, column and width.
///
/// `SrcLoc::NONE` (the zero value) means the location is unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct SrcLoc(u64);

impl SrcLoc {
    /// The unknown location.
    pub const NONE: SrcLoc = SrcLoc(0);

    /// Pack a location. Fields that exceed their bit budget saturate.
    #[inline]
    pub const fn new(file_id: u32, line: u32, col: u32, width: u32) -> Self {
        let file_id = if file_id as u64 > FILE_MAX { FILE_MAX } else { file_id as u64 };
        let line = if line as u64 > LINE_MAX { LINE_MAX } else { line as u64 };
        let col = if col as u64 > COL_MAX { COL_MAX } else { col as u64 };
        let width = if width as u64 > WIDTH_MAX { WIDTH_MAX } else { width as u64 };
        SrcLoc((file_id << FILE_SHIFT) | (line << LINE_SHIFT) | (col << COL_SHIFT) | width)
    }

    #[inline]
    pub const fn file_id(self) -> u32 {
        (self.0 >> FILE_SHIFT) as u32
    }

    #[inline]
    pub const fn line(self) -> u32 {
        ((self.0 >> LINE_SHIFT) & LINE_MAX) as u32
    }

    #[inline]
    pub const fn col(self) -> u32 {
        ((self.0 >> COL_SHIFT) & COL_MAX) as u32
    }

    #[inline]
    pub const fn width(self) -> u32 {
        (self.0 & WIDTH_MAX) as u32
    }

    /// A location is known if it carries a file or a line.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.file_id() != 0 || self.line() != 0
    }

    /// Copy of `self` with a different width.
    #[inline]
    pub const fn with_width(self, width: u32) -> Self {
        SrcLoc::new(self.file_id(), self.line(), self.col(), width)
    }

    /// Location covering the column extent of both `a` and `b`.
    /// Both must be on the same line for the result to be meaningful.
    pub fn union(a: SrcLoc, b: SrcLoc) -> SrcLoc {
        if !a.is_known() {
            return b;
        }
        if !b.is_known() || a.line() != b.line() {
            return a;
        }
        let start = a.col().min(b.col());
        let end = (a.col() + a.width()).max(b.col() + b.width());
        SrcLoc::new(a.file_id(), a.line(), start, end - start)
    }

    /// Order-preserving minimum that treats the unknown location as largest.
    #[inline]
    pub fn min(a: SrcLoc, b: SrcLoc) -> SrcLoc {
        if b.0.wrapping_sub(1) < a.0.wrapping_sub(1) { b } else { a }
    }

    #[inline]
    pub fn max(a: SrcLoc, b: SrcLoc) -> SrcLoc {
        if b.0 > a.0 { b } else { a }
    }
}

impl std::fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line(), self.col())
    }
}

/// A source file as seen by the compiler. Contents are owned elsewhere;
/// the checker only needs the name for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the package directory.
    pub name: String,
}

/// Maps the file-id field of a [`SrcLoc`] to its [`SourceFile`].
///
/// Slot 0 is reserved for "no file" so that a zero `SrcLoc` never resolves.
#[derive(Debug, Default)]
pub struct LocMap {
    files: Vec<SourceFile>,
}

impl LocMap {
    pub fn new() -> Self {
        LocMap { files: Vec::new() }
    }

    /// Register a source file, returning its id (>= 1).
    pub fn intern_file(&mut self, name: impl Into<String>) -> u32 {
        self.files.push(SourceFile { name: name.into() });
        self.files.len() as u32
    }

    /// Resolve a file id. Id 0 (and unregistered ids) resolve to `None`.
    pub fn file(&self, file_id: u32) -> Option<&SourceFile> {
        if file_id == 0 {
            return None;
        }
        self.files.get(file_id as usize - 1)
    }
}

/// The origin of a diagnostic, usually derived from a [`SrcLoc`].
///
/// `line == 0` means the origin is unknown and the remaining fields are
/// not meaningful.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub file_id: u32,
    pub line: u32,
    pub column: u32,
    /// > 0 if the origin is a range starting at line/column.
    pub width: u32,
    /// If > 0, an important column within the origin line.
    pub focus_col: u32,
}

impl Origin {
    pub const UNKNOWN: Origin = Origin { file_id: 0, line: 0, column: 0, width: 0, focus_col: 0 };

    pub fn from_loc(loc: SrcLoc) -> Origin {
        Origin {
            file_id: loc.file_id(),
            line: loc.line(),
            column: loc.col(),
            width: loc.width(),
            focus_col: 0,
        }
    }

    pub fn with_focus(loc: SrcLoc, focus_col: u32) -> Origin {
        let mut origin = Origin::from_loc(loc);
        origin.focus_col = focus_col;
        origin
    }

    /// Origin covering both `a` and `b` when they are on the same line;
    /// otherwise `a` (preferring a known origin).
    pub fn union(a: Origin, b: Origin) -> Origin {
        if a.line == 0 {
            return b;
        }
        if b.line == 0 || a.line != b.line || a.file_id != b.file_id {
            return a;
        }
        let start = a.column.min(b.column);
        let end = (a.column + a.width).max(b.column + b.width);
        Origin { file_id: a.file_id, line: a.line, column: start, width: end - start, focus_col: a.focus_col }
    }
}

#[cfg(test)]
#[path = "tests/srcloc.rs"]
mod tests;
