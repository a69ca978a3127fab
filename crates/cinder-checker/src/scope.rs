//! Lexical scope stack.
//!
//! A flat vector of (name, node) pairs plus a stack of base indices. Push
//! and pop adjust the base; `define` appends; `lookup` scans from the top
//! toward either the current scope only or all scopes.

use cinder_ast::NodeId;
use cinder_common::interner::Atom;

#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<(Atom, NodeId)>,
    bases: Vec<usize>,
    /// Parked entries during stash.
    stash: Vec<(Vec<(Atom, NodeId)>, Vec<usize>)>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn enter(&mut self) {
        self.bases.push(self.entries.len());
    }

    pub fn leave(&mut self) {
        let base = self.bases.pop().unwrap_or(0);
        self.entries.truncate(base);
    }

    /// Number of entries across all scopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nesting depth (number of entered scopes).
    pub fn level(&self) -> usize {
        self.bases.len()
    }

    pub fn entry(&self, i: usize) -> (Atom, NodeId) {
        self.entries[i]
    }

    pub fn entries(&self) -> &[(Atom, NodeId)] {
        &self.entries
    }

    pub fn define(&mut self, name: Atom, node: NodeId) {
        self.entries.push((name, node));
    }

    /// Search from the innermost scope outward. `max_depth` 0 searches the
    /// current scope only; `usize::MAX` searches all scopes.
    pub fn lookup(&self, name: Atom, max_depth: usize) -> Option<NodeId> {
        let mut depth = 0usize;
        let mut base_iter = self.bases.iter().rev();
        let mut base = base_iter.next().copied().unwrap_or(0);
        for i in (0..self.entries.len()).rev() {
            while i < base {
                if depth == max_depth {
                    return None;
                }
                depth += 1;
                base = base_iter.next().copied().unwrap_or(0);
            }
            if self.entries[i].0 == name {
                return Some(self.entries[i].1);
            }
        }
        None
    }

    /// Temporarily hide every current scope.
    pub fn stash(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        let bases = std::mem::take(&mut self.bases);
        self.stash.push((entries, bases));
    }

    pub fn unstash(&mut self) {
        if let Some((entries, bases)) = self.stash.pop() {
            self.entries = entries;
            self.bases = bases;
        }
    }
}
