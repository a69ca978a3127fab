//! "Did you mean" suggestions for unresolved identifiers.
//!
//! Two sources: names registered during import processing (exact matches),
//! and fuzzy matches over the visible scope ranked by Levenshtein edit
//! distance (suggested when the closest candidate is within distance 2).

use cinder_ast::{ExprData, ExprKind, NodeId, NodeKind};
use cinder_common::interner::Atom;
use cinder_common::srcloc::SrcLoc;
use rustc_hash::FxHashSet;

use crate::context::Checker;

/// A name registered as "likely wanted", e.g. the original name of a
/// renamed import.
#[derive(Clone, Copy, Debug)]
pub struct DidYouMean {
    pub name: Atom,
    pub other_name: Option<Atom>,
    pub loc: SrcLoc,
}

const MAX_EDIT_DIST: usize = 2;

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let sub_cost = usize::from(a[i - 1] != b[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + sub_cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

impl Checker<'_> {
    pub(crate) fn didyoumean_add(&mut self, name: Atom, loc: SrcLoc, other_name: Option<Atom>) {
        self.didyoumean.push(DidYouMean { name, other_name, loc });
    }

    /// Report an unresolved identifier with suggestions, then redefine the
    /// name as a void binding so repeated uses do not re-report.
    pub(crate) fn unknown_identifier(&mut self, n: NodeId) {
        let name = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Id { name, .. }, .. }) => *name,
            _ => return,
        };

        self.error(n, format!("unknown identifier \"{}\"", self.name(name)));

        // exact matches registered during import processing
        let mut nsuggestions = 0;
        for dym in self.didyoumean.clone() {
            if dym.name == name || dym.other_name == Some(name) {
                let msg = format!("did you mean \"{}\"", self.name(dym.name));
                self.help_loc(dym.loc, msg);
                nsuggestions += 1;
            }
        }

        if nsuggestions == 0 {
            // fuzzy matches over the visible scope; shadowed names are
            // considered once (innermost wins)
            let mut seen: FxHashSet<Atom> = FxHashSet::default();
            let mut best: Option<(usize, Atom, NodeId)> = None;
            let want = self.name(name).to_string();
            for i in (0..self.scope.len()).rev() {
                let (cand, decl) = self.scope.entry(i);
                if !seen.insert(cand) {
                    continue;
                }
                let dist = levenshtein(&want, self.name(cand));
                if best.is_none_or(|(d, _, _)| dist < d) {
                    best = Some((dist, cand, decl));
                }
            }
            if let Some((dist, cand, decl)) = best
                && dist <= MAX_EDIT_DIST
            {
                let msg = format!("did you mean \"{}\"", self.name(cand));
                self.help(decl, msg);
            }
        }

        // resolution never silently fails: adopt void and redefine the name
        // in scope to suppress repeat reports
        self.ast.set_expr_ty(n, NodeId::VOID);
        self.scope.define(name, n);
    }
}

#[cfg(test)]
mod tests {
    use super::levenshtein;

    #[test]
    fn edit_distance() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", "abd"), 1);
        assert_eq!(levenshtein("abc", "ab"), 1);
        assert_eq!(levenshtein("abc", "xabc"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
