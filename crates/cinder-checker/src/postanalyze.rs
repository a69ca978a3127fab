//! Post-analysis queue.
//!
//! Struct types are enqueued at the end of their check and re-examined
//! after the main pass, when properties that finalize late (e.g. a drop
//! function defined after the struct) have settled. Draining may enqueue
//! more work; it continues until every entry is done.

use cinder_ast::{NodeFlags, NodeId, TypeKind};
use tracing::trace;

use crate::context::Checker;

impl Checker<'_> {
    fn postanalyze_dependency(&mut self, t: NodeId) {
        if !matches!(self.ast.type_kind(t), Some(TypeKind::Struct(_))) {
            return;
        }
        if self.postanalyze.insert(t, true) == Some(true) {
            return;
        }
        self.postanalyze_any(t);
    }

    fn postanalyze_struct(&mut self, t: NodeId) {
        let fields = match self.ast.type_kind(t) {
            Some(TypeKind::Struct(st)) => st.fields.clone(),
            _ => return,
        };
        for f in fields {
            let fty = self.ast.expr_ty(f);
            self.postanalyze_dependency(fty);
            if self.is_owner(fty) {
                self.ast.add_flags(t, NodeFlags::SUBOWNERS);
            }
        }
    }

    fn postanalyze_any(&mut self, n: NodeId) {
        trace!(node = %self.fmt(n), "postanalyze");
        match self.ast.type_kind(n) {
            Some(TypeKind::Struct(_)) => self.postanalyze_struct(n),
            Some(TypeKind::Alias(at)) => {
                let elem = at.elem;
                self.postanalyze_any(elem);
            }
            _ => {}
        }
    }

    /// Drain the queue. Entries may be added while draining; keep going
    /// until only done entries remain.
    pub(crate) fn drain_postanalyze(&mut self) {
        loop {
            let next = self
                .postanalyze
                .iter()
                .find(|&(_, &done)| !done)
                .map(|(&n, _)| n);
            let Some(n) = next else { break };
            self.postanalyze.insert(n, true);
            self.postanalyze_any(n);
        }
    }
}
