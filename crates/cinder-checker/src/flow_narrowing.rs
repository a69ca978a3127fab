//! Control-flow narrowing of optional types.
//!
//! A conditional testing optional values refines them: in the `then`
//! branch a tested binding has the optional's element type, in the `else`
//! branch it has type `void` ("empty"). `!` flips the polarity of every
//! narrowed binding under it; `if let x = expr` introduces a new narrowed
//! binding. Combining a binding definition with `||` or `!` is rejected
//! because the else-binding semantics would be ambiguous.
//!
//! Narrowing runs in two passes: a pre-pass marks binding definitions in
//! the condition before the condition is checked (so their initializer
//! checks are deferred), and the main pass walks the checked condition,
//! defines the narrowed bindings in the `then` scope and collects the
//! inverted clones for the `else` scope.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, Op, TypeKind};
use smallvec::SmallVec;
use tracing::debug;

use crate::context::Checker;

const HAS_COMPLEX_OP: u32 = 1;
const HAS_LOCAL_DEF: u32 = 2;

impl Checker<'_> {
    /// Pre-pass: mark `var`/`let` definitions appearing in a condition so
    /// that their checking defers optional-element verification to the
    /// narrowing pass.
    pub(crate) fn premark_cond_locals(&mut self, x: NodeId) {
        match &self.ast.node(x).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Prefix { op: Op::Not, expr }, .. }) => {
                let expr = *expr;
                self.premark_cond_locals(expr);
            }
            NodeKind::Expr(ExprData {
                kind: ExprKind::Binary { op: Op::LAnd | Op::LOr, lhs, rhs },
                ..
            }) => {
                let (lhs, rhs) = (*lhs, *rhs);
                self.premark_cond_locals(lhs);
                self.premark_cond_locals(rhs);
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Var(_) | ExprKind::Let(_), .. }) => {
                self.ast.add_flags(x, NodeFlags::MARK_LOCAL);
            }
            _ => {}
        }
    }

    fn narrow_cond1(&mut self, flags: &mut u32, x: NodeId) {
        match &self.ast.node(x).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Prefix { op: Op::Not, expr }, .. }) => {
                // negation flips the polarity of everything beneath it,
                // e.g. `if !(a && !b)` makes a void and b valid in `then`
                let expr = *expr;
                *flags |= HAS_COMPLEX_OP;
                let scope_len = self.scope.len();
                self.narrow_cond1(flags, expr);
                for i in scope_len..self.scope.len() {
                    let (_, n) = self.scope.entry(i);
                    if self.ast.flags(n).contains(NodeFlags::NARROWED) {
                        // toggle "negative"
                        let mut f = self.ast.node(n).flags;
                        f.toggle(NodeFlags::MARK_NEG);
                        self.ast.node_mut(n).flags = f;
                    }
                }
            }

            NodeKind::Expr(ExprData {
                kind: ExprKind::Binary { op: op @ (Op::LAnd | Op::LOr), lhs, rhs },
                ..
            }) => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                if op == Op::LOr {
                    *flags |= HAS_COMPLEX_OP;
                }
                self.narrow_cond1(flags, lhs);
                self.narrow_cond1(flags, rhs);
            }

            NodeKind::Expr(ExprData { ty, kind: ExprKind::Id { name, target }, .. }) => {
                let (ty, name, target) = (*ty, *name, *target);
                if !matches!(self.ast.type_kind(ty), Some(TypeKind::Optional { .. }))
                    || self.ast.flags(x).contains(NodeFlags::NARROWED)
                {
                    return;
                }
                self.ast.add_flags(x, NodeFlags::NARROWED);

                // define a narrowed clone of the referenced binding unless a
                // clone for this name already exists in the current scope
                let existing = self.scope.lookup(name, 0);
                let have_clone = existing.is_some_and(|e| {
                    self.ast.node(e).is_local()
                        && self.ast.flags(e).contains(NodeFlags::NARROWED)
                });
                if !have_clone
                    && let Some(target) = target
                {
                    debug_assert!(self.ast.node(target).is_local());
                    let clone = self.ast.clone_node(target);
                    self.ast.add_flags(clone, NodeFlags::NARROWED);
                    debug!(name = %self.name(name), "narrow: define clone");
                    self.scope.define(name, clone);
                }
            }

            NodeKind::Expr(ExprData { ty, kind: ExprKind::Var(l) | ExprKind::Let(l), .. }) => {
                let (ty, name, init) = (*ty, l.name, l.init);
                if !self.ast.flags(x).contains(NodeFlags::MARK_LOCAL) {
                    return;
                }
                let ty_opt = matches!(self.ast.type_kind(ty), Some(TypeKind::Optional { .. }));
                let init_opt = init.is_some_and(|i| {
                    matches!(
                        self.ast.type_kind(self.ast.expr_ty(i)),
                        Some(TypeKind::Optional { .. } | TypeKind::Unknown)
                    )
                });
                if matches!(self.ast.type_kind(ty), Some(TypeKind::Unknown))
                    || (!ty_opt && !init_opt)
                {
                    // not a narrowing definition after all
                    self.ast.remove_flags(x, NodeFlags::MARK_LOCAL);
                    return;
                }
                *flags |= HAS_LOCAL_DEF;
                self.ast.add_flags(x, NodeFlags::NARROWED);
                debug!(name = %self.name(name), "narrow: define binding");
                self.scope.define(name, x);
            }

            _ => {}
        }
    }

    /// Find the offending binding and operator for the definition/complex-op
    /// mixing error.
    fn narrow_error_find_local(
        &self,
        x: NodeId,
        local: &mut Option<NodeId>,
        op: &mut Option<Op>,
    ) -> bool {
        match &self.ast.node(x).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Var(_) | ExprKind::Let(_), .. }) => {
                if local.is_none() && self.ast.flags(x).contains(NodeFlags::NARROWED) {
                    *local = Some(x);
                }
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Prefix { op: Op::Not, .. }, .. }) => {
                if op.is_none() {
                    *op = Some(Op::Not);
                }
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Binary { op: Op::LOr, .. }, .. }) => {
                if op.is_none() {
                    *op = Some(Op::LOr);
                }
            }
            _ => {}
        }
        if local.is_some() && op.is_some() {
            return true;
        }
        for c in self.ast.children(x) {
            if self.ast.is_expr(c) && self.narrow_error_find_local(c, local, op) {
                return true;
            }
        }
        false
    }

    fn narrow_error_localdef_mix(&mut self, cond: NodeId) -> bool {
        let mut local = None;
        let mut op = None;
        self.narrow_error_find_local(cond, &mut local, &mut op);
        let origin = local.unwrap_or(cond);
        let which = match &self.ast.node(origin).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Var(_), .. }) => "var",
            _ => "let",
        };
        let op = op.unwrap_or(Op::LOr);
        let msg =
            format!("cannot use type-narrowing {which} definition with '{op}' operation");
        self.error(origin, msg);
        false
    }

    /// Narrow the bindings tested by `cond` in the current ("then") scope.
    /// When `elsedefs` is supplied, it receives inverted clones for the
    /// `else` scope. Returns false when narrowing rejected the condition.
    pub(crate) fn narrow_cond(
        &mut self,
        cond: NodeId,
        elsedefs: Option<&mut SmallVec<[NodeId; 4]>>,
    ) -> bool {
        let scope_len = self.scope.len();
        let mut flags = 0u32;

        self.narrow_cond1(&mut flags, cond);

        if flags == (HAS_COMPLEX_OP | HAS_LOCAL_DEF) {
            return self.narrow_error_localdef_mix(cond);
        }

        let mut elsedefs = elsedefs;

        for i in scope_len..self.scope.len() {
            let (name, n) = self.scope.entry(i);
            if !self.ast.flags(n).contains(NodeFlags::NARROWED) {
                continue;
            }

            let is_neg = self.ast.flags(n).contains(NodeFlags::MARK_NEG);
            let is_local = self.ast.flags(n).contains(NodeFlags::MARK_LOCAL);
            self.ast.remove_flags(n, NodeFlags::MARK_NEG | NodeFlags::MARK_LOCAL);

            // the optional is found either on the binding itself or on its
            // initializer:
            //   if let x = a      binding's own type is ?T
            //   if let x int = a  binding is int; the initializer is ?T
            let own_ty = self.ast.expr_ty(n);
            let opt_ty = if matches!(self.ast.type_kind(own_ty), Some(TypeKind::Optional { .. })) {
                own_ty
            } else {
                debug_assert!(self.ast.node(n).is_local());
                self.ast.node(n).local().and_then(|l| l.init).map(|i| self.ast.expr_ty(i)).unwrap_or(own_ty)
            };
            let mut ok_ty = match self.ast.type_kind(opt_ty) {
                Some(TypeKind::Optional { elem }) => *elem,
                _ => continue,
            };

            if is_local {
                // verify a declared annotation against the element type
                let declared = own_ty;
                if matches!(self.ast.type_kind(declared), Some(TypeKind::Unresolved { .. })) {
                    // The declared type is not known yet; retain it so a
                    // later pass resolves it.
                    ok_ty = declared;
                } else if declared != NodeId::UNKNOWN
                    && declared != opt_ty
                    && !self.is_assignable(declared, ok_ty)
                {
                    let origin =
                        self.ast.node(n).local().and_then(|l| l.init).unwrap_or(n);
                    let msg = format!(
                        "cannot assign value of type {} to {} of type {}",
                        self.fmt(ok_ty),
                        self.kindname(n),
                        self.fmt(declared)
                    );
                    self.error(origin, msg);
                }
            } else if let Some(defs) = elsedefs.as_mut() {
                // the `else` branch sees the inverse refinement
                let clone = self.ast.clone_node(n);
                let inv_ty = if is_neg { ok_ty } else { NodeId::VOID };
                self.ast.set_expr_ty(clone, inv_ty);
                defs.push(clone);
                debug!(
                    name = %self.name(name),
                    ty = %self.fmt(inv_ty),
                    polarity = if is_neg { "+" } else { "-" },
                    "narrow 'else'"
                );
            }

            let then_ty = if is_neg { NodeId::VOID } else { ok_ty };
            self.ast.set_expr_ty(n, then_ty);
            debug!(
                name = %self.name(name),
                ty = %self.fmt(then_ty),
                polarity = if is_neg { "-" } else { "+" },
                "narrow 'then'"
            );
        }

        true
    }

    /// Install the inverted bindings in the (freshly entered) `else` scope.
    pub(crate) fn install_elsedefs(&mut self, elsedefs: &[NodeId]) {
        for &n in elsedefs {
            let name = match &self.ast.node(n).kind {
                NodeKind::Expr(ExprData { kind: ExprKind::Id { name, .. }, .. }) => *name,
                _ => match self.ast.node(n).local() {
                    Some(l) => l.name,
                    None => continue,
                },
            };
            self.scope.define(name, n);
        }
    }
}
