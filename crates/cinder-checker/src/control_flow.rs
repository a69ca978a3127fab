//! Blocks, conditionals and returns.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, TypeKind, expr_no_side_effects};
use smallvec::SmallVec;

use crate::context::Checker;

impl Checker<'_> {
    fn name_is_reserved(&self, name: cinder_common::Atom) -> bool {
        self.name(name).starts_with("__co")
    }

    fn report_unused(&mut self, n: NodeId) -> bool {
        debug_assert!(self.ast.is_expr(n));

        match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData {
                kind: ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l),
                ..
            }) => {
                let (name, name_loc) = (l.name, l.name_loc);
                if name != cinder_common::kw::UNDERSCORE
                    && !self.name_is_reserved(name)
                    && self.no_error()
                {
                    let msg = format!("unused {} {}", self.kindname(n), self.name(name));
                    self.warning_loc(name_loc, msg);
                    return true;
                }
                return false;
            }
            NodeKind::Expr(ExprData { kind: ExprKind::If { .. }, .. }) => {
                if !self.ast.flags(n).contains(NodeFlags::RVALUE) {
                    return false;
                }
            }
            // control transfer is its own effect
            NodeKind::Expr(ExprData { kind: ExprKind::Return { .. }, .. }) => return false,
            _ => {
                if !expr_no_side_effects(self.ast, n) {
                    return false;
                }
            }
        }

        if self.no_error() {
            let msg = format!("unused {} {}", self.kindname(n), self.fmt(n));
            self.warning(n, msg);
            return true;
        }
        false
    }

    fn patch_block_child(&mut self, block: NodeId, i: usize, c: NodeId) {
        if let Some(ExprData { kind: ExprKind::Block { children, .. }, .. }) =
            self.ast.expr_data_mut(block)
        {
            children[i] = c;
        }
    }

    /// Check a block's statements without entering a scope (the caller owns
    /// the scope, e.g. an `if` branch or a function body).
    pub(crate) fn check_block_noscope(&mut self, n: NodeId) {
        let children = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Block { children, .. }, .. }) => {
                children.clone()
            }
            _ => return,
        };
        let count = children.len();
        if count == 0 {
            self.ast.set_expr_ty(n, NodeId::VOID);
            return;
        }

        let rvalue = self.ast.flags(n).contains(NodeFlags::RVALUE);
        let last_is_return = matches!(
            &self.ast.node(children[count - 1]).kind,
            NodeKind::Expr(ExprData { kind: ExprKind::Return { .. }, .. })
        );

        // if the block is an rvalue, its last expression is the block's
        // value and is analyzed separately below
        let mut stmt_end = count - usize::from(rvalue && !last_is_return);
        let mut children = children;
        let mut exited = false;

        let mut i = 0;
        while i < stmt_end {
            let c = children[i];
            let c2 = self.check_stmt(c);
            if c2 != c {
                children[i] = c2;
                self.patch_block_child(n, i, c2);
            }

            if matches!(
                &self.ast.node(c2).kind,
                NodeKind::Expr(ExprData { kind: ExprKind::Return { .. }, .. })
            ) {
                // the rest of the block never executes
                for &rest in &children[i + 1..] {
                    self.ast.node_mut(rest).nuse = 0;
                }
                stmt_end = count;
                let t = self.ast.expr_ty(c2);
                self.ast.set_expr_ty(n, t);
                self.ast.add_flags(n, NodeFlags::EXIT);
                exited = true;
                break;
            }
            i += 1;
        }

        if !exited && stmt_end != count {
            // rvalue block: the last entry is the implicitly-returned value
            let last = children[count - 1];
            self.ast.add_flags(last, NodeFlags::RVALUE);
            let last2 = self.check_expr(last);
            if last2 != last {
                children[count - 1] = last2;
                self.patch_block_child(n, count - 1, last2);
            }
            self.ast.inc_use(last2);
            let t = self.ast.expr_ty(last2);
            self.ast.set_expr_ty(n, t);
        } else if !exited {
            self.ast.set_expr_ty(n, NodeId::VOID);
        }

        // report unused expressions, stopping at the first one
        for &c in children.iter().take(stmt_end) {
            if self.ast.node(c).nuse == 0 && self.ast.is_expr(c) && self.report_unused(c) {
                break;
            }
        }
    }

    pub(crate) fn check_block(&mut self, n: NodeId) {
        self.enter_scope();
        self.check_block_noscope(n);
        self.leave_scope();
    }

    // -----------------------------------------------------------------------
    // if

    pub(crate) fn check_if(&mut self, n: NodeId) {
        let (cond, then_block, else_block) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::If { cond, then_block, else_block }, .. }) => {
                (*cond, *then_block, *else_block)
            }
            _ => return,
        };

        let cond_has_unknown = self.ast.flags(cond).contains(NodeFlags::UNKNOWN);
        if cond_has_unknown {
            // first pass of the two-pass narrowing: mark binding definitions
            // appearing in the condition before they are checked
            self.premark_cond_locals(cond);
        }

        // the "then" scope also receives narrowed bindings from the condition
        self.enter_scope();

        debug_assert!(self.ast.flags(cond).contains(NodeFlags::RVALUE));
        self.ast.inc_use(cond);
        let cond = {
            let c2 = self.check_expr(cond);
            if c2 != cond
                && let Some(ExprData { kind: ExprKind::If { cond: slot, .. }, .. }) =
                    self.ast.expr_data_mut(n)
            {
                *slot = c2;
            }
            c2
        };

        let mut elsedefs: SmallVec<[NodeId; 4]> = SmallVec::new();
        if cond_has_unknown
            && !self.narrow_cond(cond, else_block.is_some().then_some(&mut elsedefs))
        {
            self.leave_scope();
            return;
        }

        let cond_ty = self.ast.expr_ty(cond);
        let cond_is_opt = matches!(self.ast.type_kind(cond_ty), Some(TypeKind::Optional { .. }));
        if !self.ast.flags(cond).contains(NodeFlags::NARROWED)
            && cond_ty != NodeId::BOOL
            && !cond_is_opt
        {
            self.error(cond, "conditional is not a boolean nor an optional type".to_string());
            self.leave_scope();
            return;
        }

        // "then" branch
        let rvalue = self.ast.flags(n) & NodeFlags::RVALUE;
        self.ast.add_flags(then_block, rvalue);
        self.check_block_noscope(then_block);
        self.leave_scope();

        // "else" branch, with the inverted narrowed bindings installed
        if let Some(eb) = else_block {
            self.enter_scope();
            self.install_elsedefs(&elsedefs);
            self.ast.add_flags(eb, rvalue);
            self.check_block_noscope(eb);
            self.leave_scope();
        }

        // unless the "if" is used as an rvalue, we are done
        if !self.ast.flags(n).contains(NodeFlags::RVALUE) {
            self.ast.set_expr_ty(n, NodeId::VOID);
            return;
        }

        let then_ty = self.ast.expr_ty(then_block);
        if let Some(eb) = else_block
            && self.ast.expr_ty(eb) != NodeId::VOID
        {
            // "if ... else" => T
            let else_ty = self.ast.expr_ty(eb);
            self.ast.set_expr_ty(n, then_ty);
            if !self.is_assignable(then_ty, else_ty)
                && !matches!(self.ast.type_kind(then_ty), Some(TypeKind::Unknown))
                && !matches!(self.ast.type_kind(else_ty), Some(TypeKind::Unknown))
            {
                let msg = format!(
                    "incompatible types {} and {} in \"if\" branches",
                    self.fmt(then_ty),
                    self.fmt(else_ty)
                );
                self.error(eb, msg);
            }
        } else {
            // "if" without else => ?T
            let t = if matches!(self.ast.type_kind(then_ty), Some(TypeKind::Optional { .. })) {
                then_ty
            } else {
                self.mk_optional_type_checked(then_ty)
            };
            self.ast.set_expr_ty(n, t);
        }
    }

    // -----------------------------------------------------------------------
    // return

    /// Check a (possibly absent) return value against the enclosing
    /// function's result type. Returns the possibly-rewritten value and the
    /// value's type.
    pub(crate) fn check_retval(
        &mut self,
        origin: NodeId,
        value: Option<NodeId>,
    ) -> (Option<NodeId>, NodeId) {
        debug_assert!(self.fun.is_some());
        let Some(fun) = self.fun else { return (value, NodeId::VOID) };
        let fun_ty = self.ast.expr_ty(fun);
        let result = match self.ast.type_kind(fun_ty) {
            Some(TypeKind::Fun { result, .. }) => *result,
            _ => NodeId::VOID,
        };
        let fun_name = match &self.ast.node(fun).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) => f.name,
            _ => None,
        };
        let result_loc = match &self.ast.node(fun).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) => f.result_loc,
            _ => cinder_common::srcloc::SrcLoc::NONE,
        };

        let (value, t) = match value {
            Some(v) => {
                self.ast.inc_use(v);
                let v2 = self.check_expr(v);
                (Some(v2), self.ast.expr_ty(v2))
            }
            None => (None, NodeId::VOID),
        };

        if !self.is_assignable(result, t) {
            let name_part = fun_name
                .map(|a| format!("{} ", self.name(a)))
                .unwrap_or_default();
            if result == NodeId::VOID {
                let msg = format!("function {name_part}does not return a value");
                self.error(origin, msg);
            } else {
                if t == NodeId::VOID {
                    let mut loc = self.ast.node(origin).loc;
                    if let NodeKind::Expr(ExprData {
                        kind: ExprKind::Block { end_loc, .. }, ..
                    }) = &self.ast.node(origin).kind
                    {
                        loc = *end_loc;
                    }
                    self.error_loc(loc, "missing return value".to_string());
                } else if t != NodeId::UNKNOWN || !self.reported_error {
                    let msg = format!("invalid function result type: {}", self.fmt(t));
                    self.error(origin, msg);
                }
                if result_loc.is_known() && (t != NodeId::UNKNOWN || !self.reported_error) {
                    let msg =
                        format!("function {name_part}returns {}", self.fmt(result));
                    self.help_loc(result_loc, msg);
                }
            }
        }

        match value {
            Some(v) => {
                let v = self.implicit_rvalue_deref(result, v).unwrap_or(v);
                (Some(v), self.ast.expr_ty(v))
            }
            None => (None, NodeId::VOID),
        }
    }

    pub(crate) fn check_return(&mut self, n: NodeId) {
        if self.fun.is_none() {
            return self.error(n, "return outside of function".to_string());
        }
        let value = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Return { value }, .. }) => *value,
            _ => return,
        };
        let (value2, t) = self.check_retval(n, value);
        if let Some(ExprData { kind: ExprKind::Return { value: slot }, .. }) =
            self.ast.expr_data_mut(n)
        {
            *slot = value2;
        }
        self.ast.set_expr_ty(n, t);
    }
}
