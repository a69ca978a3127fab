//! Expression checking rules: identifiers, member access, subscripts,
//! unary and binary operations, and assignment.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, Op, TypeKind};
use cinder_common::srcloc::SrcLoc;

use crate::context::Checker;

impl Checker<'_> {
    // -----------------------------------------------------------------------
    // wrapper nodes

    /// Move a node's use count onto a wrapper that now stands in for it.
    pub(crate) fn transfer_nuse(&mut self, wrapper: NodeId, wrappee: NodeId) {
        let n = self.ast.node(wrappee).nuse;
        self.ast.node_mut(wrapper).nuse = n;
        if n > 0 {
            self.ast.node_mut(wrappee).nuse = n - 1;
        }
    }

    /// Synthesize a checked `&T` / `mut&T` around `elem`.
    pub(crate) fn mk_ref_type(&mut self, elem: NodeId, is_mut: bool) -> NodeId {
        let t = self.ast.mk_ref_type(SrcLoc::NONE, elem, is_mut);
        let elem_checked = self.ast.flags(elem) & NodeFlags::CHECKED;
        self.ast.node_mut(t).flags = elem_checked;
        let ptr_size = self.compiler.options.target.ptr_size;
        if let Some(td) = self.ast.type_data_mut(t) {
            td.size = u64::from(ptr_size);
            td.align = ptr_size;
        }
        self.transfer_nuse(t, elem);
        t
    }

    /// Synthesize a checked `?T` around `elem`.
    pub(crate) fn mk_optional_type_checked(&mut self, elem: NodeId) -> NodeId {
        let t = self.ast.mk_optional_type(SrcLoc::NONE, elem);
        self.ast.add_flags(t, NodeFlags::CHECKED);
        let ptr_size = self.compiler.options.target.ptr_size;
        if let Some(td) = self.ast.type_data_mut(t) {
            td.size = u64::from(ptr_size);
            td.align = ptr_size;
        }
        let (canonical, _) = self.intern_usertype(t);
        canonical
    }

    /// Wrap `refval` in an implicit dereference node.
    pub(crate) fn mk_deref(&mut self, refval: NodeId, loc: SrcLoc) -> NodeId {
        let d = self.ast.mk_deref(loc, refval);
        let keep = self.ast.flags(refval) & (NodeFlags::RVALUE | NodeFlags::CHECKED);
        self.ast.node_mut(d).flags = keep;
        let rt = self.ast.expr_ty(refval);
        let elem = match self.ast.type_kind(rt) {
            Some(TypeKind::Ptr { elem } | TypeKind::Ref { elem } | TypeKind::MutRef { elem }) => {
                *elem
            }
            _ => {
                debug_assert!(false, "deref of non-pointer");
                NodeId::VOID
            }
        };
        self.ast.set_expr_ty(d, elem);
        self.transfer_nuse(d, refval);
        d
    }

    /// Wrap `value` in a return node (implicit return of a trailing
    /// expression).
    pub(crate) fn mk_return(&mut self, value: NodeId, loc: SrcLoc) -> NodeId {
        let r = self.ast.mk_return(loc, Some(value));
        let keep = self.ast.flags(value) & NodeFlags::CHECKED;
        self.ast.node_mut(r).flags = keep;
        self.ast.add_flags(value, NodeFlags::RVALUE);
        let t = self.ast.expr_ty(value);
        self.ast.set_expr_ty(r, t);
        self.transfer_nuse(r, value);
        r
    }

    /// When a reference value is assigned to a non-reference target, read
    /// through the reference. Returns the replacement node, if any.
    pub(crate) fn implicit_rvalue_deref(&mut self, ltype: NodeId, rval: NodeId) -> Option<NodeId> {
        let lt = self.unwrap_alias(ltype);
        let rt = self.unwrap_alias(self.ast.expr_ty(rval));
        let l_ref_like = self.ast.type_kind(lt).is_some_and(|k| k.is_ref_like());
        let r_ref_like = self.ast.type_kind(rt).is_some_and(|k| k.is_ref_like());
        if !l_ref_like && r_ref_like {
            let loc = self.ast.node(rval).loc;
            Some(self.mk_deref(rval, loc))
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // shared error forms

    pub(crate) fn error_incompatible_types(&mut self, origin: NodeId, x: NodeId, y: NodeId) {
        let msg = format!(
            "incompatible types {} and {} in {}",
            self.fmt(x),
            self.fmt(y),
            self.kindname(origin)
        );
        self.error(origin, msg);
    }

    pub(crate) fn error_unassignable_type(&mut self, dst: NodeId, src: NodeId) {
        let mut origin = dst;
        if let Some(l) = self.ast.node(dst).local()
            && let Some(init) = l.init
            && self.ast.node(init).loc.is_known()
        {
            origin = init;
        }

        // a narrowed source means the optional is known to be empty here
        let src_narrowed = self.ast.flags(src).contains(NodeFlags::NARROWED)
            || matches!(
                &self.ast.node(src).kind,
                NodeKind::Expr(ExprData { kind: ExprKind::Id { target: Some(t), .. }, .. })
                    if self.ast.flags(*t).contains(NodeFlags::NARROWED)
            );
        if src_narrowed {
            let msg = format!("optional value {} is empty here", self.fmt(src));
            self.error(src, msg);
            return;
        }

        let mut srctype = self.ast.expr_ty(src);
        // a narrowed destination compares against the optional's element
        if self.ast.flags(dst).contains(NodeFlags::NARROWED)
            && let Some(TypeKind::Optional { elem }) = self.ast.type_kind(srctype)
        {
            srctype = *elem;
        }

        let msg = format!(
            "cannot assign value of type {} to {} of type {}",
            self.fmt(srctype),
            self.kindname(dst),
            self.fmt(self.ast.expr_ty(dst))
        );
        self.error(origin, msg);
    }

    pub(crate) fn error_optional_access(&mut self, t: NodeId, expr: NodeId, access: NodeId) {
        let msg = format!("optional value of type {} may not be valid", self.fmt(t));
        self.error(expr, msg);
        if self.ast.node(access).loc.is_known() {
            let help = format!(
                "check {} before access, e.g: if {} {}",
                self.fmt(access),
                self.fmt(access),
                self.fmt(expr)
            );
            self.help(access, help);
        }
    }

    fn error_cannot_use_as_bool(&mut self, x: NodeId) {
        let msg = format!("cannot use type {} as bool", self.fmt(self.ast.expr_ty(x)));
        self.error(x, msg);
    }

    // -----------------------------------------------------------------------
    // identifiers

    pub(crate) fn check_id_expr(&mut self, n: NodeId) {
        let (name, mut target) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Id { name, target }, .. }) => (*name, *target),
            _ => return,
        };

        if target.is_none() || self.ast.flags(n).contains(NodeFlags::UNKNOWN) {
            match self.lookup(name) {
                Some(t) => {
                    target = Some(t);
                    if let Some(ExprData { kind: ExprKind::Id { target: slot, .. }, .. }) =
                        self.ast.expr_data_mut(n)
                    {
                        *slot = Some(t);
                    }
                }
                None => return self.unknown_identifier(n),
            }
        }
        let target = target.unwrap_or(n);

        if self.ast.is_type(target) {
            let t2 = self.check_type(target);
            self.ast.set_expr_ty(n, t2);
            return;
        }

        if self.ast.is_expr(target) {
            self.check_expr(target);
        }

        let own_ty = self.ast.expr_ty(n);
        if self.ast.flags(n).contains(NodeFlags::NARROWED)
            && matches!(self.ast.type_kind(own_ty), Some(TypeKind::Optional { .. }))
        {
            // type already refined by an enclosing condition
            return;
        }
        let t = self.ast.expr_ty(target);
        self.ast.set_expr_ty(n, t);
    }

    // -----------------------------------------------------------------------
    // member access

    fn member_ns(&mut self, n: NodeId) {
        let (recv, name) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Member { recv, name, .. }, .. }) => {
                (*recv, *name)
            }
            _ => return,
        };
        let ns = self.ast.unwrap_id(recv);
        let (members, member_names, is_pkg, pkg_path, ns_name) =
            match &self.ast.node(ns).kind {
                NodeKind::Expr(ExprData { kind: ExprKind::Ns(data), .. }) => (
                    data.members.clone(),
                    data.member_names.clone(),
                    self.ast.flags(ns).contains(NodeFlags::PKG_NS),
                    data.pkg_path.clone(),
                    data.name,
                ),
                _ => {
                    let msg = format!("{} is not a namespace", self.fmt(recv));
                    self.error(n, msg);
                    let ctx = self.typectx;
                    self.ast.set_expr_ty(n, ctx);
                    return;
                }
            };

        for (i, &member_name) in member_names.iter().enumerate() {
            if member_name == name {
                let target = members[i];
                if !self.ast.is_expr(target) {
                    let msg = format!("names a {}", self.kindname(target));
                    self.error(n, msg);
                    return;
                }
                self.ast.inc_use(target);
                if let Some(ExprData { kind: ExprKind::Member { target: slot, .. }, .. }) =
                    self.ast.expr_data_mut(n)
                {
                    *slot = Some(target);
                }
                let t = self.ast.expr_ty(target);
                self.ast.set_expr_ty(n, t);
                return;
            }
        }

        // not found; adopt the context type to avoid cascading errors
        let ctx = self.typectx;
        self.ast.set_expr_ty(n, ctx);

        if is_pkg {
            let path = pkg_path.unwrap_or_default();
            let msg = format!("package \"{}\" has no member \"{}\"", path, self.name(name));
            self.error(n, msg);
        } else {
            let nsname = match ns_name {
                Some(a) if a != cinder_common::kw::UNDERSCORE => self.name(a).to_string(),
                _ => match &self.ast.node(recv).kind {
                    NodeKind::Expr(ExprData { kind: ExprKind::Id { name, .. }, .. }) => {
                        self.name(*name).to_string()
                    }
                    _ => String::new(),
                },
            };
            let msg = format!("namespace {} has no member \"{}\"", nsname, self.name(name));
            self.error(n, msg);
        }
    }

    /// Find a field of `base_ty` or a type function of the receiver type.
    fn find_member(
        &mut self,
        base_ty: NodeId,
        recv_ty: NodeId,
        name: cinder_common::Atom,
    ) -> Option<NodeId> {
        if let Some(TypeKind::Struct(st)) = self.ast.type_kind(base_ty) {
            let fields = st.fields.clone();
            for f in fields {
                if self.ast.node(f).local().is_some_and(|l| l.name == name) {
                    self.check_expr(f);
                    return Some(f);
                }
            }
        }

        // fall back to type functions of the unwrapped receiver type
        let recv_base = self.unwrap_ptr(recv_ty);
        let recv_typeid = self.typeid(recv_base);
        let fun = self.pkg.type_funs.lookup(&recv_typeid, name)?;
        if !self.ast.is_checked(fun) {
            self.ast.add_flags(fun, NodeFlags::CHECKED);
            self.check_fun(fun);
        }
        Some(fun)
    }

    pub(crate) fn check_member(&mut self, n: NodeId) {
        let (recv, name) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Member { recv, name, .. }, .. }) => {
                (*recv, *name)
            }
            _ => return,
        };

        self.ast.inc_use(recv);
        let recv2 = self.check_expr(recv);
        if recv2 != recv {
            if let Some(ExprData { kind: ExprKind::Member { recv: slot, .. }, .. }) =
                self.ast.expr_data_mut(n)
            {
                *slot = recv2;
            }
        }

        let recv_ty = self.ast.expr_ty(recv2);
        let base_ty = self.unwrap_ptr_and_alias(recv_ty);

        if matches!(self.ast.type_kind(base_ty), Some(TypeKind::Ns)) {
            return self.member_ns(n);
        }

        // members cannot be accessed through an optional that may be empty
        if matches!(self.ast.type_kind(base_ty), Some(TypeKind::Optional { .. })) {
            return self.error_optional_access(base_ty, n, recv2);
        }

        self.typectx_push(NodeId::UNKNOWN);
        let target = self.find_member(base_ty, recv_ty, name);
        self.typectx_pop();

        match target {
            Some(target) => {
                self.ast.inc_use(target);
                if let Some(ExprData { kind: ExprKind::Member { target: slot, .. }, .. }) =
                    self.ast.expr_data_mut(n)
                {
                    *slot = Some(target);
                }
                let t = self.ast.expr_ty(target);
                self.ast.set_expr_ty(n, t);
            }
            None => {
                let ctx = self.typectx;
                self.ast.set_expr_ty(n, ctx);
                if recv_ty != NodeId::UNKNOWN || !self.reported_error {
                    let msg = format!(
                        "{} has no field or method \"{}\"",
                        self.fmt(recv_ty),
                        self.name(name)
                    );
                    self.error(n, msg);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // subscript

    /// Check an index expression under `uint` context; mark it constant if
    /// it evaluates at compile time.
    fn unsigned_index_expr(&mut self, index: NodeId) -> (NodeId, u64) {
        self.ast.inc_use(index);
        self.typectx_push(NodeId::UINT);
        let index2 = self.check_expr(index);
        self.typectx_pop();

        if let Some(v) = crate::comptime::comptime_eval_uint(self.ast, index2) {
            self.ast.add_flags(index2, NodeFlags::CONST);
            return (index2, v);
        }

        let t = self.ast.expr_ty(index2);
        let ok = match self.ast.type_kind(t) {
            Some(TypeKind::U8 | TypeKind::Uint) => true,
            Some(TypeKind::U16 | TypeKind::U32 | TypeKind::U64) => {
                // acceptable when convertible to uint without loss
                self.ast.type_size(t) <= self.ast.type_size(self.compiler.uint_type)
            }
            _ => false,
        };
        if !ok {
            let msg = format!("invalid index type {}; expecting uint", self.fmt(t));
            self.error(index2, msg);
        }
        (index2, 0)
    }

    pub(crate) fn check_subscript(&mut self, n: NodeId) {
        let (recv, index) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Subscript { recv, index, .. }, .. }) => {
                (*recv, *index)
            }
            _ => return,
        };

        self.ast.inc_use(recv);
        self.typectx_push(NodeId::UNKNOWN);
        let recv2 = self.check_expr(recv);
        self.typectx_pop();

        let (index2, index_val) = self.unsigned_index_expr(index);
        if let Some(ExprData {
            kind: ExprKind::Subscript { recv: rslot, index: islot, index_val: vslot, .. },
            ..
        }) = self.ast.expr_data_mut(n)
        {
            *rslot = recv2;
            *islot = index2;
            *vslot = index_val;
        }

        let recv_base = self.unwrap_ptr_and_alias(self.ast.expr_ty(recv2));
        let ctx = self.typectx;
        self.ast.set_expr_ty(n, ctx); // avoid cascading errors

        match self.ast.type_kind(recv_base).cloned() {
            Some(TypeKind::Array { elem, len, len_expr, .. }) => {
                self.ast.set_expr_ty(n, elem);
                let is_const = self.ast.flags(index2).contains(NodeFlags::CONST);
                if is_const && len_expr.is_some() && index_val >= len {
                    let msg = format!(
                        "out of bounds: element {} of array {}",
                        index_val,
                        self.fmt(recv_base)
                    );
                    self.error(n, msg);
                }
            }
            Some(TypeKind::Slice { elem } | TypeKind::MutSlice { elem }) => {
                self.ast.set_expr_ty(n, elem);
            }
            Some(TypeKind::Optional { .. }) => {
                self.error_optional_access(recv_base, n, recv2);
            }
            _ => {
                let msg = format!("cannot index into type {}", self.fmt(recv_base));
                self.error(n, msg);
            }
        }
    }

    // -----------------------------------------------------------------------
    // unary operations

    pub(crate) fn check_unary(&mut self, n: NodeId) {
        let (op, expr) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData {
                kind: ExprKind::Prefix { op, expr } | ExprKind::Postfix { op, expr },
                ..
            }) => (*op, *expr),
            _ => return,
        };

        self.ast.inc_use(expr);
        let expr2 = self.check_expr(expr);
        if expr2 != expr {
            if let Some(ExprData {
                kind: ExprKind::Prefix { expr: slot, .. } | ExprKind::Postfix { expr: slot, .. },
                ..
            }) = self.ast.expr_data_mut(n)
            {
                *slot = expr2;
            }
        }

        let own_ty = self.ast.expr_ty(n);
        if own_ty == NodeId::UNKNOWN
            || matches!(self.ast.type_kind(own_ty), Some(TypeKind::Unresolved { .. }))
        {
            let t = self.ast.expr_ty(expr2);
            self.ast.set_expr_ty(n, t);
        }

        match op {
            Op::Ref | Op::MutRef => {
                let t = self.ast.expr_ty(expr2);
                let rt = self.mk_ref_type(t, op == Op::MutRef);
                self.ast.set_expr_ty(n, rt);
            }
            Op::Inc | Op::Dec => {
                self.check_assign_target(expr2);
            }
            Op::Not => {
                let t = self.ast.expr_ty(expr2);
                let ok = matches!(
                    self.ast.type_kind(t),
                    Some(TypeKind::Bool | TypeKind::Optional { .. })
                );
                if !ok {
                    let msg = format!("type {} has no '{}' operator", self.fmt(t), op);
                    self.error(n, msg);
                }
                self.ast.set_expr_ty(n, NodeId::BOOL);
            }
            _ => {
                debug_assert!(false, "unexpected unary operator");
            }
        }
    }

    pub(crate) fn check_deref(&mut self, n: NodeId) {
        let expr = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Deref { expr }, .. }) => *expr,
            _ => return,
        };

        let expr2 = self.check_expr(expr);
        if expr2 != expr {
            if let Some(ExprData { kind: ExprKind::Deref { expr: slot }, .. }) =
                self.ast.expr_data_mut(n)
            {
                *slot = expr2;
            }
        }

        let t = self.ast.expr_ty(expr2);
        let elem = match self.ast.type_kind(t) {
            Some(TypeKind::Ptr { elem } | TypeKind::Ref { elem } | TypeKind::MutRef { elem }) => {
                *elem
            }
            _ => {
                let msg = format!("dereferencing non-pointer value of type {}", self.fmt(t));
                return self.error(n, msg);
            }
        };
        self.ast.set_expr_ty(n, elem);

        // deref of a reference to an owning value would move out of a borrow
        let t_is_ref = self.ast.type_kind(t).is_some_and(|k| k.is_ref());
        if t_is_ref && self.is_owner(elem) {
            let msg = format!("cannot transfer ownership of borrowed {}", self.fmt(t));
            self.error(n, msg);
        }
    }

    // -----------------------------------------------------------------------
    // binary operations

    pub(crate) fn check_binop(&mut self, n: NodeId) {
        let (op, lhs, rhs) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Binary { op, lhs, rhs }, .. }) => {
                (*op, *lhs, *rhs)
            }
            _ => return,
        };

        let lhs = {
            let l2 = self.check_expr(lhs);
            self.ast.inc_use(l2);
            l2
        };
        self.typectx_push(self.ast.expr_ty(lhs));
        let rhs = {
            let r2 = self.check_expr(rhs);
            self.ast.inc_use(r2);
            r2
        };
        self.typectx_pop();
        if let Some(ExprData { kind: ExprKind::Binary { lhs: l, rhs: r, .. }, .. }) =
            self.ast.expr_data_mut(n)
        {
            *l = lhs;
            *r = rhs;
        }

        let lt = self.ast.expr_ty(lhs);
        let rt = self.ast.expr_ty(rhs);

        match op {
            Op::Eq | Op::NotEq | Op::Lt | Op::Gt | Op::LtEq | Op::GtEq => {
                if !self.is_equivalent(lt, rt) {
                    self.error_incompatible_types(n, lt, rt);
                }
                self.ast.set_expr_ty(n, NodeId::BOOL);
            }

            Op::LAnd => {
                // operands may be bool, optional, or already narrowed
                for side in [lhs, rhs] {
                    let t = self.ast.expr_ty(side);
                    let ok = self.ast.flags(side).contains(NodeFlags::NARROWED)
                        || t == NodeId::BOOL
                        || matches!(self.ast.type_kind(t), Some(TypeKind::Optional { .. }));
                    if !ok {
                        self.error_cannot_use_as_bool(side);
                    }
                }
                self.ast.set_expr_ty(n, NodeId::BOOL);
            }

            Op::LOr => {
                for side in [lhs, rhs] {
                    let t = self.ast.expr_ty(side);
                    let ok = t == NodeId::BOOL
                        || matches!(self.ast.type_kind(t), Some(TypeKind::Optional { .. }));
                    if !ok {
                        self.error_cannot_use_as_bool(side);
                    }
                }
                self.ast.set_expr_ty(n, NodeId::BOOL);
            }

            _ => {
                let lt_u = self.unwrap_alias(lt);
                let rt_u = self.unwrap_alias(rt);
                if !self.is_compatible(lt_u, rt_u) {
                    self.error_incompatible_types(n, lt, rt);
                }
                let mut lhs2 = lhs;
                if self.ast.type_kind(lt_u).is_some_and(|k| k.is_ref()) {
                    let loc = self.ast.node(lhs).loc;
                    lhs2 = self.mk_deref(lhs, loc);
                }
                let mut rhs2 = rhs;
                if self.ast.type_kind(rt_u).is_some_and(|k| k.is_ref()) {
                    let loc = self.ast.node(rhs).loc;
                    rhs2 = self.mk_deref(rhs, loc);
                }
                if lhs2 != lhs || rhs2 != rhs {
                    if let Some(ExprData { kind: ExprKind::Binary { lhs: l, rhs: r, .. }, .. }) =
                        self.ast.expr_data_mut(n)
                    {
                        *l = lhs2;
                        *r = rhs2;
                    }
                }
                let t = self.ast.expr_ty(lhs2);
                self.ast.set_expr_ty(n, t);
            }
        }

        let final_lt = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Binary { lhs, .. }, .. }) => {
                self.ast.expr_ty(*lhs)
            }
            _ => lt,
        };
        if !self.type_has_binop(final_lt, op) {
            let msg = format!("type {} has no '{}' operator", self.fmt(final_lt), op);
            self.error(n, msg);
        }
    }

    // -----------------------------------------------------------------------
    // assignment

    fn check_assign_to_member(&mut self, m: NodeId) -> bool {
        let recv = match &self.ast.node(m).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Member { recv, .. }, .. }) => *recv,
            _ => return true,
        };
        let recv_ty = self.ast.expr_ty(recv);
        match self.ast.type_kind(recv_ty) {
            Some(TypeKind::Struct(_)) => {
                // assignment through a by-value `this` would mutate a copy
                let target = self.ast.unwrap_id(recv);
                let is_this = self.ast.node(target).local().is_some_and(|l| l.is_this);
                let is_param = matches!(
                    &self.ast.node(target).kind,
                    NodeKind::Expr(ExprData { kind: ExprKind::Param(_), .. })
                );
                if is_param && is_this {
                    let msg = format!("assignment to immutable struct {}", self.fmt(recv));
                    self.error(recv, msg);
                    return false;
                }
                true
            }
            Some(TypeKind::Ref { .. }) => {
                let msg = format!("assignment to immutable reference {}", self.fmt(recv));
                self.error(recv, msg);
                false
            }
            _ => true,
        }
    }

    fn check_assign_to_id(&mut self, id: NodeId) -> bool {
        let (name, target) = match &self.ast.node(id).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Id { name, target }, .. }) => {
                (*name, *target)
            }
            _ => return false,
        };
        // target is None when the identifier is undefined
        let Some(target) = target else { return false };
        match &self.ast.node(target).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Id { .. }, .. }) => {
                // assignment to a type-narrowed binding,
                // e.g. "var a ?int; if a { a = 3 }"
                let msg = format!(
                    "cannot assign to type-narrowed binding \"{}\"",
                    self.name(name)
                );
                self.error(id, msg);
                true
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Var(_), .. }) => true,
            NodeKind::Expr(ExprData { kind: ExprKind::Param(l), .. }) if !l.is_this => true,
            _ => {
                let msg = format!(
                    "cannot assign to {} \"{}\"",
                    self.kindname(target),
                    self.name(name)
                );
                self.error(id, msg);
                false
            }
        }
    }

    /// Verify `target` is a valid assignment destination.
    pub(crate) fn check_assign_target(&mut self, target: NodeId) -> bool {
        match &self.ast.node(target).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Id { .. }, .. }) => {
                self.check_assign_to_id(target)
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Member { .. }, .. }) => {
                self.check_assign_to_member(target)
            }
            NodeKind::Expr(ExprData { kind: ExprKind::Deref { expr }, .. }) => {
                // e.g. "var x mut&int; *x = 3"
                let t = self.ast.expr_ty(*expr);
                match self.ast.type_kind(t) {
                    Some(TypeKind::Ref { .. }) => {
                        let msg = format!(
                            "cannot assign via immutable reference of type {}",
                            self.fmt(t)
                        );
                        self.error(target, msg);
                        false
                    }
                    Some(TypeKind::MutRef { .. } | TypeKind::Ptr { .. }) => true,
                    _ => {
                        let msg = format!("cannot assign to {}", self.kindname(target));
                        self.error(target, msg);
                        false
                    }
                }
            }
            _ => {
                let msg = format!("cannot assign to {}", self.kindname(target));
                self.error(target, msg);
                false
            }
        }
    }

    pub(crate) fn check_assign(&mut self, n: NodeId) {
        let (lhs, rhs) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Assign { lhs, rhs, .. }, .. }) => {
                (*lhs, *rhs)
            }
            _ => return,
        };

        // "_ = expr" accepts any expression and adopts its type
        let lhs_is_underscore = matches!(
            &self.ast.node(lhs).kind,
            NodeKind::Expr(ExprData { kind: ExprKind::Id { name, .. }, .. })
                if *name == cinder_common::kw::UNDERSCORE
        );
        if lhs_is_underscore {
            self.typectx_push(self.ast.expr_ty(lhs));
            let rhs2 = self.check_expr(rhs);
            self.ast.inc_use(rhs2);
            self.typectx_pop();
            if let Some(ExprData { kind: ExprKind::Assign { rhs: r, .. }, .. }) =
                self.ast.expr_data_mut(n)
            {
                *r = rhs2;
            }
            let t = self.ast.expr_ty(rhs2);
            self.ast.set_expr_ty(n, t);
            return;
        }

        let lhs2 = self.check_expr(lhs);
        self.ast.inc_use(lhs2);

        self.typectx_push(self.ast.expr_ty(lhs2));
        let rhs2 = self.check_expr(rhs);
        self.ast.inc_use(rhs2);
        self.typectx_pop();

        if let Some(ExprData { kind: ExprKind::Assign { lhs: l, rhs: r, .. }, .. }) =
            self.ast.expr_data_mut(n)
        {
            *l = lhs2;
            *r = rhs2;
        }

        let lt = self.ast.expr_ty(lhs2);
        self.ast.set_expr_ty(n, lt);

        if !self.is_assignable(lt, self.ast.expr_ty(rhs2)) {
            self.error_unassignable_type(n, rhs2);
        }

        self.check_assign_target(lhs2);
    }
}
