//! Declaration checking: locals (fields, parameters, `var`, `let`),
//! functions, and typedefs.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, TypeKind};
use cinder_common::kw;

use crate::context::Checker;

impl Checker<'_> {
    /// Check a local directly, bypassing the expression dispatcher.
    pub(crate) fn check_local(&mut self, n: NodeId) {
        if !self.ast.is_checked(n) {
            self.ast.add_flags(n, NodeFlags::CHECKED);
            self.local_rule(n);
        }
    }

    pub(crate) fn local_rule(&mut self, n: NodeId) {
        debug_assert!(
            self.ast.node(n).nuse == 0
                || self.ast.node(n).local().is_some_and(|l| l.name != kw::UNDERSCORE),
            "used '_' local"
        );

        // declared type
        let ty = self.ast.expr_ty(n);
        let ty2 = self.check_type(ty);
        if ty2 != ty {
            self.ast.set_expr_ty(n, ty2);
        }
        let mut ty = ty2;

        let (init, is_this) = match self.ast.node(n).local() {
            Some(l) => (l.init, l.is_this),
            None => return,
        };

        if let Some(init) = init {
            self.typectx_push(ty);
            let init2 = self.check_expr(init);
            self.typectx_pop();
            if init2 != init
                && let Some(l) = self.ast.node_mut(n).local_mut()
            {
                l.init = Some(init2);
            }

            let ty_is_open = ty == NodeId::UNKNOWN
                || matches!(self.ast.type_kind(ty), Some(TypeKind::Unresolved { .. }));
            if ty_is_open {
                // infer from the initializer
                let it = self.ast.expr_ty(init2);
                self.ast.set_expr_ty(n, it);
                ty = it;
            } else {
                let flags = self.ast.flags(n);
                let init_ty = self.ast.expr_ty(init2);
                let init_is_opt =
                    matches!(self.ast.type_kind(init_ty), Some(TypeKind::Optional { .. }));

                let mut rtype = init_ty;
                if flags.contains(NodeFlags::NARROWED) && ty != NodeId::VOID && init_is_opt {
                    // a narrowed binding holds the optional's element,
                    // e.g. "if let x i8 = a" where a is ?int
                    rtype = match self.ast.type_kind(init_ty) {
                        Some(TypeKind::Optional { elem }) => *elem,
                        _ => init_ty,
                    };
                }

                if flags.contains(NodeFlags::MARK_LOCAL) && init_is_opt {
                    // a narrowing definition in an `if` condition: the
                    // element type is checked by the narrowing pass
                } else if !self.is_assignable(ty, rtype) {
                    self.error_unassignable_type(n, init2);
                } else if let Some(d) = self.implicit_rvalue_deref(ty, init2)
                    && let Some(l) = self.ast.node_mut(n).local_mut()
                {
                    l.init = Some(d);
                }
            }
        }

        if is_this {
            self.this_param_type(n);
            ty = self.ast.expr_ty(n);
        }

        let flags = self.ast.flags(n);
        if (ty == NodeId::VOID || ty == NodeId::UNKNOWN)
            && !flags.intersects(NodeFlags::NARROWED | NodeFlags::MARK_LOCAL)
        {
            let msg = format!("cannot define {} of type void", self.kindname(n));
            self.error(n, msg);
        }
    }

    /// Check a `var`/`let` and define it in the current scope.
    pub(crate) fn local_var_rule(&mut self, n: NodeId) {
        debug_assert!(self.ast.node(n).is_var_like());
        self.local_rule(n);
        if let Some(l) = self.ast.node(n).local() {
            let name = l.name;
            self.define(name, n);
        }
    }

    /// Decide how the `this` parameter is passed: primitives and small
    /// read-only structs by value, everything else by reference. The small
    /// struct threshold (size at most two pointers, alignment at most one
    /// pointer) is ABI-visible and fixed.
    pub(crate) fn this_param_type(&mut self, n: NodeId) {
        let recv = self.ast.expr_ty(n);
        let is_mut = self.ast.node(n).local().is_some_and(|l| l.is_mut);
        if !is_mut {
            if self.ast.type_kind(recv).is_some_and(|k| k.is_prim()) {
                return;
            }
            if matches!(self.ast.type_kind(recv), Some(TypeKind::Struct(_))) {
                let ptr_size = u64::from(self.compiler.options.target.ptr_size);
                if u64::from(self.ast.type_align(recv)) <= ptr_size
                    && self.ast.type_size(recv) <= ptr_size * 2
                {
                    return;
                }
            }
        }
        let t = self.mk_ref_type(recv, is_mut);
        self.ast.set_expr_ty(n, t);
    }

    // -----------------------------------------------------------------------
    // functions

    fn validate_main_fun(&mut self, n: NodeId) {
        self.pkg.main_fun = Some(n);

        let fun_ty = self.ast.expr_ty(n);
        let Some(TypeKind::Fun { params, result }) = self.ast.type_kind(fun_ty).cloned() else {
            return;
        };

        if let Some(&first) = params.first() {
            self.error(
                first,
                "special \"main\" function should not accept any input parameters".to_string(),
            );
        }
        if result != NodeId::VOID {
            self.error(
                n,
                "special \"main\" function should not return a result".to_string(),
            );
        }
    }

    fn is_main_fun(&self, n: NodeId) -> bool {
        match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) => {
                f.name == Some(kw::MAIN)
                    && f.recv_type.is_none()
                    && f.ns_parent
                        .is_some_and(|p| matches!(self.ast.node(p).kind, NodeKind::Unit(_)))
            }
            _ => false,
        }
    }

    pub(crate) fn check_fun(&mut self, n: NodeId) {
        let (mut recv_type, name, body, ns_parent) = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) => {
                (f.recv_type, f.name, f.body, f.ns_parent)
            }
            _ => return,
        };

        let outer_fun = self.fun.replace(n);
        let is_pub = self.ast.flags(n).is_pub();
        self.pub_nest += u32::from(is_pub);

        if let Some(recv) = recv_type {
            // type function
            let recv2 = self.check_type(recv);
            if recv2 != recv
                && let Some(ExprData { kind: ExprKind::Fun(f), .. }) = self.ast.expr_data_mut(n)
            {
                f.recv_type = Some(recv2);
            }
            recv_type = Some(recv2);
            if ns_parent.is_none()
                && let Some(ExprData { kind: ExprKind::Fun(f), .. }) = self.ast.expr_data_mut(n)
            {
                f.ns_parent = Some(recv2);
            }
            self.enter_ns(recv2);
        } else if ns_parent.is_none() {
            // plain function not hoisted at unit level (e.g. a function
            // expression)
            let parent = self.current_ns();
            if let Some(ExprData { kind: ExprKind::Fun(f), .. }) = self.ast.expr_data_mut(n) {
                f.ns_parent = parent;
            }
            if let Some(name) = name {
                self.define(name, n);
            }
        }

        // the function type is checked first, under the receiver context
        let fun_ty = self.ast.expr_ty(n);
        if !self.ast.is_checked(fun_ty) {
            self.ast.add_flags(fun_ty, NodeFlags::CHECKED);
            let this_type = recv_type.unwrap_or(NodeId::UNKNOWN);
            let ft2 = self.check_fun_type(fun_ty, this_type);
            if ft2 != fun_ty {
                self.ast.set_expr_ty(n, ft2);
            }
        }
        let fun_ty = self.ast.expr_ty(n);
        let (params, result) = match self.ast.type_kind(fun_ty) {
            Some(TypeKind::Fun { params, result }) => (params.clone(), *result),
            _ => {
                self.pub_nest -= u32::from(is_pub);
                self.fun = outer_fun;
                return;
            }
        };

        // parameters go into a new scope covering the body
        if !params.is_empty() {
            self.enter_scope();
            for &param in &params {
                if !self.ast.is_checked(param) {
                    self.ast.add_flags(param, NodeFlags::CHECKED);
                    self.local_rule(param);
                } else if body.is_some() {
                    // multiple functions with the same signature may share
                    // one function type node holding the parameters; they
                    // still must be visible in this body's scope
                    if let Some(l) = self.ast.node(param).local()
                        && l.name != kw::UNDERSCORE
                    {
                        let pname = l.name;
                        self.define(pname, param);
                    }
                }
            }
        }

        let result = {
            let r2 = self.check_type(result);
            if r2 != result
                && let Some(TypeKind::Fun { result: slot, .. }) =
                    self.ast.type_data_mut(fun_ty).map(|td| &mut td.kind)
            {
                *slot = r2;
            }
            r2
        };

        // "drop" on a receiver type is the type's destructor and must have
        // the exact signature (mut this) -> void
        if let Some(recv) = recv_type
            && name == Some(kw::DROP)
        {
            let mut ok = false;
            if result == NodeId::VOID && params.len() == 1 {
                let p0_ty = self.ast.expr_ty(params[0]);
                ok = matches!(self.ast.type_kind(p0_ty), Some(TypeKind::MutRef { .. }));
                if ok {
                    self.ast.add_flags(recv, NodeFlags::DROP);
                }
            }
            if !ok {
                self.error(
                    n,
                    "invalid signature of \"drop\" function, expecting (mut this)void".to_string(),
                );
            }
        }

        if let Some(body) = body {
            // a value-returning body treats its last expression specially
            if result != NodeId::VOID {
                self.ast.add_flags(body, NodeFlags::RVALUE);
            } else {
                self.ast.remove_flags(body, NodeFlags::RVALUE);
            }

            self.enter_ns(n);
            self.typectx_push(result);
            self.check_block(body);
            self.typectx_pop();
            self.leave_ns();

            // implicit return of the trailing expression
            if result != NodeId::VOID && !self.ast.flags(body).contains(NodeFlags::EXIT) {
                let body_children = match &self.ast.node(body).kind {
                    NodeKind::Expr(ExprData { kind: ExprKind::Block { children, .. }, .. }) => {
                        children.clone()
                    }
                    _ => Vec::new(),
                };
                if body_children.is_empty() {
                    // check_retval reports the missing value
                    self.check_retval(body, None);
                } else {
                    let last = body_children[body_children.len() - 1];
                    let (value2, _) = self.check_retval(last, Some(last));
                    let value2 = value2.unwrap_or(last);
                    let loc = self.ast.node(value2).loc;
                    let ret = self.mk_return(value2, loc);
                    if let Some(ExprData { kind: ExprKind::Block { children, .. }, .. }) =
                        self.ast.expr_data_mut(body)
                    {
                        let i = children.len() - 1;
                        children[i] = ret;
                    }
                }
            }

            if self.is_main_fun(n) {
                self.validate_main_fun(n);
            }
        } else {
            // prototypes are visible across the package
            self.ast.node_mut(n).flags.upgrade_visibility(NodeFlags::VIS_PKG);
        }

        if recv_type.is_some() {
            self.leave_ns();
        }
        if !params.is_empty() {
            self.leave_scope();
        }

        self.pub_nest -= u32::from(is_pub);
        self.fun = outer_fun;
    }

    // -----------------------------------------------------------------------
    // typedefs

    pub(crate) fn check_typedef(&mut self, n: NodeId) {
        let ty = match &self.ast.node(n).kind {
            NodeKind::TypeDef { ty } => *ty,
            _ => return,
        };
        let is_pub = self.ast.flags(n).is_pub();
        self.pub_nest += u32::from(is_pub);
        let ty2 = self.check_type(ty);
        if ty2 != ty
            && let NodeKind::TypeDef { ty: slot } = &mut self.ast.node_mut(n).kind
        {
            *slot = ty2;
        }
        self.pub_nest -= u32::from(is_pub);

        // make the name visible for the rest of the unit
        let name = match self.ast.type_kind(ty2) {
            Some(TypeKind::Struct(st)) => st.name,
            Some(TypeKind::Alias(at)) => Some(at.name),
            _ => None,
        };
        if let Some(name) = name {
            self.define(name, ty2);
        }
    }
}
