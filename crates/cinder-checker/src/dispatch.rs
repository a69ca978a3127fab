//! Node-kind dispatch: the single entry points for checking statements,
//! expressions and types.
//!
//! Every check function returns the canonical node id: several rules
//! rewrite a node through the caller's slot (call → type-construction,
//! unresolved → resolved type, interning dedup), so callers must store the
//! returned id back into the slot they checked.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, TypeKind};
use tracing::trace;

use crate::context::Checker;

impl Checker<'_> {
    /// Check a top-level or block-level statement.
    pub(crate) fn check_stmt(&mut self, n: NodeId) -> NodeId {
        if self.reported_error {
            return n;
        }
        if let NodeKind::TypeDef { .. } = &self.ast.node(n).kind {
            if self.ast.is_checked(n) {
                return n;
            }
            self.ast.add_flags(n, NodeFlags::CHECKED);
            trace!(node = %self.fmt(n), "check typedef");
            self.check_typedef(n);
            return n;
        }
        debug_assert!(self.ast.is_expr(n), "unexpected statement node");
        self.check_expr(n)
    }

    /// Check an expression once; returns the canonical id (the expression
    /// may have been rewritten in the caller's slot).
    pub(crate) fn check_expr(&mut self, n: NodeId) -> NodeId {
        if self.ast.is_checked(n) {
            return n;
        }
        self.ast.add_flags(n, NodeFlags::CHECKED);
        debug_assert!(self.ast.is_expr(n));

        if self.reported_error {
            return n;
        }

        trace!(node = %self.fmt(n), "check expr");

        // the pre-set type annotation is checked first
        let is_pub = self.ast.flags(n).is_pub();
        self.pub_nest += u32::from(is_pub);
        let ty = self.ast.expr_ty(n);
        let ty2 = self.check_type(ty);
        if ty2 != ty {
            self.ast.set_expr_ty(n, ty2);
        }
        self.pub_nest -= u32::from(is_pub);

        #[derive(Clone, Copy)]
        enum Rule {
            Fun,
            If,
            Id,
            Return,
            Binary,
            Assign,
            Block,
            Call,
            TypeCons,
            Member,
            Subscript,
            Deref,
            IntLit,
            FloatLit,
            StrLit,
            ArrayLit,
            Unary,
            Local,
            LocalVar,
            Prechecked,
        }

        let rule = match &self.ast.node(n).kind {
            NodeKind::Expr(e) => match &e.kind {
                ExprKind::Fun(_) => Rule::Fun,
                ExprKind::If { .. } => Rule::If,
                ExprKind::Id { .. } => Rule::Id,
                ExprKind::Return { .. } => Rule::Return,
                ExprKind::Binary { .. } => Rule::Binary,
                ExprKind::Assign { .. } => Rule::Assign,
                ExprKind::Block { .. } => Rule::Block,
                ExprKind::Call { .. } => Rule::Call,
                ExprKind::TypeCons { .. } => Rule::TypeCons,
                ExprKind::Member { .. } => Rule::Member,
                ExprKind::Subscript { .. } => Rule::Subscript,
                ExprKind::Deref { .. } => Rule::Deref,
                ExprKind::IntLit { .. } => Rule::IntLit,
                ExprKind::FloatLit { .. } => Rule::FloatLit,
                ExprKind::StrLit { .. } => Rule::StrLit,
                ExprKind::ArrayLit { .. } => Rule::ArrayLit,
                ExprKind::Prefix { .. } | ExprKind::Postfix { .. } => Rule::Unary,
                ExprKind::Field(_) | ExprKind::Param(_) => Rule::Local,
                ExprKind::Var(_) | ExprKind::Let(_) => Rule::LocalVar,
                ExprKind::Ns(_) | ExprKind::BoolLit { .. } => Rule::Prechecked,
            },
            _ => return n,
        };
        match rule {
            Rule::Fun => self.check_fun(n),
            Rule::If => self.check_if(n),
            Rule::Id => self.check_id_expr(n),
            Rule::Return => self.check_return(n),
            Rule::Binary => self.check_binop(n),
            Rule::Assign => self.check_assign(n),
            Rule::Block => self.check_block(n),
            Rule::Call => return self.check_call(n),
            Rule::TypeCons => return self.check_typecons(n),
            Rule::Member => self.check_member(n),
            Rule::Subscript => self.check_subscript(n),
            Rule::Deref => self.check_deref(n),
            Rule::IntLit => self.check_int_lit(n),
            Rule::FloatLit => self.check_float_lit(n),
            Rule::StrLit => self.check_str_lit(n),
            Rule::ArrayLit => self.check_array_lit(n),
            Rule::Unary => self.check_unary(n),
            Rule::Local => self.local_rule(n),
            Rule::LocalVar => self.local_var_rule(n),
            // namespace expressions and boolean literals arrive pre-checked
            Rule::Prechecked => {
                debug_assert!(false, "expression kind should be pre-checked");
            }
        }
        n
    }

    /// Check a type once; returns the canonical id (interned types and
    /// resolved named types replace the caller's slot).
    pub(crate) fn check_type(&mut self, t: NodeId) -> NodeId {
        if t == NodeId::UNKNOWN {
            return t;
        }
        if self.ast.is_checked(t) {
            // already-resolved named references still forward to their
            // resolution
            if let Some(TypeKind::Unresolved { resolved: Some(r), .. }) = self.ast.type_kind(t) {
                return *r;
            }
            return t;
        }
        self.ast.add_flags(t, NodeFlags::CHECKED);

        let is_template = self.ast.flags(t).contains(NodeFlags::TEMPLATE);
        if is_template {
            self.template_nest += 1;
            self.check_template_decl(t);
        }

        trace!(ty = %self.fmt(t), "check type");

        let result = match self.ast.type_kind(t) {
            Some(k) if k.is_prim() => {
                debug_assert!(false, "primitive types are always pre-checked");
                t
            }
            Some(TypeKind::Ns) => t,
            Some(TypeKind::Array { .. }) => self.check_array_type(t),
            Some(TypeKind::Fun { .. }) => self.check_fun_type(t, NodeId::UNKNOWN),
            Some(
                TypeKind::Ptr { .. }
                | TypeKind::Ref { .. }
                | TypeKind::MutRef { .. }
                | TypeKind::Slice { .. }
                | TypeKind::MutSlice { .. }
                | TypeKind::Optional { .. },
            ) => self.check_ptr_like_type(t),
            Some(TypeKind::Struct(_)) => self.check_struct_type(t),
            Some(TypeKind::Alias(_)) => self.check_alias_type(t),
            Some(TypeKind::Template { .. }) => self.check_template_type(t),
            Some(TypeKind::Placeholder { .. }) => self.check_placeholder_type(t),
            Some(TypeKind::Unresolved { .. }) => self.check_unresolved_type(t),
            Some(_) => {
                debug_assert!(false, "primitive types are always pre-checked");
                t
            }
            None => {
                debug_assert!(false, "not a type node");
                t
            }
        };

        if is_template {
            self.template_nest -= 1;
        }
        result
    }

    // -----------------------------------------------------------------------
    // unit-level hoisting

    /// Assign namespace parents before checking bodies, so sibling
    /// declarations can refer to each other in any order.
    pub(crate) fn assign_ns_parent(&mut self, n: NodeId) {
        if let NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) = &self.ast.node(n).kind {
            match f.recv_type {
                Some(recv) => {
                    // type function
                    let recv2 = self.check_type(recv);
                    if let Some(ExprData { kind: ExprKind::Fun(f), .. }) =
                        self.ast.expr_data_mut(n)
                    {
                        f.recv_type = Some(recv2);
                        f.ns_parent = Some(recv2);
                    }
                }
                None => {
                    let parent = self.current_ns();
                    if let Some(ExprData { kind: ExprKind::Fun(f), .. }) =
                        self.ast.expr_data_mut(n)
                    {
                        f.ns_parent = parent;
                    }
                }
            }
        }
    }

    /// Pre-define plain function names at unit scope. Type functions are
    /// reached through their receiver type, not by bare name.
    pub(crate) fn define_at_unit_level(&mut self, n: NodeId) {
        if let NodeKind::Expr(ExprData { kind: ExprKind::Fun(f), .. }) = &self.ast.node(n).kind
            && f.recv_type.is_none()
            && let Some(name) = f.name
        {
            self.define(name, n);
        }
    }
}
