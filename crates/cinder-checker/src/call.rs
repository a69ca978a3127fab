//! Call checking and type-construction rewriting.
//!
//! A call whose receiver names a type is rewritten in place into a
//! type-construction node (a variant transition in the same arena slot).
//! Constructions of a primitive from an equivalent value elide themselves
//! into the bare argument.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, TypeKind};
use cinder_common::interner::Atom;
use rustc_hash::FxHashMap;

use crate::context::Checker;

/// Field-map slot used while mapping construction arguments.
enum FieldSlot {
    Field(NodeId),
    /// Value already provided by this argument.
    Taken(NodeId),
}

impl Checker<'_> {
    pub(crate) fn check_call(&mut self, n: NodeId) -> NodeId {
        let recv = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { recv, .. }, .. }) => *recv,
            _ => return n,
        };

        let recv2 = self.check_expr(recv);
        if recv2 != recv
            && let Some(ExprData { kind: ExprKind::Call { recv: slot, .. }, .. }) =
                self.ast.expr_data_mut(n)
        {
            *slot = recv2;
        }

        if self.reported_error {
            return n;
        }

        let target = self.ast.unwrap_id(recv2);

        if self.ast.is_expr(target) {
            let rt = self.ast.expr_ty(target);
            if matches!(self.ast.type_kind(rt), Some(TypeKind::Fun { .. })) {
                self.call_fun(n, rt);
                return n;
            }
        } else if self.ast.is_type(target) {
            // prefer the checked receiver type: a template use has been
            // replaced by its instance there
            let recv_ty = self.ast.expr_ty(recv2);
            let t = if recv_ty != NodeId::UNKNOWN && self.ast.is_type(recv_ty) {
                recv_ty
            } else {
                target
            };
            return self.call_type(n, t);
        }

        // bad receiver; adopt the context type to avoid cascading errors
        let ctx = self.typectx;
        self.ast.set_expr_ty(n, ctx);
        if self.ast.is_expr(target) {
            let msg = format!(
                "calling an expression of type {}, expected function or type",
                self.fmt(self.ast.expr_ty(target))
            );
            self.error(recv2, msg);
        } else {
            let msg = format!("calling {}; expected function or type", self.fmt(target));
            self.error(recv2, msg);
        }
        n
    }

    // -----------------------------------------------------------------------
    // function calls

    fn call_fun(&mut self, n: NodeId, fun_ty: NodeId) {
        let (mut params, result) = match self.ast.type_kind(fun_ty) {
            Some(TypeKind::Fun { params, result }) => (params.clone(), *result),
            _ => return,
        };
        self.ast.set_expr_ty(n, result);

        // the "this" parameter is bound through the receiver, not the args
        if params.first().is_some_and(|&p| self.ast.node(p).local().is_some_and(|l| l.is_this)) {
            params.remove(0);
        }

        let args = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => args.clone(),
            _ => return,
        };

        if args.len() != params.len() {
            let which = if args.len() < params.len() { "not enough" } else { "too many" };
            let msg =
                format!("{} arguments in function call, expected {}", which, params.len());
            self.error(n, msg);
            return;
        }

        let mut seen_named_arg = false;

        for (i, (&arg, &param)) in args.iter().zip(params.iter()).enumerate() {
            let param_ty = self.ast.expr_ty(param);
            self.typectx_push(param_ty);

            let named = self.ast.node(arg).local().map(|l| (l.name, l.init));
            let mut arg = arg;
            if let Some((arg_name, init)) = named {
                // named argument `name: value`
                let Some(init) = init else {
                    self.typectx_pop();
                    continue;
                };
                let init2 = self.check_expr(init);
                if init2 != init
                    && let Some(l) = self.ast.node_mut(arg).local_mut()
                {
                    l.init = Some(init2);
                }
                let it = self.ast.expr_ty(init2);
                self.ast.set_expr_ty(arg, it);
                seen_named_arg = true;

                let param_name = self.ast.node(param).local().map(|l| l.name);
                if Some(arg_name) != param_name {
                    let known = params.iter().any(|&p| {
                        self.ast.node(p).local().is_some_and(|l| l.name == arg_name)
                    });
                    let condition = if known { "invalid position of" } else { "unknown" };
                    let msg = format!(
                        "{} named argument \"{}\", in function call {}",
                        condition,
                        self.name(arg_name),
                        self.fmt(fun_ty)
                    );
                    self.error(arg, msg);
                }
            } else {
                // positional argument
                if seen_named_arg {
                    self.error(arg, "positional argument after named argument(s)".to_string());
                    self.typectx_pop();
                    break;
                }
                let arg2 = self.check_expr(arg);
                if arg2 != arg {
                    self.patch_call_arg(n, i, arg2);
                    arg = arg2;
                }
            }

            self.ast.inc_use(arg);
            self.typectx_pop();

            let arg_ty = self.ast.expr_ty(arg);
            if !self.is_assignable(param_ty, arg_ty)
                && param_ty != NodeId::UNKNOWN
                && arg_ty != NodeId::UNKNOWN
            {
                let msg = format!(
                    "passing value of type {} to parameter of type {}",
                    self.fmt(arg_ty),
                    self.fmt(param_ty)
                );
                self.error(arg, msg);
            } else if let Some(d) = self.implicit_rvalue_deref(param_ty, arg) {
                self.patch_call_arg(n, i, d);
            }
        }

        // a discarded owning result would be dropped on the spot
        if !self.ast.flags(n).contains(NodeFlags::RVALUE)
            && self.is_owner(self.ast.expr_ty(n))
            && self.no_error()
        {
            self.warning(n, "unused result; ownership transferred from function call".to_string());
        }
    }

    fn patch_call_arg(&mut self, n: NodeId, i: usize, arg: NodeId) {
        if let Some(ExprData {
            kind: ExprKind::Call { args, .. } | ExprKind::TypeCons { args },
            ..
        }) = self.ast.expr_data_mut(n)
        {
            args[i] = arg;
        }
    }

    // -----------------------------------------------------------------------
    // type constructions

    /// Rewrite the call node in place into a type-construction of `t`.
    fn convert_call_to_typecons(&mut self, n: NodeId, t: NodeId, args: Vec<NodeId>) -> NodeId {
        if let Some(e) = self.ast.expr_data_mut(n) {
            e.ty = t;
            e.kind = ExprKind::TypeCons { args };
        }
        self.finalize_typecons(n)
    }

    /// Elide constructions of a primitive from an equivalent value and
    /// verify primitive convertibility.
    fn finalize_typecons(&mut self, n: NodeId) -> NodeId {
        let t = self.ast.expr_ty(n);
        let base = self.unwrap_alias(t);
        if !self.ast.type_kind(base).is_some_and(|k| k.is_prim()) {
            return n;
        }

        let arg = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::TypeCons { args }, .. }) => {
                match args.first() {
                    Some(&a) => a,
                    None => return n,
                }
            }
            _ => return n,
        };

        // eliminate a cast to an equivalent type, e.g. "i8(3)" => "3"
        let arg_ty = self.ast.expr_ty(arg);
        if self.concrete(t) == self.concrete(arg_ty) {
            let cons_uses = self.ast.node(n).nuse.max(1);
            self.ast.node_mut(arg).nuse += cons_uses - 1;
            return arg;
        }

        if !self.is_convertible(t, arg_ty) {
            let msg = format!(
                "cannot convert value of type {} to type {}",
                self.fmt(arg_ty),
                self.fmt(t)
            );
            self.error(n, msg);
        }
        n
    }

    pub(crate) fn check_typecons(&mut self, n: NodeId) -> NodeId {
        let args = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::TypeCons { args }, .. }) => args.clone(),
            _ => return n,
        };
        if let Some(&arg) = args.first() {
            self.ast.inc_use(arg);
            let t = self.ast.expr_ty(n);
            self.typectx_push(t);
            let arg2 = self.check_expr(arg);
            self.typectx_pop();
            if arg2 != arg {
                self.patch_call_arg(n, 0, arg2);
            }
        }
        self.finalize_typecons(n)
    }

    fn error_call_type_arity(&mut self, n: NodeId, t: NodeId, min_args: u32, max_args: u32) {
        let args = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => args.clone(),
            _ => return,
        };
        let type_s = self.fmt(t);

        let base = self.unwrap_alias(t);
        let logical_op = match self.ast.type_kind(base) {
            Some(TypeKind::Struct(_) | TypeKind::Array { .. }) => "type constructor",
            _ => "type cast",
        };

        if (args.len() as u32) < min_args {
            let origin = args.last().copied().unwrap_or_else(|| {
                match &self.ast.node(n).kind {
                    NodeKind::Expr(ExprData { kind: ExprKind::Call { recv, .. }, .. }) => *recv,
                    _ => n,
                }
            });
            let at_least = if min_args != max_args { " at least" } else { "" };
            let msg = format!(
                "not enough arguments for {type_s} {logical_op}, expecting{at_least} {min_args}"
            );
            self.error(origin, msg);
            return;
        }

        let arg = args[max_args as usize];
        let arg_s = self.fmt(arg);
        let msg = if max_args == 0 {
            // e.g. "void(x)"
            format!("unexpected value {arg_s}; {type_s} {logical_op} accepts no arguments")
        } else {
            format!("unexpected extra value {arg_s} in {type_s} {logical_op}")
        };
        self.error(arg, msg);
    }

    fn check_call_type_arity(&mut self, n: NodeId, t: NodeId, min_args: u32, max_args: u32) -> bool {
        let argc = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => args.len() as u32,
            _ => return false,
        };
        if argc < min_args || argc > max_args {
            self.error_call_type_arity(n, t, min_args, max_args);
            return false;
        }
        true
    }

    fn call_type_prim(&mut self, n: NodeId, dst: NodeId) -> NodeId {
        let args = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => args.clone(),
            _ => return n,
        };
        debug_assert_eq!(args.len(), 1);
        let arg = args[0];

        if !self.ast.is_expr(arg) {
            self.error(arg, "invalid value".to_string());
            return n;
        }
        if self.ast.node(arg).local().is_some() {
            let msg = format!("{} type cast does not accept named arguments", self.fmt(dst));
            self.error(arg, msg);
            return n;
        }

        self.typectx_push(dst);
        let arg2 = self.check_expr(arg);
        self.typectx_pop();
        self.ast.inc_use(arg2);

        self.convert_call_to_typecons(n, dst, vec![arg2])
    }

    fn check_call_type_struct(&mut self, n: NodeId, t: NodeId) {
        let fields = match self.ast.type_kind(t) {
            Some(TypeKind::Struct(st)) => st.fields.clone(),
            _ => return,
        };
        let args = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => args.clone(),
            _ => return,
        };
        debug_assert!(args.len() <= fields.len());

        let mut field_map: FxHashMap<Atom, FieldSlot> = FxHashMap::default();
        for &f in &fields {
            if let Some(l) = self.ast.node(f).local() {
                field_map.insert(l.name, FieldSlot::Field(f));
            }
        }

        for (i, &arg) in args.iter().enumerate() {
            let name = match &self.ast.node(arg).kind {
                NodeKind::Expr(ExprData { kind: ExprKind::Param(l), .. }) => l.name,
                NodeKind::Expr(ExprData { kind: ExprKind::Id { name, .. }, .. }) => *name,
                _ => {
                    self.error(
                        arg,
                        "positional argument in struct constructor; use either name:value \
                         or an identifier with the same name as the intended struct field"
                            .to_string(),
                    );
                    continue;
                }
            };

            let field = match field_map.get(&name) {
                None => {
                    let msg =
                        format!("no \"{}\" field in struct {}", self.name(name), self.fmt(t));
                    self.error(arg, msg);
                    continue;
                }
                Some(FieldSlot::Taken(prev)) => {
                    let prev = *prev;
                    let msg = format!(
                        "duplicate value for field \"{}\" of struct {}",
                        self.name(name),
                        self.fmt(t)
                    );
                    self.error(arg, msg);
                    let warn = format!(
                        "value for field \"{}\" already provided here",
                        self.name(name)
                    );
                    self.warning(prev, warn);
                    continue;
                }
                Some(FieldSlot::Field(f)) => *f,
            };
            field_map.insert(name, FieldSlot::Taken(arg));

            self.ast.add_flags(arg, NodeFlags::RVALUE);
            let field_ty = self.ast.expr_ty(field);
            self.typectx_push(field_ty);

            if let Some(init) = self.ast.node(arg).local().and_then(|l| l.init) {
                // named argument `name: value`
                let init2 = self.check_expr(init);
                if init2 != init
                    && let Some(l) = self.ast.node_mut(arg).local_mut()
                {
                    l.init = Some(init2);
                }
                let it = self.ast.expr_ty(init2);
                self.ast.set_expr_ty(arg, it);
            } else {
                // a bare identifier names both the field and the value
                self.check_id_expr(arg);
                self.ast.add_flags(arg, NodeFlags::CHECKED);
            }

            self.ast.inc_use(arg);
            self.typectx_pop();

            let arg_ty = self.ast.expr_ty(arg);
            if !self.is_assignable(field_ty, arg_ty) {
                self.error_field_type(arg, field);
            } else if let Some(d) = self.implicit_rvalue_deref(field_ty, arg) {
                self.patch_call_arg(n, i, d);
            }
        }

        // every field without a default must receive a value; skip when the
        // argument list already failed to keep cascades down
        if !self.no_error() {
            return;
        }
        for &f in &fields {
            let Some(l) = self.ast.node(f).local() else { continue };
            if l.init.is_some() {
                continue;
            }
            let name = l.name;
            if matches!(field_map.get(&name), Some(FieldSlot::Field(_))) {
                let msg = format!(
                    "missing value for field \"{}\" of struct {}",
                    self.name(name),
                    self.fmt(t)
                );
                self.error(n, msg);
            }
        }
    }

    fn error_field_type(&mut self, arg: NodeId, field: NodeId) {
        let got = self.fmt(self.ast.expr_ty(arg));
        let expect = self.fmt(self.ast.expr_ty(field));
        let field_name = self
            .ast
            .node(field)
            .local()
            .map(|l| self.name(l.name).to_string())
            .unwrap_or_default();
        let origin = match self.ast.node(arg).local().and_then(|l| l.init) {
            Some(init) => init,
            None => arg,
        };
        let msg =
            format!("passing value of type {got} for field \"{field_name}\" of type {expect}");
        self.error(origin, msg);
    }

    fn call_type(&mut self, n: NodeId, t: NodeId) -> NodeId {
        self.ast.set_expr_ty(n, t);

        let base = self.unwrap_alias(t);
        match self.ast.type_kind(base).cloned() {
            Some(TypeKind::Void) => {
                if !self.check_call_type_arity(n, t, 0, 0) {
                    return n;
                }
                self.convert_call_to_typecons(n, t, Vec::new())
            }

            Some(
                TypeKind::Bool
                | TypeKind::Int
                | TypeKind::Uint
                | TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::U8
                | TypeKind::U16
                | TypeKind::U32
                | TypeKind::U64
                | TypeKind::F32
                | TypeKind::F64,
            ) => {
                if !self.check_call_type_arity(n, t, 1, 1) {
                    return n;
                }
                self.call_type_prim(n, t)
            }

            Some(TypeKind::Struct(st)) => {
                let max_args = st.fields.len() as u32;
                if !self.check_call_type_arity(n, t, 0, max_args) {
                    return n;
                }
                self.check_call_type_struct(n, base);
                // the checked call becomes a construction of the struct
                let args = match &self.ast.node(n).kind {
                    NodeKind::Expr(ExprData { kind: ExprKind::Call { args, .. }, .. }) => {
                        args.clone()
                    }
                    _ => return n,
                };
                if let Some(e) = self.ast.expr_data_mut(n) {
                    e.kind = ExprKind::TypeCons { args };
                }
                n
            }

            Some(TypeKind::Array { .. }) => {
                if !self.check_call_type_arity(n, t, 1, u32::MAX) {
                    return n;
                }
                let msg = format!("type constructor for {} is not supported", self.fmt(t));
                self.error(n, msg);
                self.ast.set_expr_ty(n, NodeId::UNKNOWN);
                n
            }

            Some(
                TypeKind::Fun { .. }
                | TypeKind::Ptr { .. }
                | TypeKind::Ref { .. }
                | TypeKind::MutRef { .. }
                | TypeKind::Optional { .. },
            ) => {
                let msg = format!("type constructor for {} is not supported", self.fmt(t));
                self.error(n, msg);
                self.ast.set_expr_ty(n, NodeId::UNKNOWN);
                n
            }

            Some(TypeKind::Unresolved { .. }) => {
                // only reachable after a type error
                debug_assert!(self.compiler.errcount() > 0);
                n
            }

            _ => {
                debug_assert!(false, "unexpected construction target");
                n
            }
        }
    }
}
