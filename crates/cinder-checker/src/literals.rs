//! Literal checking: integer, floating-point, string and array literals.
//!
//! Literals are where bidirectional inference pays off: the expected type
//! on the context stack picks the literal's width, and overflow is
//! diagnosed against that width.

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind, TypeKind};
use cinder_common::srcloc::SrcLoc;

use crate::context::Checker;

impl Checker<'_> {
    pub(crate) fn check_int_lit(&mut self, n: NodeId) {
        if self.ast.expr_ty(n) != NodeId::UNKNOWN {
            return;
        }
        let value = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::IntLit { value }, .. }) => *value,
            _ => return,
        };

        let ctx = self.typectx;
        let base = self.concrete(ctx);
        let int_size = self.compiler.options.target.int_size;

        let (ty, maxval) = match self.ast.type_kind(base) {
            Some(TypeKind::I8) => (ctx, 0x7f),
            Some(TypeKind::I16) => (ctx, 0x7fff),
            Some(TypeKind::I32) => (ctx, 0x7fff_ffff),
            Some(TypeKind::I64) => (ctx, 0x7fff_ffff_ffff_ffff),
            Some(TypeKind::U8) => (ctx, 0xff),
            Some(TypeKind::U16) => (ctx, 0xffff),
            Some(TypeKind::U32) => (ctx, 0xffff_ffff),
            Some(TypeKind::U64) => (ctx, u64::MAX),
            _ => {
                // no specific integer expected: pick int, uint, i64 or u64
                // based on magnitude and the target's int size
                if int_size == 8 {
                    if value < 0x8000_0000_0000_0000 {
                        self.ast.set_expr_ty(n, NodeId::INT);
                        return;
                    }
                    (NodeId::U64, u64::MAX)
                } else {
                    debug_assert!(int_size >= 4);
                    if value <= 0x7fff_ffff {
                        self.ast.set_expr_ty(n, NodeId::INT);
                        return;
                    }
                    if value <= 0xffff_ffff {
                        self.ast.set_expr_ty(n, NodeId::UINT);
                        return;
                    }
                    if value <= 0x7fff_ffff_ffff_ffff {
                        self.ast.set_expr_ty(n, NodeId::I64);
                        return;
                    }
                    (NodeId::U64, u64::MAX)
                }
            }
        };

        if value > maxval {
            let msg = format!("integer constant overflows {}", self.fmt(ty));
            self.error(n, msg);
        }
        self.ast.set_expr_ty(n, ty);
    }

    pub(crate) fn check_float_lit(&mut self, n: NodeId) {
        let value = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::FloatLit { value }, .. }) => *value,
            _ => return,
        };

        if self.typectx == NodeId::F32 {
            self.ast.set_expr_ty(n, NodeId::F32);
            if value.is_finite() && (value as f32).is_infinite() {
                // e.g. 1.e39
                self.error(n, "32-bit floating-point constant too large".to_string());
                self.set_float_value(n, 0.0);
            }
        } else {
            self.ast.set_expr_ty(n, NodeId::F64);
            if value.is_infinite() {
                // e.g. 1.e309
                self.error(n, "64-bit floating-point constant too large".to_string());
                self.set_float_value(n, 0.0);
            }
        }
    }

    fn set_float_value(&mut self, n: NodeId, v: f64) {
        if let Some(ExprData { kind: ExprKind::FloatLit { value }, .. }) = self.ast.expr_data_mut(n)
        {
            *value = v;
        }
    }

    pub(crate) fn check_str_lit(&mut self, n: NodeId) {
        if let Some(st) = self.compiler.str_type
            && self.typectx == st
        {
            self.ast.set_expr_ty(n, st);
            return;
        }

        let len = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::StrLit { bytes }, .. }) => bytes.len() as u64,
            _ => return,
        };

        // synthesize &[u8 N]
        let at = self.ast.mk_array_type(SrcLoc::NONE, NodeId::U8, None);
        self.ast.add_flags(at, NodeFlags::CHECKED);
        if let Some(TypeKind::Array { len: l, .. }) =
            self.ast.type_data_mut(at).map(|td| &mut td.kind)
        {
            *l = len;
        }
        if let Some(td) = self.ast.type_data_mut(at) {
            td.size = len;
            td.align = 1;
        }
        let (at, _) = self.intern_usertype(at);

        let rt = self.mk_ref_type(at, false);
        self.ast.add_flags(rt, NodeFlags::CHECKED);
        let (rt, _) = self.intern_usertype(rt);

        self.ast.set_expr_ty(n, rt);
    }

    pub(crate) fn check_array_lit(&mut self, n: NodeId) {
        let values = match &self.ast.node(n).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::ArrayLit { values, .. }, .. }) => {
                values.clone()
            }
            _ => return,
        };

        let ctx = self.typectx;
        let mut start = 0usize;

        let at = if let Some(TypeKind::Array { len, .. }) = self.ast.type_kind(ctx) {
            let len = *len;
            if len > 0 && (len as usize) < values.len() {
                let mut origin = values[len as usize];
                if !self.ast.node(origin).loc.is_known() {
                    origin = n;
                }
                self.error(origin, "excess value in array literal".to_string());
            }
            ctx
        } else {
            // infer the element type from the first value
            if values.is_empty() {
                self.error(
                    n,
                    "cannot infer type of empty array literal; please specify its type"
                        .to_string(),
                );
                return;
            }
            self.typectx_push(NodeId::UNKNOWN);
            let v0 = self.check_expr(values[0]);
            self.typectx_pop();
            self.patch_array_lit_value(n, 0, v0);
            start = 1;

            let elem = self.ast.expr_ty(v0);
            let at = self.ast.mk_array_type(SrcLoc::NONE, elem, None);
            self.ast.add_flags(at, NodeFlags::CHECKED);
            if let Some(TypeKind::Array { len, .. }) =
                self.ast.type_data_mut(at).map(|td| &mut td.kind)
            {
                *len = values.len() as u64;
            }
            let size = (values.len() as u64).saturating_mul(self.ast.type_size(elem));
            let align = self.ast.type_align(elem);
            if let Some(td) = self.ast.type_data_mut(at) {
                td.size = size;
                td.align = align;
            }
            let (at, _) = self.intern_usertype(at);
            at
        };

        self.ast.set_expr_ty(n, at);

        let elem = match self.ast.type_kind(at) {
            Some(TypeKind::Array { elem, .. }) => *elem,
            _ => NodeId::UNKNOWN,
        };

        self.typectx_push(elem);
        for i in start..values.len() {
            let v = self.check_expr(values[i]);
            self.patch_array_lit_value(n, i, v);
            if !self.is_assignable(elem, self.ast.expr_ty(v)) {
                self.error_unassignable_type(n, v);
                break;
            }
        }
        self.typectx_pop();
    }

    fn patch_array_lit_value(&mut self, n: NodeId, i: usize, v: NodeId) {
        if let Some(ExprData { kind: ExprKind::ArrayLit { values, .. }, .. }) =
            self.ast.expr_data_mut(n)
        {
            values[i] = v;
        }
    }
}
