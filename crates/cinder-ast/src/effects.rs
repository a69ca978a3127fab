//! Side-effect analysis used by unused-expression reporting.

use crate::arena::{NodeArena, NodeId};
use crate::node::{ExprKind, NodeKind, TypeKind};
use crate::ops::Op;

/// True if constructing a value of type `t` has no side effects.
pub fn type_cons_no_side_effects(ast: &NodeArena, t: NodeId) -> bool {
    let Some(td) = ast.type_data(t) else { return false };
    match &td.kind {
        k if k.is_prim() => true,
        TypeKind::Ptr { elem }
        | TypeKind::Ref { elem }
        | TypeKind::MutRef { elem }
        | TypeKind::Slice { elem }
        | TypeKind::MutSlice { elem }
        | TypeKind::Optional { elem }
        | TypeKind::Array { elem, .. } => type_cons_no_side_effects(ast, *elem),
        TypeKind::Alias(at) => type_cons_no_side_effects(ast, at.elem),
        _ => false,
    }
}

/// True if materializing `n` has no side effects, i.e. removing `n` has no
/// effect on the semantics of any code outside it.
pub fn expr_no_side_effects(ast: &NodeArena, n: NodeId) -> bool {
    let NodeKind::Expr(e) = &ast.node(n).kind else { return false };
    match &e.kind {
        ExprKind::Id { .. }
        | ExprKind::BoolLit { .. }
        | ExprKind::IntLit { .. }
        | ExprKind::FloatLit { .. }
        | ExprKind::StrLit { .. } => true,

        ExprKind::Member { recv, .. } => expr_no_side_effects(ast, *recv),

        ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l) => {
            type_cons_no_side_effects(ast, e.ty)
                && l.init.is_none_or(|init| expr_no_side_effects(ast, init))
        }

        ExprKind::ArrayLit { values, .. } => {
            type_cons_no_side_effects(ast, e.ty)
                && values.iter().all(|&v| expr_no_side_effects(ast, v))
        }

        ExprKind::Block { children, .. } => {
            children.iter().all(|&c| expr_no_side_effects(ast, c))
        }

        ExprKind::Binary { lhs, rhs, .. } => {
            expr_no_side_effects(ast, *rhs) && expr_no_side_effects(ast, *lhs)
        }

        ExprKind::Prefix { op, expr } | ExprKind::Postfix { op, expr } => {
            if matches!(op, Op::Inc | Op::Dec) {
                return false;
            }
            expr_no_side_effects(ast, *expr)
        }

        ExprKind::If { cond, then_block, else_block } => {
            expr_no_side_effects(ast, *cond)
                && expr_no_side_effects(ast, *then_block)
                && else_block.is_none_or(|e| expr_no_side_effects(ast, e))
        }

        ExprKind::Return { value } => value.is_none_or(|v| expr_no_side_effects(ast, v)),

        ExprKind::Call { .. } => false,

        ExprKind::Fun(f) => {
            let NodeKind::Type(td) = &ast.node(e.ty).kind else { return false };
            let TypeKind::Fun { params, .. } = &td.kind else { return false };
            for &p in params {
                if let Some(l) = ast.node(p).local()
                    && let Some(init) = l.init
                    && !expr_no_side_effects(ast, init)
                {
                    return false;
                }
            }
            match f.body {
                Some(body) => expr_no_side_effects(ast, body),
                None => false,
            }
        }

        _ => false,
    }
}
