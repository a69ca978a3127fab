//! Compile-time evaluation of unsigned integer expressions.
//!
//! The semantic pass only needs `comptime_eval_uint`: array lengths and
//! constant subscript indices. General compile-time evaluation lives
//! outside this crate.

use cinder_ast::{ExprData, ExprKind, NodeArena, NodeId, NodeKind, Op};

/// Evaluate `n` as an unsigned integer, if it is a compile-time constant.
/// Returns `None` when the expression is not constant or the evaluation
/// overflows.
pub fn comptime_eval_uint(ast: &NodeArena, n: NodeId) -> Option<u64> {
    let NodeKind::Expr(e) = &ast.node(n).kind else { return None };
    match &e.kind {
        ExprKind::IntLit { value } => Some(*value),
        ExprKind::BoolLit { value } => Some(u64::from(*value)),

        ExprKind::Id { target: Some(t), .. } => {
            // a `let` with a constant initializer is itself constant
            let NodeKind::Expr(ExprData { kind: ExprKind::Let(l), .. }) = &ast.node(*t).kind
            else {
                return None;
            };
            comptime_eval_uint(ast, l.init?)
        }

        ExprKind::TypeCons { args } if args.len() == 1 => comptime_eval_uint(ast, args[0]),

        ExprKind::Prefix { op: Op::Not, expr } => {
            let v = comptime_eval_uint(ast, *expr)?;
            Some(u64::from(v == 0))
        }

        ExprKind::Binary { op, lhs, rhs } => {
            let l = comptime_eval_uint(ast, *lhs)?;
            let r = comptime_eval_uint(ast, *rhs)?;
            match op {
                Op::Add => l.checked_add(r),
                Op::Sub => l.checked_sub(r),
                Op::Mul => l.checked_mul(r),
                Op::Div => l.checked_div(r),
                Op::Mod => l.checked_rem(r),
                Op::And => Some(l & r),
                Op::Or => Some(l | r),
                Op::Xor => Some(l ^ r),
                Op::Shl => l.checked_shl(u32::try_from(r).ok()?),
                Op::Shr => l.checked_shr(u32::try_from(r).ok()?),
                _ => None,
            }
        }

        _ => None,
    }
}
