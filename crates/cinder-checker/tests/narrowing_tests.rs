//! Optional-type narrowing through conditionals.

mod common;

use cinder_ast::{ExprData, ExprKind, NodeId, NodeKind, Op, TypeKind};
use common::Tc;

/// `fun f(a ?int) int { if a { a } else { 0 } }`
/// The tested binding is `int` in the then branch; the whole `if` is `int`.
#[test]
fn narrow_then_branch_to_element_type() {
    let mut tc = Tc::new();
    let a = tc.atom("a");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let a_then = tc.ast.mk_id(loc, a);
    let then_b = tc.ast.mk_block(loc, vec![a_then], loc);
    let zero = tc.ast.mk_int_lit(loc, 0);
    let else_b = tc.ast.mk_block(loc, vec![zero], loc);
    let a_cond = tc.ast.mk_id(loc, a);
    let ife = tc.ast.mk_if(loc, a_cond, then_b, Some(else_b));

    let f = tc.fun("f", vec![param], NodeId::INT, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(a_then), NodeId::INT, "then-branch binding is int");
    assert_eq!(tc.ast.expr_ty(ife), NodeId::INT, "if expression is int");
}

/// In the else branch the tested binding has type void ("empty").
#[test]
fn narrow_else_branch_to_void() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let then_b = tc.ast.mk_block(loc, vec![], loc);
    // else { _ = a }
    let a_else = tc.ast.mk_id(loc, a);
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, Op::Assign, sink, a_else);
    let else_b = tc.ast.mk_block(loc, vec![discard], loc);
    let a_cond = tc.ast.mk_id(loc, a);
    let ife = tc.ast.mk_if(loc, a_cond, then_b, Some(else_b));

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(a_else), NodeId::VOID, "else-branch binding is void");
}

/// `if !a` reverses the polarity: void in then, element in else.
#[test]
fn negation_flips_polarity() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let a_then = tc.ast.mk_id(loc, a);
    let sink1 = tc.ast.mk_id(loc, underscore);
    let use_then = tc.ast.mk_assign(loc, Op::Assign, sink1, a_then);
    let then_b = tc.ast.mk_block(loc, vec![use_then], loc);

    let a_else = tc.ast.mk_id(loc, a);
    let sink2 = tc.ast.mk_id(loc, underscore);
    let use_else = tc.ast.mk_assign(loc, Op::Assign, sink2, a_else);
    let else_b = tc.ast.mk_block(loc, vec![use_else], loc);

    let a_cond = tc.ast.mk_id(loc, a);
    let not_a = tc.ast.mk_prefix(loc, Op::Not, a_cond);
    let ife = tc.ast.mk_if(loc, not_a, then_b, Some(else_b));

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(a_then), NodeId::VOID, "then-branch binding is void");
    assert_eq!(tc.ast.expr_ty(a_else), NodeId::INT, "else-branch binding is int");
}

/// `if let x = a` narrows the fresh binding from ?int to int.
#[test]
fn if_let_defines_narrowed_binding() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let x = tc.atom("x");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let a_init = tc.ast.mk_id(loc, a);
    let let_x = tc.ast.mk_let(loc, x, None, Some(a_init));
    let x_then = tc.ast.mk_id(loc, x);
    let sink = tc.ast.mk_id(loc, underscore);
    let use_x = tc.ast.mk_assign(loc, Op::Assign, sink, x_then);
    let then_b = tc.ast.mk_block(loc, vec![use_x], loc);
    let ife = tc.ast.mk_if(loc, let_x, then_b, None);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(x_then), NodeId::INT, "if-let binding is int in then");
}

/// `if let x i8 = a` with `a ?int` rejects the annotation.
#[test]
fn if_let_annotation_must_accept_element() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let x = tc.atom("x");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let a_init = tc.ast.mk_id(loc, a);
    let let_x = tc.ast.mk_let(loc, x, Some(NodeId::I8), Some(a_init));
    let then_b = tc.ast.mk_block(loc, vec![], loc);
    let ife = tc.ast.mk_if(loc, let_x, then_b, None);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("cannot assign value of type int to let of type i8");
}

/// `fun f(a ?int) { if let x = a || !a { } }` is rejected: a narrowing
/// definition mixed with `||` has ambiguous else semantics.
#[test]
fn if_let_mixed_with_or_is_rejected() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let x = tc.atom("x");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let a_init = tc.ast.mk_id(loc, a);
    let let_x = tc.ast.mk_let(loc, x, None, Some(a_init));
    let a_not = tc.ast.mk_id(loc, a);
    let not_a = tc.ast.mk_prefix(loc, Op::Not, a_not);
    let cond = tc.ast.mk_binary(loc, Op::LOr, let_x, not_a);
    let then_b = tc.ast.mk_block(loc, vec![], loc);
    let ife = tc.ast.mk_if(loc, cond, then_b, None);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("cannot use type-narrowing let definition with '||' operation");
}

/// A non-boolean, non-optional condition is rejected.
#[test]
fn condition_must_be_bool_or_optional() {
    let mut tc = Tc::new();
    let xname = tc.atom("x");

    let loc = tc.loc();
    let param = tc.ast.mk_param(loc, xname, NodeId::INT);

    let loc = tc.loc();
    let x_cond = tc.ast.mk_id(loc, xname);
    let then_b = tc.ast.mk_block(loc, vec![], loc);
    let ife = tc.ast.mk_if(loc, x_cond, then_b, None);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![ife]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("conditional is not a boolean nor an optional type");
}

/// An rvalue `if` without `else` lifts the then-type into an optional.
#[test]
fn rvalue_if_without_else_is_optional() {
    let mut tc = Tc::new();
    let a = tc.atom("a");
    let v = tc.atom("v");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let opt_int = tc.ast.mk_optional_type(loc, NodeId::INT);
    let param = tc.ast.mk_param(loc, a, opt_int);

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let then_b = tc.ast.mk_block(loc, vec![one], loc);
    let a_cond = tc.ast.mk_id(loc, a);
    let ife = tc.ast.mk_if(loc, a_cond, then_b, None);
    let var_v = tc.ast.mk_var(loc, v, None, Some(ife));
    // keep the binding used so no unused warning muddies the assertion
    let v_use = tc.ast.mk_id(loc, v);
    let sink = tc.ast.mk_id(loc, underscore);
    let use_v = tc.ast.mk_assign(loc, Op::Assign, sink, v_use);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![var_v, use_v]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    let vt = tc.ast.expr_ty(var_v);
    match &tc.ast.node(vt).kind {
        NodeKind::Type(td) => assert!(
            matches!(td.kind, TypeKind::Optional { elem } if elem == NodeId::INT),
            "expected ?int, got {:?}",
            td.kind
        ),
        other => panic!("expected a type, got {other:?}"),
    }
    // the narrowing trace must not have rewritten the if node kind
    assert!(matches!(
        &tc.ast.node(ife).kind,
        NodeKind::Expr(ExprData { kind: ExprKind::If { .. }, .. })
    ));
}
