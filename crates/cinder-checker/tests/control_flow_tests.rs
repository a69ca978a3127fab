//! Blocks, returns, unused-value reporting, subscripts and dereferences.

mod common;

use cinder_ast::{ExprData, ExprKind, NodeFlags, NodeId, NodeKind};
use common::Tc;

/// `fun f() int { 42 }` converts the trailing expression into a return.
#[test]
fn implicit_return_of_trailing_expression() {
    let mut tc = Tc::new();

    let loc = tc.loc();
    let lit = tc.ast.mk_int_lit(loc, 42);
    let f = tc.fun("f", vec![], NodeId::INT, vec![lit]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    let body = match &tc.ast.node(f).kind {
        NodeKind::Expr(ExprData { kind: ExprKind::Fun(fd), .. }) => fd.body.unwrap(),
        _ => panic!("not a function"),
    };
    let last = match &tc.ast.node(body).kind {
        NodeKind::Expr(ExprData { kind: ExprKind::Block { children, .. }, .. }) => {
            *children.last().unwrap()
        }
        _ => panic!("not a block"),
    };
    assert!(
        matches!(
            &tc.ast.node(last).kind,
            NodeKind::Expr(ExprData { kind: ExprKind::Return { value: Some(_) }, .. })
        ),
        "trailing expression was wrapped in a return"
    );
}

/// `fun f() int { }` misses its return value.
#[test]
fn missing_return_value() {
    let mut tc = Tc::new();
    let f = tc.fun("f", vec![], NodeId::INT, vec![]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("missing return value");
}

/// An explicit return marks the block exited; trailing statements are
/// ignored and no implicit-return conversion happens.
#[test]
fn explicit_return_exits_block() {
    let mut tc = Tc::new();

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let ret = tc.ast.mk_return(loc, Some(one));
    let two = tc.ast.mk_int_lit(loc, 2);
    let f = tc.fun("f", vec![], NodeId::INT, vec![ret, two]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    let body = match &tc.ast.node(f).kind {
        NodeKind::Expr(ExprData { kind: ExprKind::Fun(fd), .. }) => fd.body.unwrap(),
        _ => panic!("not a function"),
    };
    assert!(tc.ast.flags(body).contains(NodeFlags::EXIT));
    // the unreachable trailing literal is unused and never checked
    assert_eq!(tc.ast.node(two).nuse, 0);
}

#[test]
fn return_outside_function() {
    let mut tc = Tc::new();
    let loc = tc.loc();
    let ret = tc.ast.mk_return(loc, None);
    let unit = tc.unit(vec![ret]);
    tc.check(&[unit]);

    tc.assert_error_contains("return outside of function");
}

#[test]
fn wrong_return_type() {
    let mut tc = Tc::new();
    let loc = tc.loc();
    let t = tc.ast.mk_bool_lit(loc, true);
    let ret = tc.ast.mk_return(loc, Some(t));
    let f = tc.fun("f", vec![], NodeId::INT, vec![ret]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("invalid function result type: bool");
}

/// An unused binding in a block gets a warning.
#[test]
fn unused_binding_warns() {
    let mut tc = Tc::new();
    let x = tc.atom("x");

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let let_x = tc.ast.mk_let(loc, x, None, Some(one));
    let f = tc.fun("f", vec![], NodeId::VOID, vec![let_x]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_warning_contains("unused let x");
}

/// A pure expression statement gets an unused warning.
#[test]
fn unused_pure_expression_warns() {
    let mut tc = Tc::new();

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let sum = tc.ast.mk_binary(loc, cinder_ast::Op::Add, one, two);
    let f = tc.fun("f", vec![], NodeId::VOID, vec![sum]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_warning_contains("unused");
}

/// Subscripting a sized array with a constant index checks bounds.
#[test]
fn array_subscript_out_of_bounds() {
    let mut tc = Tc::new();
    let arr = tc.atom("arr");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let three = tc.ast.mk_int_lit(loc, 3);
    let arr_ty = tc.ast.mk_array_type(loc, NodeId::INT, Some(three));
    let param = tc.ast.mk_param(loc, arr, arr_ty);

    let arr_ref = tc.ast.mk_id(loc, arr);
    let five = tc.ast.mk_int_lit(loc, 5);
    let sub = tc.ast.mk_subscript(loc, arr_ref, five, loc);
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, cinder_ast::Op::Assign, sink, sub);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![discard]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("out of bounds: element 5 of array [int 3]");
}

#[test]
fn array_subscript_in_bounds() {
    let mut tc = Tc::new();
    let arr = tc.atom("arr");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let three = tc.ast.mk_int_lit(loc, 3);
    let arr_ty = tc.ast.mk_array_type(loc, NodeId::INT, Some(three));
    let param = tc.ast.mk_param(loc, arr, arr_ty);

    let arr_ref = tc.ast.mk_id(loc, arr);
    let one = tc.ast.mk_int_lit(loc, 1);
    let sub = tc.ast.mk_subscript(loc, arr_ref, one, loc);
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, cinder_ast::Op::Assign, sink, sub);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![discard]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(sub), NodeId::INT);
    assert!(tc.ast.flags(one).contains(NodeFlags::CONST));
}

#[test]
fn cannot_index_scalar() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let param = tc.ast.mk_param(loc, x, NodeId::INT);
    let x_ref = tc.ast.mk_id(loc, x);
    let zero = tc.ast.mk_int_lit(loc, 0);
    let sub = tc.ast.mk_subscript(loc, x_ref, zero, loc);
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, cinder_ast::Op::Assign, sink, sub);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![discard]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("cannot index into type int");
}

/// Dereferencing a reference to an owning value is a borrow violation.
#[test]
fn deref_of_borrowed_owner_is_rejected() {
    let mut tc = Tc::new();
    let r = tc.atom("r");
    let underscore = tc.atom("_");

    let loc = tc.loc();
    let ptr_int = tc.ast.mk_ptr_type(loc, NodeId::INT);
    let ref_ptr = tc.ast.mk_ref_type(loc, ptr_int, false);
    let param = tc.ast.mk_param(loc, r, ref_ptr);

    let r_ref = tc.ast.mk_id(loc, r);
    let deref = tc.ast.mk_deref(loc, r_ref);
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, cinder_ast::Op::Assign, sink, deref);

    let f = tc.fun("f", vec![param], NodeId::VOID, vec![discard]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("cannot transfer ownership of borrowed &*int");
}

/// `fun main()` must take no parameters and return void.
#[test]
fn main_signature_is_validated() {
    let mut tc = Tc::new();
    let x = tc.atom("x");

    let loc = tc.loc();
    let param = tc.ast.mk_param(loc, x, NodeId::INT);
    let f = tc.fun("main", vec![param], NodeId::VOID, vec![]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("should not accept any input parameters");
    assert_eq!(tc.pkg.main_fun, Some(f));
}

#[test]
fn main_result_is_validated() {
    let mut tc = Tc::new();
    let loc = tc.loc();
    let lit = tc.ast.mk_int_lit(loc, 0);
    let f = tc.fun("main", vec![], NodeId::INT, vec![lit]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("should not return a result");
}
