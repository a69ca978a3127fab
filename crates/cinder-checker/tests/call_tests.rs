//! Function calls, named arguments, and primitive type constructions.

mod common;

use cinder_ast::{ExprData, ExprKind, NodeId, NodeKind};
use common::Tc;

/// `fun add(x int, y int) int { return x + y }` plus a callsite.
fn define_add(tc: &mut Tc) -> NodeId {
    let x = tc.atom("x");
    let y = tc.atom("y");

    let loc = tc.loc();
    let px = tc.ast.mk_param(loc, x, NodeId::INT);
    let py = tc.ast.mk_param(loc, y, NodeId::INT);
    let xr = tc.ast.mk_id(loc, x);
    let yr = tc.ast.mk_id(loc, y);
    let sum = tc.ast.mk_binary(loc, cinder_ast::Op::Add, xr, yr);
    let ret = tc.ast.mk_return(loc, Some(sum));
    tc.fun("add", vec![px, py], NodeId::INT, vec![ret])
}

#[test]
fn call_with_positional_args() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let call = tc.ast.mk_call(loc, recv, vec![one, two], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(call), NodeId::INT);
    assert_eq!(tc.ast.expr_ty(var), NodeId::INT);
}

#[test]
fn call_arity_is_enforced() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let call = tc.ast.mk_call(loc, recv, vec![one], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("not enough arguments in function call, expected 2");
}

#[test]
fn named_argument_in_order_is_accepted() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let y = tc.atom("y");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let named = tc.ast.mk_named_arg(loc, y, two);
    let call = tc.ast.mk_call(loc, recv, vec![one, named], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_ok();
}

#[test]
fn unknown_named_argument() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let z = tc.atom("z");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let named = tc.ast.mk_named_arg(loc, z, two);
    let call = tc.ast.mk_call(loc, recv, vec![one, named], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("unknown named argument \"z\"");
}

#[test]
fn positional_after_named_is_rejected() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let x = tc.atom("x");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let named = tc.ast.mk_named_arg(loc, x, one);
    let call = tc.ast.mk_call(loc, recv, vec![named, two], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("positional argument after named argument(s)");
}

#[test]
fn argument_type_mismatch() {
    let mut tc = Tc::new();
    let add_fun = define_add(&mut tc);
    let add = tc.atom("add");
    let v = tc.atom("v");

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, add);
    let one = tc.ast.mk_int_lit(loc, 1);
    let t = tc.ast.mk_bool_lit(loc, true);
    let call = tc.ast.mk_call(loc, recv, vec![one, t], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![add_fun, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("passing value of type bool to parameter of type int");
}

/// `int(x)` on an `int` value elides the construction into the bare
/// argument, transferring use counts.
#[test]
fn equivalent_primitive_cast_is_elided() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let int_name = tc.atom("int");
    let v = tc.atom("v");

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let var_x = tc.ast.mk_var(loc, x, Some(NodeId::INT), Some(one));
    let x_ref = tc.ast.mk_id(loc, x);
    let recv = tc.ast.mk_id_resolved(loc, int_name, NodeId::INT);
    let call = tc.ast.mk_call(loc, recv, vec![x_ref], loc);
    let var_v = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![var_x, var_v]);
    tc.check(&[unit]);

    tc.assert_ok();
    // the construction collapsed to the bare argument
    let init = tc.ast.node(var_v).local().and_then(|l| l.init).unwrap();
    assert_eq!(init, x_ref, "cast to the same type is elided");
    assert_eq!(tc.ast.expr_ty(var_v), NodeId::INT);
}

/// `i8(x)` on an `int` value is a primitive conversion.
#[test]
fn primitive_conversion_is_accepted() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let i8_name = tc.atom("i8");
    let v = tc.atom("v");

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let var_x = tc.ast.mk_var(loc, x, Some(NodeId::INT), Some(one));
    let x_ref = tc.ast.mk_id(loc, x);
    let recv = tc.ast.mk_id_resolved(loc, i8_name, NodeId::I8);
    let call = tc.ast.mk_call(loc, recv, vec![x_ref], loc);
    let var_v = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![var_x, var_v]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var_v), NodeId::I8);
    // the node transitioned in place into a construction
    assert!(matches!(
        &tc.ast.node(call).kind,
        NodeKind::Expr(ExprData { kind: ExprKind::TypeCons { .. }, .. })
    ));
}

/// `void(x)`: the construction takes no arguments.
#[test]
fn void_construction_rejects_arguments() {
    let mut tc = Tc::new();
    let void_name = tc.atom("void");

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let recv = tc.ast.mk_id_resolved(loc, void_name, NodeId::VOID);
    let call = tc.ast.mk_call(loc, recv, vec![one], loc);

    let f = tc.fun("f", vec![], NodeId::VOID, vec![call]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("accepts no arguments");
}

/// Calling a non-function value is an error.
#[test]
fn calling_non_function() {
    let mut tc = Tc::new();
    let x = tc.atom("x");

    let loc = tc.loc();
    let three = tc.ast.mk_int_lit(loc, 3);
    let var_x = tc.ast.mk_var(loc, x, Some(NodeId::INT), Some(three));
    let x_ref = tc.ast.mk_id(loc, x);
    let one = tc.ast.mk_int_lit(loc, 1);
    let call = tc.ast.mk_call(loc, x_ref, vec![one], loc);

    let f = tc.fun("f", vec![], NodeId::VOID, vec![var_x, call]);
    let unit = tc.unit(vec![f]);
    tc.check(&[unit]);

    tc.assert_error_contains("calling an expression of type int, expected function or type");
}

/// A discarded owning call result warns about the dropped ownership.
#[test]
fn discarded_owning_result_warns() {
    let mut tc = Tc::new();
    let mk = tc.atom("mk");

    // fun mk() *int (prototype)
    let loc = tc.loc();
    let ptr_int = tc.ast.mk_ptr_type(loc, NodeId::INT);
    let ft = tc.ast.mk_fun_type(loc, vec![], ptr_int);
    let mk_fun = tc.ast.mk_fun(loc, Some(mk), ft, None, None);

    let loc = tc.loc();
    let recv = tc.ast.mk_id(loc, mk);
    let call = tc.ast.mk_call(loc, recv, vec![], loc);

    let f = tc.fun("f", vec![], NodeId::VOID, vec![call]);
    let unit = tc.unit(vec![mk_fun, f]);
    tc.check(&[unit]);

    tc.assert_warning_contains("unused result; ownership transferred from function call");
}
