//! Struct layout, interning, construction, methods and ownership
//! propagation.

mod common;

use cinder_ast::{NodeFlags, NodeId};
use common::Tc;

/// Offsets are field-aligned, struct size rounds up to struct alignment.
#[test]
fn struct_layout() {
    let mut tc = Tc::new();
    let (a, b, c) = (tc.atom("a"), tc.atom("b"), tc.atom("c"));
    let s = tc.atom("S");

    let loc = tc.loc();
    let fa = tc.ast.mk_field(loc, a, NodeId::U8, None);
    let fb = tc.ast.mk_field(loc, b, NodeId::U32, None);
    let fc = tc.ast.mk_field(loc, c, NodeId::U8, None);
    let st = tc.ast.mk_struct_type(loc, Some(s), vec![fa, fb, fc], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);
    let unit = tc.unit(vec![typedef]);
    tc.check(&[unit]);

    tc.assert_ok();
    let offset = |tcx: &Tc, f: NodeId| tcx.ast.node(f).local().unwrap().offset;
    assert_eq!(offset(&tc, fa), 0);
    assert_eq!(offset(&tc, fb), 4);
    assert_eq!(offset(&tc, fc), 8);
    assert_eq!(tc.ast.type_align(st), 4);
    assert_eq!(tc.ast.type_size(st), 12);
}

/// Structurally identical struct types are interned to one node.
#[test]
fn struct_interning_dedups() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let s = tc.atom("S");
    let v = tc.atom("v");

    let loc = tc.loc();
    let f1 = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let st1 = tc.ast.mk_struct_type(loc, Some(s), vec![f1], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st1);

    // a second, structurally identical type node used as an annotation
    let loc = tc.loc();
    let f2 = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let st2 = tc.ast.mk_struct_type(loc, Some(s), vec![f2], vec![]);
    let var = tc.ast.mk_var(loc, v, Some(st2), None);

    let unit = tc.unit(vec![typedef, var]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var), st1, "annotation interned to the canonical node");
}

/// `type A {}  fun A.drop(mut this) {}  type B { a A }`
/// B picks up ownership from A's later drop through post-analysis.
#[test]
fn postanalysis_propagates_ownership() {
    let mut tc = Tc::new();
    let a_name = tc.atom("A");
    let b_name = tc.atom("B");
    let a_field = tc.atom("a");
    let drop_name = tc.atom("drop");

    let loc = tc.loc();
    let struct_a = tc.ast.mk_struct_type(loc, Some(a_name), vec![], vec![]);
    let typedef_a = tc.ast.mk_typedef(loc, struct_a);

    let loc = tc.loc();
    let ann_a = tc.ast.mk_unresolved_type(loc, a_name);
    let field = tc.ast.mk_field(loc, a_field, ann_a, None);
    let struct_b = tc.ast.mk_struct_type(loc, Some(b_name), vec![field], vec![]);
    let typedef_b = tc.ast.mk_typedef(loc, struct_b);

    // fun A.drop(mut this) — declared after B
    let loc = tc.loc();
    let recv = tc.ast.mk_unresolved_type(loc, a_name);
    let this_param = tc.ast.mk_this_param(loc, recv, true);
    let ft = tc.ast.mk_fun_type(loc, vec![this_param], NodeId::VOID);
    let body = tc.ast.mk_block(loc, vec![], loc);
    let drop_fun = tc.ast.mk_fun(loc, Some(drop_name), ft, Some(body), Some(recv));

    tc.pkg.define(a_name, struct_a);

    let unit = tc.unit(vec![typedef_a, typedef_b, drop_fun]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert!(tc.ast.flags(struct_a).contains(NodeFlags::DROP), "A has a destructor");
    assert!(
        tc.ast.flags(struct_b).contains(NodeFlags::SUBOWNERS),
        "B owns through its field"
    );
}

/// An invalid drop signature is rejected.
#[test]
fn drop_signature_is_validated() {
    let mut tc = Tc::new();
    let a_name = tc.atom("A");
    let drop_name = tc.atom("drop");

    let loc = tc.loc();
    let struct_a = tc.ast.mk_struct_type(loc, Some(a_name), vec![], vec![]);
    let typedef_a = tc.ast.mk_typedef(loc, struct_a);

    // fun A.drop(this) — missing `mut`
    let loc = tc.loc();
    let recv = tc.ast.mk_unresolved_type(loc, a_name);
    let this_param = tc.ast.mk_this_param(loc, recv, false);
    let ft = tc.ast.mk_fun_type(loc, vec![this_param], NodeId::VOID);
    let body = tc.ast.mk_block(loc, vec![], loc);
    let drop_fun = tc.ast.mk_fun(loc, Some(drop_name), ft, Some(body), Some(recv));

    tc.pkg.define(a_name, struct_a);

    let unit = tc.unit(vec![typedef_a, drop_fun]);
    tc.check(&[unit]);

    tc.assert_error_contains("invalid signature of \"drop\" function");
}

/// Construction diagnoses unknown, duplicate and missing fields.
#[test]
fn struct_construction_field_checks() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let y = tc.atom("y");
    let nope = tc.atom("nope");
    let p_name = tc.atom("P");

    // type P { x int  y int }
    let loc = tc.loc();
    let fx = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let fy = tc.ast.mk_field(loc, y, NodeId::INT, None);
    let st = tc.ast.mk_struct_type(loc, Some(p_name), vec![fx, fy], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);

    // P{nope: 1}
    let loc = tc.loc();
    let recv = tc.ast.mk_id_resolved(loc, p_name, st);
    let one = tc.ast.mk_int_lit(loc, 1);
    let named = tc.ast.mk_named_arg(loc, nope, one);
    let call = tc.ast.mk_call(loc, recv, vec![named], loc);
    let v = tc.atom("v");
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![typedef, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("no \"nope\" field in struct P");
}

#[test]
fn struct_construction_succeeds() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let y = tc.atom("y");
    let p_name = tc.atom("P");
    let v = tc.atom("v");

    let loc = tc.loc();
    let fx = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let fy = tc.ast.mk_field(loc, y, NodeId::INT, None);
    let st = tc.ast.mk_struct_type(loc, Some(p_name), vec![fx, fy], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);

    // P{x: 1, y: 2}
    let loc = tc.loc();
    let recv = tc.ast.mk_id_resolved(loc, p_name, st);
    let one = tc.ast.mk_int_lit(loc, 1);
    let two = tc.ast.mk_int_lit(loc, 2);
    let nx = tc.ast.mk_named_arg(loc, x, one);
    let ny = tc.ast.mk_named_arg(loc, y, two);
    let call = tc.ast.mk_call(loc, recv, vec![nx, ny], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![typedef, var]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var), st);
}

#[test]
fn struct_construction_missing_field() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let y = tc.atom("y");
    let p_name = tc.atom("P");
    let v = tc.atom("v");

    let loc = tc.loc();
    let fx = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let fy = tc.ast.mk_field(loc, y, NodeId::INT, None);
    let st = tc.ast.mk_struct_type(loc, Some(p_name), vec![fx, fy], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);

    // P{x: 1}
    let loc = tc.loc();
    let recv = tc.ast.mk_id_resolved(loc, p_name, st);
    let one = tc.ast.mk_int_lit(loc, 1);
    let nx = tc.ast.mk_named_arg(loc, x, one);
    let call = tc.ast.mk_call(loc, recv, vec![nx], loc);
    let var = tc.ast.mk_var(loc, v, None, Some(call));

    let unit = tc.unit(vec![typedef, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("missing value for field \"y\" of struct P");
}

/// Member access resolves fields and type functions.
#[test]
fn member_resolution() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let p_name = tc.atom("P");
    let get = tc.atom("get");
    let p_param = tc.atom("p");

    // type P { x int }
    let loc = tc.loc();
    let fx = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let st = tc.ast.mk_struct_type(loc, Some(p_name), vec![fx], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);

    // fun P.get(this) int { 0 }
    let loc = tc.loc();
    let recv = tc.ast.mk_unresolved_type(loc, p_name);
    let this_param = tc.ast.mk_this_param(loc, recv, false);
    let ft = tc.ast.mk_fun_type(loc, vec![this_param], NodeId::INT);
    let zero = tc.ast.mk_int_lit(loc, 0);
    let get_body = tc.ast.mk_block(loc, vec![zero], loc);
    let get_fun = tc.ast.mk_fun(loc, Some(get), ft, Some(get_body), Some(recv));
    tc.pkg.define(p_name, st);
    tc.pkg
        .define_type_fun(&mut tc.ast, &tc.compiler.interner, st, get, get_fun);

    // fun f(p P) int { return p.x + p.get() }
    let loc = tc.loc();
    let ann = tc.ast.mk_unresolved_type(loc, p_name);
    let param = tc.ast.mk_param(loc, p_param, ann);
    let p1 = tc.ast.mk_id(loc, p_param);
    let px = tc.ast.mk_member(loc, p1, x);
    let p2 = tc.ast.mk_id(loc, p_param);
    let pget = tc.ast.mk_member(loc, p2, get);
    let call = tc.ast.mk_call(loc, pget, vec![], loc);
    let sum = tc.ast.mk_binary(loc, cinder_ast::Op::Add, px, call);
    let ret = tc.ast.mk_return(loc, Some(sum));
    let f = tc.fun("f", vec![param], NodeId::INT, vec![ret]);

    let unit = tc.unit(vec![typedef, get_fun, f]);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(px), NodeId::INT);
    assert_eq!(tc.ast.expr_ty(call), NodeId::INT);
}

/// `x.y` through an optional receiver is rejected with a help.
#[test]
fn member_through_optional_is_rejected() {
    let mut tc = Tc::new();
    let x = tc.atom("x");
    let p_name = tc.atom("P");
    let p_param = tc.atom("p");

    let loc = tc.loc();
    let fx = tc.ast.mk_field(loc, x, NodeId::INT, None);
    let st = tc.ast.mk_struct_type(loc, Some(p_name), vec![fx], vec![]);
    let typedef = tc.ast.mk_typedef(loc, st);

    let loc = tc.loc();
    let ann = tc.ast.mk_unresolved_type(loc, p_name);
    let opt = tc.ast.mk_optional_type(loc, ann);
    let param = tc.ast.mk_param(loc, p_param, opt);
    let p1 = tc.ast.mk_id(loc, p_param);
    let px = tc.ast.mk_member(loc, p1, x);
    let underscore = tc.atom("_");
    let sink = tc.ast.mk_id(loc, underscore);
    let discard = tc.ast.mk_assign(loc, cinder_ast::Op::Assign, sink, px);
    let f = tc.fun("f", vec![param], NodeId::VOID, vec![discard]);

    let unit = tc.unit(vec![typedef, f]);
    tc.check(&[unit]);

    tc.assert_error_contains("may not be valid");
    tc.assert_help_contains("before access");
}
