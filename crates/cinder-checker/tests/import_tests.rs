//! Import materialization: aliases, identifier lists, wildcards and
//! collision provenance.

mod common;

use cinder_ast::{ImportData, ImportId, NodeId, NsData};
use cinder_common::kw;
use common::Tc;

/// Build a fake imported package API namespace exporting `answer`
/// (a package-level let) and return (ns, exported member).
fn fake_api_ns(tc: &mut Tc, pkg_path: &str, export_name: &str) -> (NodeId, NodeId) {
    let name = tc.atom(export_name);
    let loc = tc.loc();
    let lit = tc.ast.mk_int_lit(loc, 42);
    let member = tc.ast.mk_let(loc, name, Some(NodeId::INT), Some(lit));
    // exported members arrive already checked by their own package's pass
    tc.ast.add_flags(member, cinder_ast::NodeFlags::CHECKED);
    let ns = tc.ast.mk_ns(
        loc,
        NsData {
            name: None,
            members: vec![member],
            member_names: vec![name],
            pkg_path: Some(pkg_path.to_string()),
        },
        true,
    );
    (ns, member)
}

/// `import "dep" as d` followed by `d.answer`.
#[test]
fn alias_import_binds_namespace() {
    let mut tc = Tc::new();
    let (ns, _member) = fake_api_ns(&mut tc, "dep", "answer");
    let d = tc.atom("d");
    let answer = tc.atom("answer");
    let v = tc.atom("v");

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: d,
            ids: vec![],
            pkg_ns: Some(ns),
        },
    );

    let d_ref = tc.ast.mk_id(loc, d);
    let member_access = tc.ast.mk_member(loc, d_ref, answer);
    let var = tc.ast.mk_var(loc, v, None, Some(member_access));

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.ast.unit_add_child(unit, var);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var), NodeId::INT);
}

/// `import answer from "dep"` binds the member directly.
#[test]
fn list_import_binds_member() {
    let mut tc = Tc::new();
    let (ns, member) = fake_api_ns(&mut tc, "dep", "answer");
    let answer = tc.atom("answer");
    let v = tc.atom("v");

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: kw::UNDERSCORE,
            ids: vec![ImportId { loc, name: answer, orig_name: None }],
            pkg_ns: Some(ns),
        },
    );

    let a_ref = tc.ast.mk_id(loc, answer);
    let var = tc.ast.mk_var(loc, v, None, Some(a_ref));

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.ast.unit_add_child(unit, var);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var), NodeId::INT);
    // the reference resolved to the package's member
    let target = match &tc.ast.node(a_ref).kind {
        cinder_ast::NodeKind::Expr(cinder_ast::ExprData {
            kind: cinder_ast::ExprKind::Id { target, .. },
            ..
        }) => *target,
        _ => None,
    };
    assert_eq!(target, Some(member));
}

/// Importing a missing member is diagnosed with the package path.
#[test]
fn missing_member_is_diagnosed() {
    let mut tc = Tc::new();
    let (ns, _) = fake_api_ns(&mut tc, "dep", "answer");
    let nope = tc.atom("nope");

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: kw::UNDERSCORE,
            ids: vec![ImportId { loc, name: nope, orig_name: None }],
            pkg_ns: Some(ns),
        },
    );

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.check(&[unit]);

    tc.assert_error_contains("no member \"nope\" in package \"dep\"");
}

/// `import * from "dep"` binds everything not explicitly enumerated.
#[test]
fn wildcard_import_binds_members() {
    let mut tc = Tc::new();
    let (ns, _) = fake_api_ns(&mut tc, "dep", "answer");
    let answer = tc.atom("answer");
    let v = tc.atom("v");

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: kw::UNDERSCORE,
            ids: vec![ImportId { loc, name: kw::UNDERSCORE, orig_name: None }],
            pkg_ns: Some(ns),
        },
    );

    let a_ref = tc.ast.mk_id(loc, answer);
    let var = tc.ast.mk_var(loc, v, None, Some(a_ref));

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.ast.unit_add_child(unit, var);
    tc.check(&[unit]);

    tc.assert_ok();
    assert_eq!(tc.ast.expr_ty(var), NodeId::INT);
}

/// A wildcard member colliding with a package-level definition is an error
/// with provenance.
#[test]
fn wildcard_collision_with_definition() {
    let mut tc = Tc::new();
    let (ns, _) = fake_api_ns(&mut tc, "dep", "answer");
    let answer = tc.atom("answer");

    // a local package-level definition of the same name
    let loc = tc.loc();
    let lit = tc.ast.mk_int_lit(loc, 1);
    let local_def = tc.ast.mk_let(loc, answer, Some(NodeId::INT), Some(lit));
    tc.pkg.define(answer, local_def);

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: kw::UNDERSCORE,
            ids: vec![ImportId { loc, name: kw::UNDERSCORE, orig_name: None }],
            pkg_ns: Some(ns),
        },
    );

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.ast.unit_add_child(unit, local_def);
    tc.check(&[unit]);

    tc.assert_error_contains("duplicate definition \"answer\"");
    tc.assert_warning_contains("\"answer\" previously imported from package \"dep\"");
}

/// After `import answer as a`, a stray use of the original name gets a
/// rename suggestion.
#[test]
fn renamed_import_suggests_new_name() {
    let mut tc = Tc::new();
    let (ns, _) = fake_api_ns(&mut tc, "dep", "answer");
    let answer = tc.atom("answer");
    let a = tc.atom("a");
    let v = tc.atom("v");

    let loc = tc.loc();
    let import = tc.ast.mk_import(
        loc,
        ImportData {
            path: "dep".to_string(),
            path_loc: loc,
            name: kw::UNDERSCORE,
            ids: vec![
                ImportId { loc, name: kw::UNDERSCORE, orig_name: None },
                ImportId { loc, name: a, orig_name: Some(answer) },
            ],
            pkg_ns: Some(ns),
        },
    );

    // uses the original name by mistake
    let bad_ref = tc.ast.mk_id(loc, answer);
    let var = tc.ast.mk_var(loc, v, None, Some(bad_ref));

    let unit = tc.ast.mk_unit();
    tc.ast.unit_add_import(unit, import);
    tc.ast.unit_add_child(unit, var);
    tc.check(&[unit]);

    tc.assert_error_contains("unknown identifier \"answer\"");
    tc.assert_help_contains("did you mean \"a\"");
}

/// Fuzzy suggestions for misspelled identifiers.
#[test]
fn misspelled_identifier_gets_fuzzy_suggestion() {
    let mut tc = Tc::new();
    let foobar = tc.atom("foobar");
    let foobaz = tc.atom("foobaz");
    let v = tc.atom("v");

    let loc = tc.loc();
    let one = tc.ast.mk_int_lit(loc, 1);
    let def = tc.ast.mk_var(loc, foobar, None, Some(one));
    let bad_ref = tc.ast.mk_id(loc, foobaz);
    let var = tc.ast.mk_var(loc, v, None, Some(bad_ref));

    let unit = tc.unit(vec![def, var]);
    tc.check(&[unit]);

    tc.assert_error_contains("unknown identifier \"foobaz\"");
    tc.assert_help_contains("did you mean \"foobar\"");
}
