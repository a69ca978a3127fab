use cinder_common::interner::Interner;
use cinder_common::options::TargetInfo;
use cinder_common::srcloc::SrcLoc;

use super::*;
use crate::arena::{NodeArena, NodeId};
use crate::node::TypeKind;

/// Replaces every occurrence of one type id with another.
struct Subst {
    from: NodeId,
    to: NodeId,
}

impl AstFolder for Subst {
    fn fold(&mut self, ast: &mut NodeArena, id: NodeId) -> NodeId {
        if id == self.from {
            return self.to;
        }
        self.fold_children(ast, id)
    }
}

#[test]
fn verbatim_subtree_keeps_identity() {
    let mut ast = NodeArena::new(TargetInfo::DEFAULT);
    let opt = ast.mk_optional_type(SrcLoc::NONE, NodeId::INT);
    let mut f = Subst { from: NodeId::BOOL, to: NodeId::I8 };
    let out = f.fold(&mut ast, opt);
    assert_eq!(out, opt);
}

#[test]
fn replaced_child_allocates_new_parent() {
    let mut ast = NodeArena::new(TargetInfo::DEFAULT);
    let opt = ast.mk_optional_type(SrcLoc::NONE, NodeId::INT);
    let mut f = Subst { from: NodeId::INT, to: NodeId::I64 };
    let out = f.fold(&mut ast, opt);
    assert_ne!(out, opt);
    match ast.type_kind(out) {
        Some(TypeKind::Optional { elem }) => assert_eq!(*elem, NodeId::I64),
        other => panic!("unexpected kind: {other:?}"),
    }
    // the original is untouched
    match ast.type_kind(opt) {
        Some(TypeKind::Optional { elem }) => assert_eq!(*elem, NodeId::INT),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn fold_reaches_expression_types() {
    let mut interner = Interner::new();
    let mut ast = NodeArena::new(TargetInfo::DEFAULT);
    let x = interner.intern("x");
    // a field whose declared type should be substituted
    let field = ast.mk_field(SrcLoc::NONE, x, NodeId::INT, None);
    let st = ast.mk_struct_type(SrcLoc::NONE, None, vec![field], vec![]);
    let mut f = Subst { from: NodeId::INT, to: NodeId::U8 };
    let out = f.fold(&mut ast, st);
    assert_ne!(out, st);
    let Some(TypeKind::Struct(new_st)) = ast.type_kind(out) else { panic!("not a struct") };
    let new_field = new_st.fields[0];
    assert_ne!(new_field, field);
    assert_eq!(ast.expr_ty(new_field), NodeId::U8);
}
