//! Generic post-order AST mapping.
//!
//! [`AstFolder`] visits children before deciding whether the parent was
//! modified: a node whose children all came back verbatim is itself
//! verbatim (the same id), otherwise a fresh node is allocated with the
//! replaced children and the original header. Unlike [`NodeArena::children`]
//! the fold also descends into expression types, because a rewrite (e.g.
//! template placeholder substitution) must reach type annotations.

use crate::arena::{NodeArena, NodeId};
use crate::node::{ExprKind, NodeKind, TypeKind};

pub trait AstFolder {
    /// Map one node. The default visits children only; implementors
    /// override this to substitute nodes and post-process modified parents.
    fn fold(&mut self, ast: &mut NodeArena, id: NodeId) -> NodeId {
        self.fold_children(ast, id)
    }

    /// Visit all children of `id` through [`AstFolder::fold`]; if any child
    /// was replaced, allocate and return a new parent, else return `id`.
    fn fold_children(&mut self, ast: &mut NodeArena, id: NodeId) -> NodeId {
        fold_children(self, ast, id)
    }
}

pub fn fold_children<F: AstFolder + ?Sized>(
    folder: &mut F,
    ast: &mut NodeArena,
    id: NodeId,
) -> NodeId {
    fn go<F: AstFolder + ?Sized>(
        ast: &mut NodeArena,
        folder: &mut F,
        slot: &mut NodeId,
        changed: &mut bool,
    ) {
        let new = folder.fold(ast, *slot);
        if new != *slot {
            *slot = new;
            *changed = true;
        }
    }

    fn go_opt<F: AstFolder + ?Sized>(
        ast: &mut NodeArena,
        folder: &mut F,
        slot: &mut Option<NodeId>,
        changed: &mut bool,
    ) {
        if let Some(s) = slot {
            let new = folder.fold(ast, *s);
            if new != *s {
                *slot = Some(new);
                *changed = true;
            }
        }
    }

    let mut node = ast.node(id).clone();
    let mut changed = false;

    {
        let changed = &mut changed;
        match &mut node.kind {
            NodeKind::Unit(u) => {
                for slot in u.imports.iter_mut().chain(u.children.iter_mut()) {
                    go(ast, folder, slot, changed);
                }
            }
            NodeKind::Import(_) => {}
            NodeKind::TypeDef { ty } => go(ast, folder, ty, changed),
            NodeKind::TemplateParam { default, .. } => go_opt(ast, folder, default, changed),
            NodeKind::Expr(e) => {
                go(ast, folder, &mut e.ty, changed);
                match &mut e.kind {
                    ExprKind::BoolLit { .. }
                    | ExprKind::IntLit { .. }
                    | ExprKind::FloatLit { .. }
                    | ExprKind::StrLit { .. }
                    | ExprKind::Id { .. } => {}
                    ExprKind::ArrayLit { values, .. } => {
                        for slot in values.iter_mut() {
                            go(ast, folder, slot, changed);
                        }
                    }
                    ExprKind::Ns(ns) => {
                        for slot in ns.members.iter_mut() {
                            go(ast, folder, slot, changed);
                        }
                    }
                    ExprKind::Field(l)
                    | ExprKind::Param(l)
                    | ExprKind::Var(l)
                    | ExprKind::Let(l) => go_opt(ast, folder, &mut l.init, changed),
                    ExprKind::Member { recv, .. } => go(ast, folder, recv, changed),
                    ExprKind::Subscript { recv, index, .. } => {
                        go(ast, folder, recv, changed);
                        go(ast, folder, index, changed);
                    }
                    ExprKind::Prefix { expr, .. }
                    | ExprKind::Postfix { expr, .. }
                    | ExprKind::Deref { expr } => go(ast, folder, expr, changed),
                    ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                        go(ast, folder, lhs, changed);
                        go(ast, folder, rhs, changed);
                    }
                    ExprKind::If { cond, then_block, else_block } => {
                        go(ast, folder, cond, changed);
                        go(ast, folder, then_block, changed);
                        go_opt(ast, folder, else_block, changed);
                    }
                    ExprKind::Return { value } => go_opt(ast, folder, value, changed),
                    ExprKind::Call { recv, args, .. } => {
                        go(ast, folder, recv, changed);
                        for slot in args.iter_mut() {
                            go(ast, folder, slot, changed);
                        }
                    }
                    ExprKind::TypeCons { args } => {
                        for slot in args.iter_mut() {
                            go(ast, folder, slot, changed);
                        }
                    }
                    ExprKind::Block { children, .. } => {
                        for slot in children.iter_mut() {
                            go(ast, folder, slot, changed);
                        }
                    }
                    ExprKind::Fun(f) => {
                        go_opt(ast, folder, &mut f.recv_type, changed);
                        go_opt(ast, folder, &mut f.body, changed);
                    }
                }
            }
            NodeKind::Type(t) => match &mut t.kind {
                TypeKind::Array { elem, len_expr, .. } => {
                    go(ast, folder, elem, changed);
                    go_opt(ast, folder, len_expr, changed);
                }
                TypeKind::Fun { params, result } => {
                    for slot in params.iter_mut() {
                        go(ast, folder, slot, changed);
                    }
                    go(ast, folder, result, changed);
                }
                TypeKind::Ptr { elem }
                | TypeKind::Ref { elem }
                | TypeKind::MutRef { elem }
                | TypeKind::Slice { elem }
                | TypeKind::MutSlice { elem }
                | TypeKind::Optional { elem } => go(ast, folder, elem, changed),
                TypeKind::Struct(st) => {
                    for slot in st.fields.iter_mut() {
                        go(ast, folder, slot, changed);
                    }
                }
                TypeKind::Alias(at) => go(ast, folder, &mut at.elem, changed),
                TypeKind::Template { recv, args } => {
                    go(ast, folder, recv, changed);
                    for slot in args.iter_mut() {
                        go(ast, folder, slot, changed);
                    }
                }
                _ => {}
            },
        }
    }

    if changed { ast.alloc(node) } else { id }
}

#[cfg(test)]
#[path = "tests/fold.rs"]
mod tests;
