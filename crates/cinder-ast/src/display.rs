//! Human-readable node formatting for diagnostics.
//!
//! Produces the short forms used in error messages, e.g. `?int`, `&[u8 5]`,
//! `mut&Foo`, `fun(int, int) int`. Rendering with source context is the
//! driver's concern; these strings are embedded in diagnostic messages.

use cinder_common::interner::Interner;

use crate::arena::{NodeArena, NodeId};
use crate::node::{ExprKind, NodeKind, TypeKind};

/// Short form of a node for embedding in a diagnostic message.
pub fn fmt_node(ast: &NodeArena, interner: &Interner, id: NodeId) -> String {
    let mut s = String::new();
    write_node(&mut s, ast, interner, id, 0);
    s
}

/// A short noun describing a node's kind, e.g. "variable" or "comparison".
pub fn fmt_kind(ast: &NodeArena, id: NodeId) -> &'static str {
    // describe what an identifier refers to, not the identifier itself
    let id = ast.unwrap_id(id);
    match &ast.node(id).kind {
        NodeKind::Unit(_) => "unit",
        NodeKind::Import(_) => "import",
        NodeKind::TypeDef { .. } => "type definition",
        NodeKind::TemplateParam { .. } => "template parameter",
        NodeKind::Expr(e) => match &e.kind {
            ExprKind::BoolLit { .. } => "boolean constant",
            ExprKind::IntLit { .. } => "integer constant",
            ExprKind::FloatLit { .. } => "floating-point constant",
            ExprKind::StrLit { .. } => "string constant",
            ExprKind::ArrayLit { .. } => "array literal",
            ExprKind::Id { .. } => "identifier",
            ExprKind::Ns(_) => "namespace",
            ExprKind::Field(_) => "field",
            ExprKind::Param(_) => "parameter",
            ExprKind::Var(_) => "var",
            ExprKind::Let(_) => "let",
            ExprKind::Member { .. } => "member",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Prefix { .. } | ExprKind::Postfix { .. } => "operation",
            ExprKind::Deref { .. } => "dereference",
            ExprKind::Binary { op, .. } if op.is_comparison() => "comparison",
            ExprKind::Binary { .. } => "binary operation",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::If { .. } => "if expression",
            ExprKind::Return { .. } => "return",
            ExprKind::Call { .. } => "function call",
            ExprKind::TypeCons { .. } => "type constructor",
            ExprKind::Block { .. } => "block",
            ExprKind::Fun(_) => "function",
        },
        NodeKind::Type(t) => match &t.kind {
            k if k.is_prim() => "type",
            TypeKind::Struct(_) => "struct type",
            TypeKind::Alias(_) => "type alias",
            TypeKind::Fun { .. } => "function type",
            TypeKind::Ns => "namespace",
            TypeKind::Template { .. } => "template",
            TypeKind::Placeholder { .. } => "template parameter",
            _ => "type",
        },
    }
}

fn write_node(s: &mut String, ast: &NodeArena, interner: &Interner, id: NodeId, depth: u32) {
    use std::fmt::Write;

    // guard against malformed cyclic input
    if depth > 16 {
        s.push('…');
        return;
    }
    let name = |a| interner.resolve(a);

    match &ast.node(id).kind {
        NodeKind::Unit(_) => s.push_str("unit"),
        NodeKind::Import(im) => {
            let _ = write!(s, "import \"{}\"", im.path);
        }
        NodeKind::TypeDef { ty } => write_node(s, ast, interner, *ty, depth + 1),
        NodeKind::TemplateParam { name: n, .. } => s.push_str(name(*n)),
        NodeKind::Expr(e) => match &e.kind {
            ExprKind::BoolLit { value } => {
                let _ = write!(s, "{value}");
            }
            ExprKind::IntLit { value } => {
                let _ = write!(s, "{value}");
            }
            ExprKind::FloatLit { value } => {
                let _ = write!(s, "{value}");
            }
            ExprKind::StrLit { bytes } => {
                let _ = write!(s, "\"{}\"", String::from_utf8_lossy(bytes));
            }
            ExprKind::ArrayLit { .. } => s.push_str("array literal"),
            ExprKind::Id { name: n, .. } => s.push_str(name(*n)),
            ExprKind::Ns(ns) => match (&ns.pkg_path, ns.name) {
                (Some(p), _) => {
                    let _ = write!(s, "package \"{p}\"");
                }
                (None, Some(n)) => s.push_str(name(n)),
                (None, None) => s.push_str("namespace"),
            },
            ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l) => {
                s.push_str(name(l.name));
            }
            ExprKind::Member { recv, name: n, .. } => {
                write_node(s, ast, interner, *recv, depth + 1);
                s.push('.');
                s.push_str(name(*n));
            }
            ExprKind::Subscript { recv, index, .. } => {
                write_node(s, ast, interner, *recv, depth + 1);
                s.push('[');
                write_node(s, ast, interner, *index, depth + 1);
                s.push(']');
            }
            ExprKind::Prefix { op, expr } => {
                let _ = write!(s, "{op}");
                write_node(s, ast, interner, *expr, depth + 1);
            }
            ExprKind::Postfix { op, expr } => {
                write_node(s, ast, interner, *expr, depth + 1);
                let _ = write!(s, "{op}");
            }
            ExprKind::Deref { expr } => {
                s.push('*');
                write_node(s, ast, interner, *expr, depth + 1);
            }
            ExprKind::Binary { op, lhs, rhs } | ExprKind::Assign { op, lhs, rhs } => {
                write_node(s, ast, interner, *lhs, depth + 1);
                let _ = write!(s, " {op} ");
                write_node(s, ast, interner, *rhs, depth + 1);
            }
            ExprKind::If { .. } => s.push_str("if"),
            ExprKind::Return { .. } => s.push_str("return"),
            ExprKind::Call { recv, .. } => {
                write_node(s, ast, interner, *recv, depth + 1);
                s.push_str("(…)");
            }
            ExprKind::TypeCons { .. } => {
                write_node(s, ast, interner, e.ty, depth + 1);
                s.push_str("(…)");
            }
            ExprKind::Block { .. } => s.push_str("{…}"),
            ExprKind::Fun(f) => match f.name {
                Some(n) => {
                    let _ = write!(s, "function {}", name(n));
                }
                None => s.push_str("function"),
            },
        },
        NodeKind::Type(t) => match &t.kind {
            TypeKind::Void => s.push_str("void"),
            TypeKind::Bool => s.push_str("bool"),
            TypeKind::I8 => s.push_str("i8"),
            TypeKind::I16 => s.push_str("i16"),
            TypeKind::I32 => s.push_str("i32"),
            TypeKind::I64 => s.push_str("i64"),
            TypeKind::Int => s.push_str("int"),
            TypeKind::U8 => s.push_str("u8"),
            TypeKind::U16 => s.push_str("u16"),
            TypeKind::U32 => s.push_str("u32"),
            TypeKind::U64 => s.push_str("u64"),
            TypeKind::Uint => s.push_str("uint"),
            TypeKind::F32 => s.push_str("f32"),
            TypeKind::F64 => s.push_str("f64"),
            TypeKind::Unknown => s.push_str("unknown"),
            TypeKind::Array { elem, len, .. } => {
                s.push('[');
                write_node(s, ast, interner, *elem, depth + 1);
                if *len > 0 {
                    let _ = write!(s, " {len}");
                }
                s.push(']');
            }
            TypeKind::Fun { params, result } => {
                s.push_str("fun(");
                for (i, &p) in params.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    write_node(s, ast, interner, ast.expr_ty(p), depth + 1);
                }
                s.push(')');
                if *result != NodeId::VOID {
                    s.push(' ');
                    write_node(s, ast, interner, *result, depth + 1);
                }
            }
            TypeKind::Ptr { elem } => {
                s.push('*');
                write_node(s, ast, interner, *elem, depth + 1);
            }
            TypeKind::Ref { elem } => {
                s.push('&');
                write_node(s, ast, interner, *elem, depth + 1);
            }
            TypeKind::MutRef { elem } => {
                s.push_str("mut&");
                write_node(s, ast, interner, *elem, depth + 1);
            }
            TypeKind::Slice { elem } => {
                s.push_str("&[");
                write_node(s, ast, interner, *elem, depth + 1);
                s.push(']');
            }
            TypeKind::MutSlice { elem } => {
                s.push_str("mut&[");
                write_node(s, ast, interner, *elem, depth + 1);
                s.push(']');
            }
            TypeKind::Optional { elem } => {
                s.push('?');
                write_node(s, ast, interner, *elem, depth + 1);
            }
            TypeKind::Struct(st) => match st.name {
                Some(n) => s.push_str(name(n)),
                None => s.push_str("struct"),
            },
            TypeKind::Alias(at) => s.push_str(name(at.name)),
            TypeKind::Ns => s.push_str("namespace"),
            TypeKind::Placeholder { param } => write_node(s, ast, interner, *param, depth + 1),
            TypeKind::Template { recv, args } => {
                write_node(s, ast, interner, *recv, depth + 1);
                s.push('<');
                for (i, &a) in args.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    write_node(s, ast, interner, a, depth + 1);
                }
                s.push('>');
            }
            TypeKind::Unresolved { name: n, .. } => s.push_str(name(*n)),
        },
    }
}
