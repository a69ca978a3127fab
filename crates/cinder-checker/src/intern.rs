//! Structural type ids and user-type interning.
//!
//! A type id is a canonical byte string derived from a type's kind and its
//! recursive components. It keys the interning map (so structural equality
//! of user types implies id equality) and the template-instance
//! memoization map. Ids are cached on the type node; template expansion
//! scrubs the cache when it rewrites children.

use cinder_ast::{NodeArena, NodeId, NodeKind, TypeKind};
use cinder_common::interner::Interner;
use tracing::trace;

use crate::context::Checker;

fn tag(kind: &TypeKind) -> u8 {
    match kind {
        TypeKind::Void => b'A',
        TypeKind::Bool => b'B',
        TypeKind::I8 => b'C',
        TypeKind::I16 => b'D',
        TypeKind::I32 => b'E',
        TypeKind::I64 => b'F',
        TypeKind::Int => b'G',
        TypeKind::U8 => b'H',
        TypeKind::U16 => b'I',
        TypeKind::U32 => b'J',
        TypeKind::U64 => b'K',
        TypeKind::Uint => b'L',
        TypeKind::F32 => b'M',
        TypeKind::F64 => b'N',
        TypeKind::Unknown => b'O',
        TypeKind::Array { .. } => b'P',
        TypeKind::Fun { .. } => b'Q',
        TypeKind::Ptr { .. } => b'R',
        TypeKind::Ref { .. } => b'S',
        TypeKind::MutRef { .. } => b'T',
        TypeKind::Slice { .. } => b'U',
        TypeKind::MutSlice { .. } => b'V',
        TypeKind::Optional { .. } => b'W',
        TypeKind::Struct(_) => b'X',
        TypeKind::Alias(_) => b'Y',
        TypeKind::Ns => b'Z',
        TypeKind::Placeholder { .. } => b'p',
        TypeKind::Template { .. } => b't',
        TypeKind::Unresolved { .. } => b'u',
    }
}

/// Compute (and cache) the structural id of type `t`.
pub fn typeid_of(ast: &mut NodeArena, interner: &Interner, t: NodeId) -> Box<[u8]> {
    if let Some(td) = ast.type_data(t)
        && let Some(id) = &td.typeid
    {
        return id.clone();
    }
    let mut buf = Vec::new();
    write_typeid(ast, interner, t, &mut buf);
    let id: Box<[u8]> = buf.into();
    if let Some(td) = ast.type_data_mut(t) {
        td.typeid = Some(id.clone());
    }
    id
}

fn write_typeid(ast: &mut NodeArena, interner: &Interner, t: NodeId, out: &mut Vec<u8>) {
    let Some(td) = ast.type_data(t) else {
        // not a type; unique non-colliding key
        out.push(b'!');
        out.extend_from_slice(&t.0.to_le_bytes());
        return;
    };
    if let Some(id) = &td.typeid {
        out.extend_from_slice(id);
        return;
    }
    out.push(tag(&td.kind));
    match td.kind.clone() {
        k if k.is_prim() => {}
        TypeKind::Ns => {}
        TypeKind::Array { elem, len, .. } => {
            out.extend_from_slice(&len.to_le_bytes());
            write_typeid(ast, interner, elem, out);
        }
        TypeKind::Fun { params, result } => {
            out.extend_from_slice(&(params.len() as u32).to_le_bytes());
            for p in params {
                // the receiver parameter is ABI-visible
                let is_this = ast.node(p).local().is_some_and(|l| l.is_this);
                out.push(if is_this { b'@' } else { b'.' });
                let pt = ast.expr_ty(p);
                write_typeid(ast, interner, pt, out);
            }
            write_typeid(ast, interner, result, out);
        }
        TypeKind::Ptr { elem }
        | TypeKind::Ref { elem }
        | TypeKind::MutRef { elem }
        | TypeKind::Slice { elem }
        | TypeKind::MutSlice { elem }
        | TypeKind::Optional { elem } => write_typeid(ast, interner, elem, out),
        TypeKind::Struct(st) => {
            if let Some(name) = st.name {
                out.extend_from_slice(interner.resolve(name).as_bytes());
            }
            out.push(b';');
            for f in st.fields {
                if let Some(l) = ast.node(f).local() {
                    out.extend_from_slice(interner.resolve(l.name).as_bytes());
                }
                out.push(b':');
                let ft = ast.expr_ty(f);
                write_typeid(ast, interner, ft, out);
                out.push(b';');
            }
        }
        TypeKind::Alias(at) => {
            out.extend_from_slice(interner.resolve(at.name).as_bytes());
            out.push(b';');
            write_typeid(ast, interner, at.elem, out);
        }
        TypeKind::Placeholder { param } | TypeKind::Template { recv: param, .. } => {
            // unexpanded template machinery is identified by node identity
            out.extend_from_slice(&param.0.to_le_bytes());
            out.extend_from_slice(&t.0.to_le_bytes());
        }
        TypeKind::Unresolved { .. } => {
            out.extend_from_slice(&t.0.to_le_bytes());
        }
        _ => {}
    }
}

impl Checker<'_> {
    pub(crate) fn typeid(&mut self, t: NodeId) -> Box<[u8]> {
        typeid_of(self.ast, &self.compiler.interner, t)
    }

    /// Intern user type `t`: if a structurally identical type exists, return
    /// its canonical node and false; otherwise register `t` and return true.
    /// Callers replace their slot with the returned id.
    pub(crate) fn intern_usertype(&mut self, t: NodeId) -> (NodeId, bool) {
        debug_assert!(matches!(&self.ast.node(t).kind, NodeKind::Type(td) if !td.kind.is_prim()));

        let typeid = self.typeid(t);
        if let Some(&canonical) = self.typeid_map.get(&typeid) {
            if canonical != t {
                trace!(ty = %self.fmt(canonical), "interned type dedup");
            }
            return (canonical, false);
        }
        trace!(ty = %self.fmt(t), "interned type add");
        self.typeid_map.insert(typeid, t);
        (t, true)
    }
}
