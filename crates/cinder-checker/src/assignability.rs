//! Type relations: compatibility, assignability, equivalence and
//! convertibility, plus the per-type operator support table.
//!
//! - compatible:  a value of type x can be read as type y or vice versa
//!   (e.g. `x + y`)
//! - assignable:  a value of type y can be assigned to a target of type x
//! - equivalent:  x and y are the same type modulo aliases and native
//!   int/uint canonicalization
//! - convertible: a value of type src can be converted to type dst
//!
//! Once both sides are fully checked, user types are interned, so most of
//! these relations bottom out in id equality.

use cinder_ast::{NodeFlags, NodeId, Op, TypeKind};

use crate::context::Checker;

impl Checker<'_> {
    /// Unwrap aliases, e.g. `MyMyT` => `MyT` => `T`.
    pub fn unwrap_alias(&self, mut t: NodeId) -> NodeId {
        while let Some(TypeKind::Alias(at)) = self.ast.type_kind(t) {
            t = at.elem;
        }
        t
    }

    /// Unwrap optional, ref and ptr, e.g. `?&T` => `&T` => `T`.
    pub fn unwrap_ptr(&self, mut t: NodeId) -> NodeId {
        loop {
            match self.ast.type_kind(t) {
                Some(
                    TypeKind::Optional { elem }
                    | TypeKind::Ptr { elem }
                    | TypeKind::Ref { elem }
                    | TypeKind::MutRef { elem },
                ) => t = *elem,
                _ => return t,
            }
        }
    }

    /// Unwrap ref, ptr and alias, e.g. `&MyT` => `MyT` => `T`.
    pub fn unwrap_ptr_and_alias(&self, mut t: NodeId) -> NodeId {
        loop {
            match self.ast.type_kind(t) {
                Some(TypeKind::Ptr { elem } | TypeKind::Ref { elem } | TypeKind::MutRef { elem }) => {
                    t = *elem;
                }
                Some(TypeKind::Alias(at)) => t = at.elem,
                _ => return t,
            }
        }
    }

    /// Unwrap aliases and canonicalize native int/uint to their concrete
    /// fixed-width types.
    pub fn concrete(&self, mut t: NodeId) -> NodeId {
        loop {
            match self.ast.type_kind(t) {
                Some(TypeKind::Alias(at)) => t = at.elem,
                Some(TypeKind::Int) => t = self.compiler.int_type,
                Some(TypeKind::Uint) => t = self.compiler.uint_type,
                _ => return t,
            }
        }
    }

    /// A type owns resources if it has a drop function, contains owners,
    /// is a raw pointer, or aliases such a type.
    pub fn is_owner(&self, t: NodeId) -> bool {
        let t = match self.ast.type_kind(t) {
            Some(TypeKind::Optional { elem }) => *elem,
            _ => t,
        };
        if self.ast.flags(t).intersects(NodeFlags::DROP | NodeFlags::SUBOWNERS) {
            return true;
        }
        match self.ast.type_kind(t) {
            Some(TypeKind::Ptr { .. }) => true,
            Some(TypeKind::Alias(at)) => self.is_owner(at.elem),
            _ => false,
        }
    }

    fn compat_unwrap(&self, mut t: NodeId, mut may_deref: bool) -> NodeId {
        loop {
            match self.ast.type_kind(t) {
                Some(TypeKind::Alias(at)) => t = at.elem,
                Some(TypeKind::Int) => t = self.compiler.int_type,
                Some(TypeKind::Uint) => t = self.compiler.uint_type,
                Some(TypeKind::Ref { elem } | TypeKind::MutRef { elem }) if may_deref => {
                    may_deref = false;
                    t = *elem;
                }
                _ => return t,
            }
        }
    }

    pub fn is_assignable(&self, x: NodeId, y: NodeId) -> bool {
        x == y || self.type_compat(x, y, true)
    }

    pub fn is_compatible(&self, x: NodeId, y: NodeId) -> bool {
        x == y || self.type_compat(x, y, false)
    }

    pub fn is_equivalent(&self, x: NodeId, y: NodeId) -> bool {
        x == y || self.concrete(x) == self.concrete(y)
    }

    pub fn is_convertible(&self, dst: NodeId, src: NodeId) -> bool {
        let mut dst = self.unwrap_alias(dst);
        let mut src = self.unwrap_alias(src);
        if let Some(TypeKind::Ref { elem } | TypeKind::MutRef { elem }) = self.ast.type_kind(dst) {
            dst = *elem;
        }
        if let Some(TypeKind::Ref { elem } | TypeKind::MutRef { elem }) = self.ast.type_kind(src) {
            src = *elem;
        }
        if dst == src {
            return true;
        }
        let dst_prim = self.ast.type_kind(dst).is_some_and(|k| k.is_prim());
        let src_prim = self.ast.type_kind(src).is_some_and(|k| k.is_prim());
        dst_prim && src_prim
    }

    fn type_compat(&self, x: NodeId, y: NodeId, assignment: bool) -> bool {
        let x = self.compat_unwrap(x, !assignment);
        let y = self.compat_unwrap(y, !assignment);

        if x == y {
            return true;
        }

        let Some(xk) = self.ast.type_kind(x) else { return false };

        match xk {
            TypeKind::I8
            | TypeKind::I16
            | TypeKind::I32
            | TypeKind::I64
            | TypeKind::U8
            | TypeKind::U16
            | TypeKind::U32
            | TypeKind::U64 => {
                // reading a non-owning value through a reference is allowed,
                // e.g. "var y &int; var x int = y"
                let y = if assignment { self.compat_unwrap(y, true) } else { y };
                x == y
            }

            TypeKind::Struct(_) => {
                let y = if assignment { self.compat_unwrap(y, true) } else { y };
                x == y && !self.is_owner(x)
            }

            TypeKind::Ptr { elem: xe } => match self.ast.type_kind(y) {
                Some(
                    TypeKind::Ptr { elem: ye }
                    | TypeKind::Ref { elem: ye }
                    | TypeKind::MutRef { elem: ye },
                ) => self.is_compat_inner(*xe, *ye, assignment),
                _ => false,
            },

            TypeKind::Optional { elem: xe } => {
                // ?T <= T and ?T <= ?T
                let y = match self.ast.type_kind(y) {
                    Some(TypeKind::Optional { elem: ye }) => *ye,
                    _ => y,
                };
                self.is_compat_inner(*xe, y, assignment)
            }

            TypeKind::Ref { elem: xe } | TypeKind::MutRef { elem: xe } => {
                let l_mut = matches!(xk, TypeKind::MutRef { .. });
                match self.ast.type_kind(y) {
                    // e.g. "&T <= *T"
                    Some(TypeKind::Ptr { elem: ye }) => self.is_compat_inner(*xe, *ye, assignment),
                    Some(TypeKind::Ref { elem: ye }) => {
                        // &T <= &T, but mut&T x= &T
                        !l_mut && self.is_compat_inner(*xe, *ye, assignment)
                    }
                    Some(TypeKind::MutRef { elem: ye }) => {
                        // &T <= mut&T, mut&T <= mut&T
                        self.is_compat_inner(*xe, *ye, assignment)
                    }
                    _ => false,
                }
            }

            TypeKind::Slice { elem: xe } | TypeKind::MutSlice { elem: xe } => {
                let l_mut = matches!(xk, TypeKind::MutSlice { .. });
                match self.ast.type_kind(y) {
                    Some(TypeKind::Slice { elem: ye }) => {
                        !l_mut && self.is_compat_inner(*xe, *ye, assignment)
                    }
                    Some(TypeKind::MutSlice { elem: ye }) => {
                        self.is_compat_inner(*xe, *ye, assignment)
                    }
                    Some(TypeKind::Ref { elem: ye } | TypeKind::MutRef { elem: ye }) => {
                        // &[T] <= &[T N] via a reference to a sized array
                        let r_mut = matches!(self.ast.type_kind(y), Some(TypeKind::MutRef { .. }));
                        match self.ast.type_kind(*ye) {
                            Some(TypeKind::Array { elem: ae, .. }) => {
                                (!l_mut || r_mut) && self.is_compat_inner(*xe, *ae, assignment)
                            }
                            _ => false,
                        }
                    }
                    _ => false,
                }
            }

            TypeKind::Array { elem: xe, len: xlen, .. } => match self.ast.type_kind(y) {
                Some(TypeKind::Array { elem: ye, len: ylen, .. }) => {
                    xlen == ylen && self.is_compat_inner(*xe, *ye, assignment)
                }
                _ => false,
            },

            _ => false,
        }
    }

    fn is_compat_inner(&self, x: NodeId, y: NodeId, assignment: bool) -> bool {
        x == y || self.type_compat(x, y, assignment)
    }

    /// Whether `op` is supported on values of type `t`.
    pub fn type_has_binop(&self, t: NodeId, op: Op) -> bool {
        let t = self.concrete(t);
        let Some(kind) = self.ast.type_kind(t) else { return op == Op::Assign };
        match kind {
            TypeKind::Bool | TypeKind::Optional { .. } => {
                matches!(op, Op::LAnd | Op::LOr | Op::Eq | Op::NotEq | Op::Assign)
            }
            k if k.is_signed_int() || k.is_unsigned_int() => matches!(
                op,
                Op::Add
                    | Op::Sub
                    | Op::Mul
                    | Op::Div
                    | Op::Mod
                    | Op::And
                    | Op::Or
                    | Op::Xor
                    | Op::Shl
                    | Op::Shr
                    | Op::LAnd
                    | Op::LOr
                    | Op::Eq
                    | Op::NotEq
                    | Op::Lt
                    | Op::Gt
                    | Op::LtEq
                    | Op::GtEq
                    | Op::Assign
                    | Op::AddAssign
                    | Op::SubAssign
                    | Op::MulAssign
                    | Op::DivAssign
                    | Op::ModAssign
                    | Op::AndAssign
                    | Op::OrAssign
                    | Op::XorAssign
                    | Op::ShlAssign
                    | Op::ShrAssign
            ),
            TypeKind::F32 | TypeKind::F64 => matches!(
                op,
                Op::Add
                    | Op::Sub
                    | Op::Mul
                    | Op::Div
                    | Op::Mod
                    | Op::LAnd
                    | Op::LOr
                    | Op::Eq
                    | Op::NotEq
                    | Op::Lt
                    | Op::Gt
                    | Op::LtEq
                    | Op::GtEq
                    | Op::Assign
                    | Op::AddAssign
                    | Op::SubAssign
                    | Op::MulAssign
                    | Op::DivAssign
                    | Op::ModAssign
            ),
            TypeKind::Struct(_) => matches!(op, Op::Eq | Op::NotEq | Op::Assign),
            TypeKind::Ref { .. } | TypeKind::Ptr { .. } => {
                matches!(op, Op::Eq | Op::NotEq | Op::Assign)
            }
            _ => op == Op::Assign,
        }
    }
}
