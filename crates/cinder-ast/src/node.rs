//! AST node definitions.
//!
//! Every node shares a small header ([`Node`]) and carries a family payload
//! ([`NodeKind`]). Expressions additionally carry their type
//! ([`ExprData::ty`], initially [`crate::NodeId::UNKNOWN`] until checked);
//! types carry size, alignment and a cached structural id
//! ([`TypeData`]).
//!
//! Nodes reference each other through [`crate::NodeId`] arena indices, so
//! back-edges (an identifier's resolved target, a member's target, an
//! unresolved type's resolution) are plain non-owning ids and cycles cannot
//! leak.

use cinder_common::interner::Atom;
use cinder_common::srcloc::SrcLoc;

use crate::NodeId;
use crate::flags::NodeFlags;
use crate::ops::Op;

/// Shared node header plus the family payload.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    pub loc: SrcLoc,
    /// Number of uses (expressions and user types).
    pub nuse: u32,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// One source file's worth of declarations.
    Unit(UnitData),
    Import(ImportData),
    /// `type Name ...` declaration wrapping a struct or alias type.
    TypeDef { ty: NodeId },
    /// A template parameter declaration, e.g. `T` in `type Foo<T>`.
    /// Not a type itself; placeholders point at it.
    TemplateParam { name: Atom, default: Option<NodeId> },
    Expr(ExprData),
    Type(TypeData),
}

#[derive(Clone, Debug, Default)]
pub struct UnitData {
    pub children: Vec<NodeId>,
    pub imports: Vec<NodeId>,
}

/// `import a, b as c from "path"` or `import "path" as ns`.
#[derive(Clone, Debug)]
pub struct ImportData {
    pub path: String,
    pub path_loc: SrcLoc,
    /// Local namespace alias; `kw::UNDERSCORE` when absent.
    pub name: Atom,
    pub ids: Vec<ImportId>,
    /// The imported package's API namespace expression, resolved by the
    /// build driver before the checker runs.
    pub pkg_ns: Option<NodeId>,
}

/// One imported identifier. The name `_` denotes the `*` wildcard.
#[derive(Clone, Copy, Debug)]
pub struct ImportId {
    pub loc: SrcLoc,
    pub name: Atom,
    /// Original name when renamed, e.g. `y` in `import y as x from "p"`.
    pub orig_name: Option<Atom>,
}

// ---------------------------------------------------------------------------
// expressions

#[derive(Clone, Debug)]
pub struct ExprData {
    /// The expression's type. [`crate::NodeId::UNKNOWN`] until checked.
    pub ty: NodeId,
    pub kind: ExprKind,
}

/// Payload shared by field, parameter, `var` and `let` nodes.
#[derive(Clone, Debug)]
pub struct Local {
    pub name: Atom,
    pub name_loc: SrcLoc,
    pub init: Option<NodeId>,
    /// Parameter only: the special `this` parameter.
    pub is_this: bool,
    /// Parameter only: `this` is declared `mut`.
    pub is_mut: bool,
    /// Field only: memory offset in bytes, set during struct layout.
    pub offset: u64,
}

#[derive(Clone, Debug)]
pub struct NsData {
    pub name: Option<Atom>,
    pub members: Vec<NodeId>,
    pub member_names: Vec<Atom>,
    /// Import path of the package this namespace represents, when `PKG_NS`.
    pub pkg_path: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FunData {
    pub name: Option<Atom>,
    pub name_loc: SrcLoc,
    /// `None` for prototypes.
    pub body: Option<NodeId>,
    /// Receiver type for type functions (the type of `this`).
    pub recv_type: Option<NodeId>,
    pub result_loc: SrcLoc,
    /// Enclosing namespace node, assigned by the checker.
    pub ns_parent: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    BoolLit { value: bool },
    IntLit { value: u64 },
    FloatLit { value: f64 },
    StrLit { bytes: Vec<u8> },
    ArrayLit { values: Vec<NodeId>, end_loc: SrcLoc },
    /// Identifier reference; `target` is filled by name resolution.
    Id { name: Atom, target: Option<NodeId> },
    Ns(NsData),
    Field(Local),
    Param(Local),
    Var(Local),
    Let(Local),
    /// `x.y`; `target` is filled by member resolution.
    Member { recv: NodeId, name: Atom, target: Option<NodeId> },
    /// `x[i]`; `index_val` is valid when the index is comptime-constant.
    Subscript { recv: NodeId, index: NodeId, index_val: u64, end_loc: SrcLoc },
    Prefix { op: Op, expr: NodeId },
    Postfix { op: Op, expr: NodeId },
    /// Implicit read through a reference, inserted by the checker.
    Deref { expr: NodeId },
    Binary { op: Op, lhs: NodeId, rhs: NodeId },
    Assign { op: Op, lhs: NodeId, rhs: NodeId },
    If { cond: NodeId, then_block: NodeId, else_block: Option<NodeId> },
    Return { value: Option<NodeId> },
    Call { recv: NodeId, args: Vec<NodeId>, args_end: SrcLoc },
    /// Construction of the expression's type; rewritten in place from a
    /// call whose receiver names a type.
    TypeCons { args: Vec<NodeId> },
    Block { children: Vec<NodeId>, end_loc: SrcLoc },
    Fun(FunData),
}

// ---------------------------------------------------------------------------
// types

#[derive(Clone, Debug)]
pub struct TypeData {
    pub size: u64,
    pub align: u32,
    /// Cached structural id. Invalidated when template expansion rewrites
    /// children.
    pub typeid: Option<Box<[u8]>>,
    pub kind: TypeKind,
}

#[derive(Clone, Debug)]
pub struct StructType {
    pub name: Option<Atom>,
    /// Field locals in declaration order.
    pub fields: Vec<NodeId>,
    pub ns_parent: Option<NodeId>,
    /// Template parameters of a template; the argument vector of an
    /// instance.
    pub template_params: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct AliasType {
    pub name: Atom,
    pub elem: NodeId,
    pub ns_parent: Option<NodeId>,
    pub template_params: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    // primitives; seeded once per arena and always checked
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Int,
    U8,
    U16,
    U32,
    U64,
    Uint,
    F32,
    F64,
    Unknown,
    // user types
    Array { elem: NodeId, len: u64, len_expr: Option<NodeId>, end_loc: SrcLoc },
    Fun { params: Vec<NodeId>, result: NodeId },
    Ptr { elem: NodeId },
    Ref { elem: NodeId },
    MutRef { elem: NodeId },
    Slice { elem: NodeId },
    MutSlice { elem: NodeId },
    Optional { elem: NodeId },
    Struct(StructType),
    Alias(AliasType),
    /// Marker type of namespace expressions.
    Ns,
    /// A template parameter occurrence inside a template body.
    Placeholder { param: NodeId },
    /// Use of a template, e.g. `Foo<int>`. Replaced by the instance.
    Template { recv: NodeId, args: Vec<NodeId> },
    /// A named type that has not been resolved yet.
    Unresolved { name: Atom, resolved: Option<NodeId> },
}

impl TypeKind {
    pub fn is_prim(&self) -> bool {
        matches!(
            self,
            TypeKind::Void
                | TypeKind::Bool
                | TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::Int
                | TypeKind::U8
                | TypeKind::U16
                | TypeKind::U32
                | TypeKind::U64
                | TypeKind::Uint
                | TypeKind::F32
                | TypeKind::F64
                | TypeKind::Unknown
        )
    }

    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, TypeKind::U8 | TypeKind::U16 | TypeKind::U32 | TypeKind::U64 | TypeKind::Uint)
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(self, TypeKind::I8 | TypeKind::I16 | TypeKind::I32 | TypeKind::I64 | TypeKind::Int)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TypeKind::F32 | TypeKind::F64)
    }

    /// `&T` or `mut&T`.
    pub fn is_ref(&self) -> bool {
        matches!(self, TypeKind::Ref { .. } | TypeKind::MutRef { .. })
    }

    /// `*T`, `&T` or `mut&T`.
    pub fn is_ptr_like(&self) -> bool {
        matches!(self, TypeKind::Ptr { .. } | TypeKind::Ref { .. } | TypeKind::MutRef { .. })
    }

    /// `&[T]` or `mut&[T]`.
    pub fn is_slice(&self) -> bool {
        matches!(self, TypeKind::Slice { .. } | TypeKind::MutSlice { .. })
    }

    /// Reference or slice of either mutability.
    pub fn is_ref_like(&self) -> bool {
        self.is_ref() || self.is_slice()
    }
}

impl Node {
    pub fn is_expr(&self) -> bool {
        matches!(self.kind, NodeKind::Expr(_))
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, NodeKind::Type(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Expr(ExprData {
                kind: ExprKind::Field(_) | ExprKind::Param(_) | ExprKind::Var(_) | ExprKind::Let(_),
                ..
            })
        )
    }

    /// `var` or `let`.
    pub fn is_var_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Expr(ExprData { kind: ExprKind::Var(_) | ExprKind::Let(_), .. })
        )
    }

    pub fn local(&self) -> Option<&Local> {
        match &self.kind {
            NodeKind::Expr(ExprData {
                kind: ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l),
                ..
            }) => Some(l),
            _ => None,
        }
    }

    pub fn local_mut(&mut self) -> Option<&mut Local> {
        match &mut self.kind {
            NodeKind::Expr(ExprData {
                kind: ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l),
                ..
            }) => Some(l),
            _ => None,
        }
    }
}
