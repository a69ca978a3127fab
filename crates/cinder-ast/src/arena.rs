//! The node arena.
//!
//! All AST nodes of a compilation live in one [`NodeArena`] and reference
//! each other by [`NodeId`]. Nodes are never freed individually; the arena
//! is dropped wholesale after code generation.
//!
//! The first slots are pre-seeded with the singleton primitive types, so
//! `NodeId::BOOL` and friends are valid in every arena and type identity of
//! primitives is id identity.

use cinder_common::interner::Atom;
use cinder_common::options::TargetInfo;
use cinder_common::srcloc::SrcLoc;
use smallvec::SmallVec;

use crate::flags::NodeFlags;
use crate::node::{
    AliasType, ExprData, ExprKind, FunData, ImportData, Local, Node, NodeKind, NsData, StructType,
    TypeData, TypeKind, UnitData,
};
use crate::ops::Op;

/// Index of a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const VOID: NodeId = NodeId(0);
    pub const BOOL: NodeId = NodeId(1);
    pub const I8: NodeId = NodeId(2);
    pub const I16: NodeId = NodeId(3);
    pub const I32: NodeId = NodeId(4);
    pub const I64: NodeId = NodeId(5);
    pub const INT: NodeId = NodeId(6);
    pub const U8: NodeId = NodeId(7);
    pub const U16: NodeId = NodeId(8);
    pub const U32: NodeId = NodeId(9);
    pub const U64: NodeId = NodeId(10);
    pub const UINT: NodeId = NodeId(11);
    pub const F32: NodeId = NodeId(12);
    pub const F64: NodeId = NodeId(13);
    pub const UNKNOWN: NodeId = NodeId(14);
    /// Marker type of namespace expressions.
    pub const NS: NodeId = NodeId(15);

    const FIRST_FREE: u32 = 16;
}

#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    target: TargetInfo,
}

impl NodeArena {
    pub fn new(target: TargetInfo) -> Self {
        let mut arena = NodeArena { nodes: Vec::with_capacity(64), target };
        let int = target.int_size;
        // order must match the NodeId constants above
        arena.seed_prim(TypeKind::Void, 0);
        arena.seed_prim(TypeKind::Bool, 1);
        arena.seed_prim(TypeKind::I8, 1);
        arena.seed_prim(TypeKind::I16, 2);
        arena.seed_prim(TypeKind::I32, 4);
        arena.seed_prim(TypeKind::I64, 8);
        arena.seed_prim(TypeKind::Int, int as u64);
        arena.seed_prim(TypeKind::U8, 1);
        arena.seed_prim(TypeKind::U16, 2);
        arena.seed_prim(TypeKind::U32, 4);
        arena.seed_prim(TypeKind::U64, 8);
        arena.seed_prim(TypeKind::Uint, int as u64);
        arena.seed_prim(TypeKind::F32, 4);
        arena.seed_prim(TypeKind::F64, 8);
        arena.seed_prim(TypeKind::Unknown, 0);
        arena.seed_prim(TypeKind::Ns, 0);
        debug_assert_eq!(arena.nodes.len() as u32, NodeId::FIRST_FREE);
        arena
    }

    fn seed_prim(&mut self, kind: TypeKind, size: u64) {
        self.nodes.push(Node {
            kind: NodeKind::Type(TypeData { size, align: size as u32, typeid: None, kind }),
            flags: NodeFlags::CHECKED,
            loc: SrcLoc::NONE,
            nuse: 0,
        });
    }

    pub fn target(&self) -> TargetInfo {
        self.target
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -----------------------------------------------------------------------
    // access

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.node(id).flags
    }

    pub fn add_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.node_mut(id).flags |= flags;
    }

    pub fn remove_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.node_mut(id).flags -= flags;
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::CHECKED)
    }

    pub fn is_expr(&self, id: NodeId) -> bool {
        self.node(id).is_expr()
    }

    pub fn is_type(&self, id: NodeId) -> bool {
        self.node(id).is_type()
    }

    pub fn expr_data(&self, id: NodeId) -> Option<&ExprData> {
        match &self.node(id).kind {
            NodeKind::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn expr_data_mut(&mut self, id: NodeId) -> Option<&mut ExprData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// The type of an expression; `NodeId::UNKNOWN` for non-expressions.
    pub fn expr_ty(&self, id: NodeId) -> NodeId {
        match &self.node(id).kind {
            NodeKind::Expr(e) => e.ty,
            _ => NodeId::UNKNOWN,
        }
    }

    pub fn set_expr_ty(&mut self, id: NodeId, ty: NodeId) {
        if let NodeKind::Expr(e) = &mut self.node_mut(id).kind {
            e.ty = ty;
        }
    }

    pub fn type_data(&self, id: NodeId) -> Option<&TypeData> {
        match &self.node(id).kind {
            NodeKind::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn type_data_mut(&mut self, id: NodeId) -> Option<&mut TypeData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn type_kind(&self, id: NodeId) -> Option<&TypeKind> {
        self.type_data(id).map(|t| &t.kind)
    }

    pub fn type_size(&self, id: NodeId) -> u64 {
        self.type_data(id).map_or(0, |t| t.size)
    }

    pub fn type_align(&self, id: NodeId) -> u32 {
        self.type_data(id).map_or(0, |t| t.align)
    }

    /// Bump the use count; identifiers forward the bump to their target.
    pub fn inc_use(&mut self, id: NodeId) {
        let mut id = id;
        loop {
            self.node_mut(id).nuse += 1;
            match &self.node(id).kind {
                NodeKind::Expr(ExprData { kind: ExprKind::Id { target: Some(t), .. }, .. }) => {
                    id = *t;
                }
                _ => return,
            }
        }
    }

    /// Follow identifier references to the referenced node.
    pub fn unwrap_id(&self, id: NodeId) -> NodeId {
        let mut id = id;
        while let NodeKind::Expr(ExprData { kind: ExprKind::Id { target: Some(t), .. }, .. }) =
            &self.node(id).kind
        {
            id = *t;
        }
        id
    }

    // -----------------------------------------------------------------------
    // allocation

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Shallow clone of a node into a fresh slot. Children are shared.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let node = self.node(id).clone();
        self.alloc(node)
    }

    fn bubble(&mut self, parent: NodeId, children: &[NodeId]) {
        let mut acc = NodeFlags::empty();
        for &c in children {
            acc |= self.flags(c) & NodeFlags::BUBBLE;
        }
        self.node_mut(parent).flags |= acc;
    }

    fn alloc_expr(&mut self, loc: SrcLoc, kind: ExprKind) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Expr(ExprData { ty: NodeId::UNKNOWN, kind }),
            flags: NodeFlags::empty(),
            loc,
            nuse: 0,
        })
    }

    fn alloc_type(&mut self, loc: SrcLoc, kind: TypeKind) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Type(TypeData { size: 0, align: 0, typeid: None, kind }),
            flags: NodeFlags::empty(),
            loc,
            nuse: 0,
        })
    }

    // -----------------------------------------------------------------------
    // parser-facing constructors
    //
    // These mirror what the parser produces: expressions begin with type
    // "unknown"; unresolved names carry the UNKNOWN flag, which bubbles to
    // parents the way the parser propagates it.

    pub fn mk_unit(&mut self) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Unit(UnitData::default()),
            flags: NodeFlags::empty(),
            loc: SrcLoc::NONE,
            nuse: 0,
        })
    }

    pub fn unit_add_child(&mut self, unit: NodeId, child: NodeId) {
        if let NodeKind::Unit(u) = &mut self.node_mut(unit).kind {
            u.children.push(child);
        }
    }

    pub fn unit_add_import(&mut self, unit: NodeId, import: NodeId) {
        if let NodeKind::Unit(u) = &mut self.node_mut(unit).kind {
            u.imports.push(import);
        }
    }

    pub fn mk_import(&mut self, loc: SrcLoc, data: ImportData) -> NodeId {
        self.alloc(Node { kind: NodeKind::Import(data), flags: NodeFlags::empty(), loc, nuse: 0 })
    }

    pub fn mk_typedef(&mut self, loc: SrcLoc, ty: NodeId) -> NodeId {
        let id = self.alloc(Node {
            kind: NodeKind::TypeDef { ty },
            flags: NodeFlags::empty(),
            loc,
            nuse: 0,
        });
        self.bubble(id, &[ty]);
        id
    }

    pub fn mk_template_param(&mut self, loc: SrcLoc, name: Atom, default: Option<NodeId>) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::TemplateParam { name, default },
            flags: NodeFlags::empty(),
            loc,
            nuse: 0,
        })
    }

    // expressions

    pub fn mk_bool_lit(&mut self, loc: SrcLoc, value: bool) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::BoolLit { value });
        self.set_expr_ty(id, NodeId::BOOL);
        self.add_flags(id, NodeFlags::CHECKED);
        id
    }

    pub fn mk_int_lit(&mut self, loc: SrcLoc, value: u64) -> NodeId {
        self.alloc_expr(loc, ExprKind::IntLit { value })
    }

    pub fn mk_float_lit(&mut self, loc: SrcLoc, value: f64) -> NodeId {
        self.alloc_expr(loc, ExprKind::FloatLit { value })
    }

    pub fn mk_str_lit(&mut self, loc: SrcLoc, bytes: Vec<u8>) -> NodeId {
        self.alloc_expr(loc, ExprKind::StrLit { bytes })
    }

    pub fn mk_array_lit(&mut self, loc: SrcLoc, values: Vec<NodeId>, end_loc: SrcLoc) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::ArrayLit { values: values.clone(), end_loc });
        self.bubble(id, &values);
        id
    }

    /// An identifier reference, unresolved until the checker runs.
    pub fn mk_id(&mut self, loc: SrcLoc, name: Atom) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Id { name, target: None });
        self.add_flags(id, NodeFlags::UNKNOWN);
        id
    }

    /// An identifier already resolved (e.g. by the parser within one file).
    pub fn mk_id_resolved(&mut self, loc: SrcLoc, name: Atom, target: NodeId) -> NodeId {
        self.alloc_expr(loc, ExprKind::Id { name, target: Some(target) })
    }

    pub fn mk_ns(&mut self, loc: SrcLoc, data: NsData, is_pkg: bool) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Ns(data));
        self.set_expr_ty(id, NodeId::NS);
        self.add_flags(id, NodeFlags::CHECKED);
        if is_pkg {
            self.add_flags(id, NodeFlags::PKG_NS);
        }
        id
    }

    fn mk_local(
        &mut self,
        loc: SrcLoc,
        name: Atom,
        ty: Option<NodeId>,
        init: Option<NodeId>,
        make: fn(Local) -> ExprKind,
    ) -> NodeId {
        let local = Local { name, name_loc: loc, init, is_this: false, is_mut: false, offset: 0 };
        let id = self.alloc_expr(loc, make(local));
        if let Some(t) = ty {
            self.set_expr_ty(id, t);
            self.bubble(id, &[t]);
        }
        if let Some(i) = init {
            self.add_flags(i, NodeFlags::RVALUE);
            self.bubble(id, &[i]);
        }
        id
    }

    pub fn mk_field(&mut self, loc: SrcLoc, name: Atom, ty: NodeId, init: Option<NodeId>) -> NodeId {
        self.mk_local(loc, name, Some(ty), init, ExprKind::Field)
    }

    pub fn mk_param(&mut self, loc: SrcLoc, name: Atom, ty: NodeId) -> NodeId {
        self.mk_local(loc, name, Some(ty), None, ExprKind::Param)
    }

    /// The special `this` parameter of a type function.
    pub fn mk_this_param(&mut self, loc: SrcLoc, recv_type: NodeId, is_mut: bool) -> NodeId {
        let id = self.mk_local(loc, cinder_common::kw::THIS, Some(recv_type), None, ExprKind::Param);
        if let Some(l) = self.node_mut(id).local_mut() {
            l.is_this = true;
            l.is_mut = is_mut;
        }
        id
    }

    /// A named argument in a call, e.g. `x: 3`.
    pub fn mk_named_arg(&mut self, loc: SrcLoc, name: Atom, value: NodeId) -> NodeId {
        self.mk_local(loc, name, None, Some(value), ExprKind::Param)
    }

    pub fn mk_var(&mut self, loc: SrcLoc, name: Atom, ty: Option<NodeId>, init: Option<NodeId>) -> NodeId {
        self.mk_local(loc, name, ty, init, ExprKind::Var)
    }

    pub fn mk_let(&mut self, loc: SrcLoc, name: Atom, ty: Option<NodeId>, init: Option<NodeId>) -> NodeId {
        self.mk_local(loc, name, ty, init, ExprKind::Let)
    }

    pub fn mk_member(&mut self, loc: SrcLoc, recv: NodeId, name: Atom) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Member { recv, name, target: None });
        self.bubble(id, &[recv]);
        id
    }

    pub fn mk_subscript(&mut self, loc: SrcLoc, recv: NodeId, index: NodeId, end_loc: SrcLoc) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Subscript { recv, index, index_val: 0, end_loc });
        self.bubble(id, &[recv, index]);
        id
    }

    pub fn mk_prefix(&mut self, loc: SrcLoc, op: Op, expr: NodeId) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Prefix { op, expr });
        self.bubble(id, &[expr]);
        id
    }

    pub fn mk_postfix(&mut self, loc: SrcLoc, op: Op, expr: NodeId) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Postfix { op, expr });
        self.bubble(id, &[expr]);
        id
    }

    pub fn mk_deref(&mut self, loc: SrcLoc, expr: NodeId) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Deref { expr });
        self.bubble(id, &[expr]);
        id
    }

    pub fn mk_binary(&mut self, loc: SrcLoc, op: Op, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Binary { op, lhs, rhs });
        self.bubble(id, &[lhs, rhs]);
        id
    }

    pub fn mk_assign(&mut self, loc: SrcLoc, op: Op, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.add_flags(rhs, NodeFlags::RVALUE);
        let id = self.alloc_expr(loc, ExprKind::Assign { op, lhs, rhs });
        self.bubble(id, &[lhs, rhs]);
        id
    }

    pub fn mk_if(&mut self, loc: SrcLoc, cond: NodeId, then_block: NodeId, else_block: Option<NodeId>) -> NodeId {
        // the condition is always an rvalue
        self.add_flags(cond, NodeFlags::RVALUE);
        let id = self.alloc_expr(loc, ExprKind::If { cond, then_block, else_block });
        self.bubble(id, &[cond, then_block]);
        if let Some(e) = else_block {
            self.bubble(id, &[e]);
        }
        id
    }

    pub fn mk_return(&mut self, loc: SrcLoc, value: Option<NodeId>) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Return { value });
        if let Some(v) = value {
            self.add_flags(v, NodeFlags::RVALUE);
            self.bubble(id, &[v]);
        }
        id
    }

    pub fn mk_call(&mut self, loc: SrcLoc, recv: NodeId, args: Vec<NodeId>, args_end: SrcLoc) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Call { recv, args: args.clone(), args_end });
        self.bubble(id, &[recv]);
        self.bubble(id, &args);
        id
    }

    pub fn mk_block(&mut self, loc: SrcLoc, children: Vec<NodeId>, end_loc: SrcLoc) -> NodeId {
        let id = self.alloc_expr(loc, ExprKind::Block { children: children.clone(), end_loc });
        self.bubble(id, &children);
        id
    }

    pub fn mk_fun(
        &mut self,
        loc: SrcLoc,
        name: Option<Atom>,
        fun_ty: NodeId,
        body: Option<NodeId>,
        recv_type: Option<NodeId>,
    ) -> NodeId {
        let data = FunData {
            name,
            name_loc: loc,
            body,
            recv_type,
            result_loc: SrcLoc::NONE,
            ns_parent: None,
        };
        let id = self.alloc_expr(loc, ExprKind::Fun(data));
        self.set_expr_ty(id, fun_ty);
        self.bubble(id, &[fun_ty]);
        if let Some(b) = body {
            self.bubble(id, &[b]);
        }
        id
    }

    // types

    pub fn mk_struct_type(
        &mut self,
        loc: SrcLoc,
        name: Option<Atom>,
        fields: Vec<NodeId>,
        template_params: Vec<NodeId>,
    ) -> NodeId {
        let is_template = !template_params.is_empty();
        let id = self.alloc_type(
            loc,
            TypeKind::Struct(StructType { name, fields: fields.clone(), ns_parent: None, template_params }),
        );
        self.bubble(id, &fields);
        if is_template {
            self.add_flags(id, NodeFlags::TEMPLATE);
        }
        id
    }

    pub fn mk_alias_type(
        &mut self,
        loc: SrcLoc,
        name: Atom,
        elem: NodeId,
        template_params: Vec<NodeId>,
    ) -> NodeId {
        let is_template = !template_params.is_empty();
        let id = self.alloc_type(
            loc,
            TypeKind::Alias(AliasType { name, elem, ns_parent: None, template_params }),
        );
        self.bubble(id, &[elem]);
        if is_template {
            self.add_flags(id, NodeFlags::TEMPLATE);
        }
        id
    }

    pub fn mk_array_type(&mut self, loc: SrcLoc, elem: NodeId, len_expr: Option<NodeId>) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Array { elem, len: 0, len_expr, end_loc: loc });
        self.bubble(id, &[elem]);
        id
    }

    pub fn mk_fun_type(&mut self, loc: SrcLoc, params: Vec<NodeId>, result: NodeId) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Fun { params: params.clone(), result });
        self.bubble(id, &params);
        self.bubble(id, &[result]);
        id
    }

    pub fn mk_ptr_type(&mut self, loc: SrcLoc, elem: NodeId) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Ptr { elem });
        self.bubble(id, &[elem]);
        id
    }

    pub fn mk_ref_type(&mut self, loc: SrcLoc, elem: NodeId, is_mut: bool) -> NodeId {
        let kind = if is_mut { TypeKind::MutRef { elem } } else { TypeKind::Ref { elem } };
        let id = self.alloc_type(loc, kind);
        self.bubble(id, &[elem]);
        id
    }

    pub fn mk_slice_type(&mut self, loc: SrcLoc, elem: NodeId, is_mut: bool) -> NodeId {
        let kind = if is_mut { TypeKind::MutSlice { elem } } else { TypeKind::Slice { elem } };
        let id = self.alloc_type(loc, kind);
        self.bubble(id, &[elem]);
        id
    }

    pub fn mk_optional_type(&mut self, loc: SrcLoc, elem: NodeId) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Optional { elem });
        self.bubble(id, &[elem]);
        id
    }

    pub fn mk_unresolved_type(&mut self, loc: SrcLoc, name: Atom) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Unresolved { name, resolved: None });
        self.add_flags(id, NodeFlags::UNKNOWN);
        id
    }

    pub fn mk_placeholder_type(&mut self, loc: SrcLoc, param: NodeId) -> NodeId {
        self.alloc_type(loc, TypeKind::Placeholder { param })
    }

    /// Use of a template, e.g. `Foo<int>`.
    pub fn mk_template_type(&mut self, loc: SrcLoc, recv: NodeId, args: Vec<NodeId>) -> NodeId {
        let id = self.alloc_type(loc, TypeKind::Template { recv, args: args.clone() });
        self.bubble(id, &[recv]);
        self.bubble(id, &args);
        id
    }

    // -----------------------------------------------------------------------
    // traversal

    /// The child node ids of `id`, excluding expression types and back-edges
    /// (identifier targets, unresolved-type resolutions).
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut out = SmallVec::new();
        match &self.node(id).kind {
            NodeKind::Unit(u) => {
                out.extend(u.imports.iter().copied());
                out.extend(u.children.iter().copied());
            }
            NodeKind::Import(_) => {}
            NodeKind::TypeDef { ty } => out.push(*ty),
            NodeKind::TemplateParam { default, .. } => out.extend(default.iter().copied()),
            NodeKind::Expr(e) => match &e.kind {
                ExprKind::BoolLit { .. }
                | ExprKind::IntLit { .. }
                | ExprKind::FloatLit { .. }
                | ExprKind::StrLit { .. }
                | ExprKind::Id { .. } => {}
                ExprKind::ArrayLit { values, .. } => out.extend(values.iter().copied()),
                ExprKind::Ns(ns) => out.extend(ns.members.iter().copied()),
                ExprKind::Field(l) | ExprKind::Param(l) | ExprKind::Var(l) | ExprKind::Let(l) => {
                    out.extend(l.init.iter().copied());
                }
                ExprKind::Member { recv, .. } => out.push(*recv),
                ExprKind::Subscript { recv, index, .. } => {
                    out.push(*recv);
                    out.push(*index);
                }
                ExprKind::Prefix { expr, .. }
                | ExprKind::Postfix { expr, .. }
                | ExprKind::Deref { expr } => out.push(*expr),
                ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                    out.push(*lhs);
                    out.push(*rhs);
                }
                ExprKind::If { cond, then_block, else_block } => {
                    out.push(*cond);
                    out.push(*then_block);
                    out.extend(else_block.iter().copied());
                }
                ExprKind::Return { value } => out.extend(value.iter().copied()),
                ExprKind::Call { recv, args, .. } => {
                    out.push(*recv);
                    out.extend(args.iter().copied());
                }
                ExprKind::TypeCons { args } => out.extend(args.iter().copied()),
                ExprKind::Block { children, .. } => out.extend(children.iter().copied()),
                ExprKind::Fun(f) => out.extend(f.body.iter().copied()),
            },
            NodeKind::Type(t) => match &t.kind {
                TypeKind::Array { elem, len_expr, .. } => {
                    out.push(*elem);
                    out.extend(len_expr.iter().copied());
                }
                TypeKind::Fun { params, result } => {
                    out.extend(params.iter().copied());
                    out.push(*result);
                }
                TypeKind::Ptr { elem }
                | TypeKind::Ref { elem }
                | TypeKind::MutRef { elem }
                | TypeKind::Slice { elem }
                | TypeKind::MutSlice { elem }
                | TypeKind::Optional { elem } => out.push(*elem),
                TypeKind::Struct(st) => {
                    out.extend(st.template_params.iter().copied());
                    out.extend(st.fields.iter().copied());
                }
                TypeKind::Alias(at) => {
                    out.extend(at.template_params.iter().copied());
                    out.push(at.elem);
                }
                TypeKind::Template { recv, args } => {
                    out.push(*recv);
                    out.extend(args.iter().copied());
                }
                _ => {}
            },
        }
        out
    }
}

impl std::ops::Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

#[cfg(test)]
#[path = "tests/arena.rs"]
mod tests;
