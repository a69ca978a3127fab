//! Type checking rules: struct layout, arrays, function types, aliases,
//! optionals, and late resolution of named types.

use cinder_ast::{NodeFlags, NodeId, NodeKind, TypeKind};

use crate::comptime::comptime_eval_uint;
use crate::context::Checker;

/// Round `size` up to `align` (0 or a power of two).
pub(crate) fn align2(size: u64, align: u64) -> u64 {
    if align <= 1 {
        return size;
    }
    (size + align - 1) & !(align - 1)
}

impl Checker<'_> {
    /// Check a struct type: assign the namespace parent, check fields in
    /// declaration order, lay the struct out, intern it, and queue it for
    /// post-analysis.
    pub(crate) fn check_struct_type(&mut self, t: NodeId) -> NodeId {
        let (fields, ns_parent) = match self.ast.type_kind(t) {
            Some(TypeKind::Struct(st)) => (st.fields.clone(), st.ns_parent),
            _ => return t,
        };

        if ns_parent.is_none() {
            let parent = self.current_ns();
            if let Some(TypeKind::Struct(st)) =
                self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                st.ns_parent = parent;
            }
        }

        let mut align = 0u64;
        let mut size = 0u64;

        self.enter_ns(t);
        for f in fields {
            self.check_local(f);
            let fty = self.ast.expr_ty(f);

            if self.is_owner(fty) {
                // Optimistic: a field type is not marked DROP until its drop
                // function has been visited, which may happen later. Struct
                // types are queued for post-analysis to catch those.
                self.ast.add_flags(t, NodeFlags::SUBOWNERS);
            }

            let ct = self.concrete(fty);
            let falign = u64::from(self.ast.type_align(ct));
            let offset = align2(size, falign);
            if let Some(l) = self.ast.node_mut(f).local_mut() {
                l.offset = offset;
            }
            size = offset + self.ast.type_size(ct);
            // alignment of a struct is the max alignment of its fields
            align = align.max(falign);
        }
        self.leave_ns();

        if let Some(td) = self.ast.type_data_mut(t) {
            td.align = align as u32;
            td.size = align2(size, align);
        }

        let (canonical, added) = self.intern_usertype(t);
        if !added {
            return canonical;
        }

        if !self.ast.flags(t).contains(NodeFlags::SUBOWNERS) {
            self.postanalyze.entry(t).or_insert(false);
        }
        t
    }

    fn array_type_calc_size(&mut self, t: NodeId) {
        let Some(TypeKind::Array { elem, len, .. }) = self.ast.type_kind(t).cloned() else {
            return;
        };
        let target = self.compiler.options.target;
        if len == 0 {
            // dynamic array: { cap, len uint; ptr T }
            let align = u64::from(target.ptr_size.max(target.int_size));
            let size = u64::from(target.int_size) * 2 + u64::from(target.ptr_size);
            if let Some(td) = self.ast.type_data_mut(t) {
                td.align = align as u32;
                td.size = size;
            }
            return;
        }
        let elem_size = self.ast.type_size(elem);
        let Some(size) = len.checked_mul(elem_size) else {
            let uint_s = self.fmt(self.compiler.uint_type);
            self.error(t, format!("array constant too large; overflows uint ({uint_s})"));
            return;
        };
        let elem_align = self.ast.type_align(elem);
        if let Some(td) = self.ast.type_data_mut(t) {
            td.align = elem_align;
            td.size = size;
        }
    }

    pub(crate) fn check_array_type(&mut self, t: NodeId) -> NodeId {
        let Some(TypeKind::Array { elem, len_expr, .. }) = self.ast.type_kind(t).cloned() else {
            return t;
        };

        let elem2 = self.check_type(elem);
        if elem2 != elem {
            if let Some(TypeKind::Array { elem: e, .. }) =
                self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                *e = elem2;
            }
        }

        if self.is_owner(elem2) {
            self.ast.add_flags(t, NodeFlags::SUBOWNERS);
        }

        if let Some(le) = len_expr {
            self.typectx_push(NodeId::UINT);
            let le2 = self.check_expr(le);
            self.typectx_pop();
            if le2 != le {
                if let Some(TypeKind::Array { len_expr: l, .. }) =
                    self.ast.type_data_mut(t).map(|td| &mut td.kind)
                {
                    *l = Some(le2);
                }
            }

            if self.compiler.errcount() > 0 {
                return t;
            }

            match comptime_eval_uint(self.ast, le2) {
                Some(v) => {
                    if let Some(TypeKind::Array { len, .. }) =
                        self.ast.type_data_mut(t).map(|td| &mut td.kind)
                    {
                        *len = v;
                    }
                    if v == 0 && self.compiler.errcount() == 0 {
                        self.error(t, "zero length array".to_string());
                    }
                }
                None => {
                    self.error(le2, "array length must be a compile-time constant".to_string());
                    return t;
                }
            }
        }

        if self.pub_nest > 0 {
            self.ast.node_mut(t).flags.set_visibility(NodeFlags::VIS_PUB);
        }

        self.array_type_calc_size(t);
        let (canonical, _) = self.intern_usertype(t);
        canonical
    }

    /// Check a function type: parameters under the `this`-type context,
    /// then the result type; intern.
    pub(crate) fn check_fun_type(&mut self, t: NodeId, this_type: NodeId) -> NodeId {
        let Some(TypeKind::Fun { params, result }) = self.ast.type_kind(t).cloned() else {
            return t;
        };

        self.typectx_push(this_type);
        for p in params {
            self.check_local(p);

            if self.pub_nest > 0 {
                let pt = self.ast.expr_ty(p);
                let pt_prim = self.ast.type_kind(pt).is_some_and(|k| k.is_prim());
                let pt_placeholder =
                    matches!(self.ast.type_kind(pt), Some(TypeKind::Placeholder { .. }));
                if !pt_prim && !pt_placeholder && !self.ast.flags(pt).is_pub() {
                    let msg =
                        format!("parameter of internal type {} in public function", self.fmt(pt));
                    self.error(p, msg);
                    let help = format!("mark {} `pub`", self.fmt(pt));
                    self.help(pt, help);
                }
            }
        }
        let result2 = self.check_type(result);
        if result2 != result {
            if let Some(TypeKind::Fun { result: r, .. }) =
                self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                *r = result2;
            }
        }
        self.typectx_pop();

        let target = self.compiler.options.target;
        if let Some(td) = self.ast.type_data_mut(t) {
            td.size = u64::from(target.ptr_size);
            td.align = target.ptr_size;
        }

        let (canonical, _) = self.intern_usertype(t);
        canonical
    }

    /// Check a pointer-like type (`*T`, `&T`, `mut&T`, slices, `?T`):
    /// check the element, take size and alignment from the pointer size,
    /// and intern.
    pub(crate) fn check_ptr_like_type(&mut self, t: NodeId) -> NodeId {
        let elem = match self.ast.type_kind(t) {
            Some(
                TypeKind::Ptr { elem }
                | TypeKind::Ref { elem }
                | TypeKind::MutRef { elem }
                | TypeKind::Slice { elem }
                | TypeKind::MutSlice { elem }
                | TypeKind::Optional { elem },
            ) => *elem,
            _ => return t,
        };

        let elem2 = self.check_type(elem);
        if elem2 != elem {
            if let Some(
                TypeKind::Ptr { elem: e }
                | TypeKind::Ref { elem: e }
                | TypeKind::MutRef { elem: e }
                | TypeKind::MutSlice { elem: e }
                | TypeKind::Slice { elem: e }
                | TypeKind::Optional { elem: e },
            ) = self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                *e = elem2;
            }
        }

        let target = self.compiler.options.target;
        let is_slice = self.ast.type_kind(t).is_some_and(|k| k.is_slice());
        if let Some(td) = self.ast.type_data_mut(t) {
            // slices are a (pointer, length) pair
            td.size = u64::from(target.ptr_size) * if is_slice { 2 } else { 1 };
            td.align = target.ptr_size;
        }

        let (canonical, _) = self.intern_usertype(t);
        canonical
    }

    pub(crate) fn check_alias_type(&mut self, t: NodeId) -> NodeId {
        let Some(TypeKind::Alias(at)) = self.ast.type_kind(t) else { return t };
        let elem = at.elem;
        let name = at.name;
        let has_parent = at.ns_parent.is_some();

        let elem2 = self.check_type(elem);
        if elem2 != elem {
            if let Some(TypeKind::Alias(a)) = self.ast.type_data_mut(t).map(|td| &mut td.kind) {
                a.elem = elem2;
            }
        }

        if elem2 == NodeId::VOID {
            self.error(t, "cannot alias type void".to_string());
            return t;
        }

        if self.is_owner(elem2) {
            self.ast.add_flags(t, NodeFlags::SUBOWNERS);
        }

        if !has_parent {
            let parent = self.current_ns();
            if let Some(TypeKind::Alias(a)) = self.ast.type_data_mut(t).map(|td| &mut td.kind) {
                a.ns_parent = parent;
            }
        }

        // internal types must not leak from public aliases
        if self.pub_nest > 0 {
            let elem_prim = self.ast.type_kind(elem2).is_some_and(|k| k.is_prim());
            if !elem_prim && !self.ast.flags(elem2).is_pub() {
                let msg =
                    format!("internal type {} in public alias {}", self.fmt(elem2), self.name(name));
                self.error(t, msg);
                let help = format!("mark {} `pub`", self.fmt(elem2));
                self.help(elem2, help);
            }
            self.ast.node_mut(t).flags.set_visibility(NodeFlags::VIS_PUB);
        }

        let size = self.ast.type_size(elem2);
        let align = self.ast.type_align(elem2);
        if let Some(td) = self.ast.type_data_mut(t) {
            td.size = size;
            td.align = align;
        }
        t
    }

    /// Resolve a named type reference.
    pub(crate) fn check_unresolved_type(&mut self, t: NodeId) -> NodeId {
        let Some(TypeKind::Unresolved { name, resolved }) = self.ast.type_kind(t) else {
            return t;
        };
        if let Some(r) = *resolved {
            return r;
        }
        let name = *name;

        let found = self.lookup(name);
        tracing::trace!(
            name = %self.name(name),
            resolved = found.map(|f| self.fmt(f)).unwrap_or_else(|| "(null)".to_string()),
            "resolve type"
        );

        if let Some(found) = found {
            if self.ast.is_type(found) {
                let resolved = self.check_type(found);
                let nuse = self.ast.node(t).nuse;
                self.ast.node_mut(resolved).nuse += nuse;
                if let Some(TypeKind::Unresolved { resolved: r, .. }) =
                    self.ast.type_data_mut(t).map(|td| &mut td.kind)
                {
                    *r = Some(resolved);
                }

                // aliases must be cycle-checked now: they are unwrapped all
                // over before check_typedefs runs
                if matches!(self.ast.type_kind(resolved), Some(TypeKind::Alias(_)))
                    && !self.check_typedep(resolved)
                {
                    // break the cycle to keep alias unwrapping bounded
                    if let Some(TypeKind::Alias(a)) =
                        self.ast.type_data_mut(resolved).map(|td| &mut td.kind)
                    {
                        a.elem = NodeId::UNKNOWN;
                    }
                }

                return resolved;
            }

            // found, but not a type
            let msg = format!(
                "{} is not a type (it's a {})",
                self.name(name),
                self.kindname(found)
            );
            self.error(t, msg);
            if self.ast.node(found).loc.is_known() {
                let help = format!("{} defined here", self.name(name));
                self.help(found, help);
            }
        } else {
            self.error(t, format!("unknown type \"{}\"", self.name(name)));
        }

        // redefine as itself in the current scope to limit cascades
        self.scope.define(name, t);
        t
    }

    pub(crate) fn check_placeholder_type(&mut self, t: NodeId) -> NodeId {
        // a placeholder is only valid inside a template body
        debug_assert!(self.template_nest > 0, "placeholder outside template");
        t
    }

    /// Check the default values of a template's parameters.
    pub(crate) fn check_template_decl(&mut self, t: NodeId) {
        let params = match self.ast.type_kind(t) {
            Some(TypeKind::Struct(st)) => st.template_params.clone(),
            Some(TypeKind::Alias(at)) => at.template_params.clone(),
            _ => return,
        };
        for p in params {
            let default = match &self.ast.node(p).kind {
                NodeKind::TemplateParam { default, .. } => *default,
                _ => continue,
            };
            let Some(init) = default else { continue };
            let init2 = if self.ast.is_type(init) {
                self.check_type(init)
            } else if self.ast.is_expr(init) {
                self.check_expr(init)
            } else {
                continue;
            };
            if init2 != init
                && let NodeKind::TemplateParam { default, .. } = &mut self.ast.node_mut(p).kind
            {
                *default = Some(init2);
            }
        }
    }
}
