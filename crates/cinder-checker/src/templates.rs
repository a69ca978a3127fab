//! Template (generic type) checking and instantiation.
//!
//! A template use `Foo<A, B>` resolves by checking the receiver and the
//! arguments, then expanding the template's AST with every placeholder
//! substituted by the matching argument. Expansion is memoized by
//! (template, argument type ids), and an instance is registered in the
//! memoization map *before* its body is checked so self-referential
//! instances terminate. Inside an enclosing template definition no
//! expansion happens; the use node is left in place.

use cinder_ast::{AstFolder, NodeArena, NodeFlags, NodeId, NodeKind, TypeKind};
use cinder_common::srcloc::Origin;
use tracing::trace;

use crate::context::Checker;

/// Substitutes placeholder occurrences while tracking template nesting, and
/// scrubs cached metadata from every node the substitution changed.
struct Instantiator {
    params: Vec<NodeId>,
    args: Vec<NodeId>,
    template_nest: u32,
}

impl AstFolder for Instantiator {
    fn fold(&mut self, ast: &mut NodeArena, id: NodeId) -> NodeId {
        let mut cur = id;

        if let Some(TypeKind::Placeholder { param }) = ast.type_kind(cur) {
            let param = *param;
            match self.params.iter().position(|&p| p == param) {
                Some(i) => cur = self.args[i],
                // an outer template's placeholder; leave it for the outer
                // expansion
                None => return cur,
            }
        }

        let is_template = ast.flags(cur).contains(NodeFlags::TEMPLATE);
        self.template_nest += u32::from(is_template);
        let out = self.fold_children(ast, cur);
        self.template_nest -= u32::from(is_template);

        if out != id {
            // substitution may have changed structural identity of a nested
            // instance
            if self.template_nest > 0
                && ast.flags(out).contains(NodeFlags::TEMPLATE_INSTANCE)
                && let Some(td) = ast.type_data_mut(out)
            {
                td.typeid = None;
            }

            // a modified path may contain names that need resolving again
            let is_prim = ast.type_kind(out).is_some_and(|k| k.is_prim());
            let is_placeholder = matches!(ast.type_kind(out), Some(TypeKind::Placeholder { .. }));
            if !is_prim && !is_placeholder {
                ast.remove_flags(out, NodeFlags::CHECKED | NodeFlags::UNKNOWN);
            }
        }

        out
    }
}

impl Checker<'_> {
    fn template_params_of(&self, template: NodeId) -> Vec<NodeId> {
        match self.ast.type_kind(template) {
            Some(TypeKind::Struct(st)) => st.template_params.clone(),
            Some(TypeKind::Alias(at)) => at.template_params.clone(),
            _ => Vec::new(),
        }
    }

    fn template_param_default(&self, param: NodeId) -> Option<NodeId> {
        match &self.ast.node(param).kind {
            NodeKind::TemplateParam { default, .. } => *default,
            _ => None,
        }
    }

    /// Check a template use, e.g. `var x Foo<int>`.
    pub(crate) fn check_template_type(&mut self, t: NodeId) -> NodeId {
        let (recv, args) = match self.ast.type_kind(t) {
            Some(TypeKind::Template { recv, args }) => (*recv, args.clone()),
            _ => return t,
        };

        // the template must be checked first: a use may precede the
        // definition
        let template = {
            let r2 = self.check_type(recv);
            if r2 != recv
                && let Some(TypeKind::Template { recv: slot, .. }) =
                    self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                *slot = r2;
            }
            r2
        };

        let params = self.template_params_of(template);
        let total = params.len();
        let required = params
            .iter()
            .filter(|&&p| self.template_param_default(p).is_none())
            .count();

        if required != total && self.compiler.errcount() > 0 {
            return t;
        }

        // arity against (required, total)
        if args.len() < required || args.len() > total {
            let which = if args.len() > total { "too many" } else { "not enough" };
            let at_least = if required < total { " at least" } else { "" };
            let msg = format!("{which} template parameters; want{at_least} {required}");
            self.error(t, msg);
            if let Some(&first) = params.first() {
                let mut origin = Origin::from_loc(self.ast.node(first).loc);
                for &p in &params[1..] {
                    let o2 = Origin::from_loc(self.ast.node(p).loc);
                    origin = Origin::union(origin, o2);
                }
                if origin.line != 0 {
                    let plural = if total == 1 { "" } else { "s" };
                    let msg = format!("template parameter{plural} defined here");
                    self.compiler.help(origin, msg);
                }
            }
            return t;
        }

        // resolve the arguments (types or constant expressions)
        for (i, &arg) in args.iter().enumerate() {
            if self.ast.is_checked(arg) {
                continue;
            }
            let mut arg = arg;
            // unwrap placeholder defaults
            loop {
                let Some(TypeKind::Placeholder { param }) = self.ast.type_kind(arg) else {
                    break;
                };
                let param = *param;
                match self.template_param_default(param) {
                    Some(init) => {
                        self.ast.add_flags(arg, NodeFlags::CHECKED);
                        arg = init;
                    }
                    None => break,
                }
            }
            let arg2 = if self.ast.is_type(arg) {
                self.check_type(arg)
            } else if self.ast.is_expr(arg) {
                self.check_expr(arg)
            } else {
                arg
            };
            if arg2 != args[i]
                && let Some(TypeKind::Template { args: slots, .. }) =
                    self.ast.type_data_mut(t).map(|td| &mut td.kind)
            {
                slots[i] = arg2;
            }
        }

        if !self.no_error() {
            return t;
        }

        // inside an enclosing template definition, leave the use in place
        if self.template_nest == 0 {
            return self.instantiate_template(t, template);
        }
        t
    }

    fn instance_key(&mut self, template: NodeId, args: &[NodeId]) -> (NodeId, Box<[u8]>) {
        let mut key = Vec::new();
        for &arg in args {
            debug_assert!(self.ast.is_type(arg));
            let id = self.typeid(arg);
            key.extend_from_slice(&id);
        }
        (template, key.into())
    }

    fn instantiate_template(&mut self, t: NodeId, template: NodeId) -> NodeId {
        let use_args = match self.ast.type_kind(t) {
            Some(TypeKind::Template { args, .. }) => args.clone(),
            _ => return t,
        };
        let params = self.template_params_of(template);

        trace!(
            template = %self.fmt(template),
            args = use_args.len(),
            "expand template"
        );

        // pad missing arguments with parameter defaults
        let mut args = use_args;
        for &p in params.iter().skip(args.len()) {
            match self.template_param_default(p) {
                Some(init) => args.push(init),
                None => return t,
            }
        }

        // reuse an existing instance
        let key = self.instance_key(template, &args);
        if let Some(&instance) = self.template_instances.get(&key) {
            trace!("using existing template instance");
            return instance;
        }

        // expand: substitute every placeholder with its argument
        let mut inst = Instantiator {
            params: params.clone(),
            args: args.clone(),
            template_nest: self.template_nest,
        };
        let mut instance = inst.fold(self.ast, template);

        if instance == template {
            // no substitutions occurred (e.g. no placeholder occurrences)
            instance = self.ast.clone_node(template);
        } else {
            debug_assert!(
                !self.ast.is_checked(instance),
                "checked flag should have been scrubbed"
            );
        }

        // convert the expansion into an instance
        {
            let node = self.ast.node_mut(instance);
            node.flags = (node.flags - NodeFlags::TEMPLATE) | NodeFlags::TEMPLATE_INSTANCE;
            node.flags -= NodeFlags::CHECKED;
        }
        match self.ast.type_data_mut(instance).map(|td| &mut td.kind) {
            Some(TypeKind::Struct(st)) => st.template_params = args,
            Some(TypeKind::Alias(at)) => at.template_params = args,
            _ => {}
        }
        if let Some(td) = self.ast.type_data_mut(instance) {
            td.typeid = None;
        }

        // register before checking so a self-referential instance finds
        // itself and terminates
        self.template_instances.insert(key, instance);

        let checked = self.check_type(instance);
        debug_assert_eq!(checked, instance, "instance must not be replaced");
        checked
    }
}
