//! Import materialization.
//!
//! For each import in a unit: a local alias binds the source package's API
//! namespace; an identifier list binds individual (possibly renamed)
//! members; a `*` wildcard binds every API member not explicitly
//! enumerated, diagnosing collisions with provenance.

use cinder_ast::{ExprData, ExprKind, ImportData, ImportId, NodeId, NodeKind};
use cinder_common::kw;

use crate::context::Checker;

impl Checker<'_> {
    pub(crate) fn check_import(&mut self, n: NodeId) {
        let data = match &self.ast.node(n).kind {
            NodeKind::Import(d) => d.clone(),
            _ => return,
        };

        if data.name != kw::UNDERSCORE {
            // e.g. import "foo/bar" as lol
            match data.pkg_ns {
                Some(ns) => {
                    tracing::trace!(
                        name = %self.name(data.name),
                        path = %data.path,
                        "define package namespace"
                    );
                    self.define(data.name, ns);
                }
                None => {
                    debug_assert!(false, "import not resolved by the build driver");
                }
            }
        }

        if !data.ids.is_empty() {
            self.import_members(&data);
        }
    }

    fn api_members(&self, data: &ImportData) -> Option<(Vec<NodeId>, Vec<cinder_common::Atom>)> {
        let ns = data.pkg_ns?;
        match &self.ast.node(ns).kind {
            NodeKind::Expr(ExprData { kind: ExprKind::Ns(ns_data), .. }) => {
                Some((ns_data.members.clone(), ns_data.member_names.clone()))
            }
            _ => None,
        }
    }

    fn import_members(&mut self, data: &ImportData) {
        // e.g. import x, y as z from "foo/bar"
        // e.g. import * from "foo/bar"
        // e.g. import *, y as z from "foo/bar"
        let Some((members, member_names)) = self.api_members(data) else {
            debug_assert!(false, "import not resolved by the build driver");
            return;
        };

        let mut star: Option<ImportId> = None;

        for imid in &data.ids {
            // '*' imports are denoted by the ignored name
            if imid.name == kw::UNDERSCORE {
                star = Some(*imid);
                continue;
            }

            let orig_name = imid.orig_name.unwrap_or(imid.name);
            match member_names.iter().position(|&m| m == orig_name) {
                Some(i) => self.define(imid.name, members[i]),
                None => {
                    let msg = format!(
                        "no member \"{}\" in package \"{}\"",
                        self.name(orig_name),
                        data.path
                    );
                    self.error_loc(imid.loc, msg);
                }
            }
        }

        let Some(star) = star else { return };

        // import everything not explicitly enumerated
        for (i, &name) in member_names.iter().enumerate() {
            let mut explicit = false;
            for imid in &data.ids {
                if imid.name == kw::UNDERSCORE {
                    continue;
                }
                let orig_name = imid.orig_name.unwrap_or(imid.name);
                if orig_name == name {
                    if imid.orig_name.is_some() {
                        // suggest the rename when the original name is used
                        // by mistake later
                        self.didyoumean_add(imid.name, imid.loc, imid.orig_name);
                    }
                    explicit = true;
                    break;
                }
            }
            if explicit {
                continue;
            }

            // the parser cannot check wildcard collisions (the exported
            // members are unknown at parse time), so check here
            let in_scope = self.scope.lookup(name, 0);
            let existing = in_scope.or_else(|| self.pkg.def(name));
            if let Some(existing) = existing {
                if in_scope.is_some() {
                    // collision with another import; pointing at the
                    // colliding source's own definition would be confusing
                    let msg = format!(
                        "importing \"{}\" shadows previous import",
                        self.name(name)
                    );
                    self.error_loc(star.loc, msg);
                } else {
                    let msg = format!("duplicate definition \"{}\"", self.name(name));
                    self.error(existing, msg);
                    if star.loc.is_known() {
                        let msg = format!(
                            "\"{}\" previously imported from package \"{}\"",
                            self.name(name),
                            data.path
                        );
                        self.warning_loc(star.loc, msg);
                    }
                }
            } else {
                self.define(name, members[i]);
            }
        }
    }
}
