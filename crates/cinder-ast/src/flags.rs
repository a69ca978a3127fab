//! Node flag bitset.

use bitflags::bitflags;

bitflags! {
    /// Flags shared by every AST node.
    ///
    /// Visibility occupies the two low bits: no bit set means unit-visible,
    /// `VIS_PKG` package-visible, `VIS_PUB` public.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u16 {
        /// Visible within the same package.
        const VIS_PKG = 1 << 0;
        /// Visible to other packages.
        const VIS_PUB = 1 << 1;
        /// Node has been visited by the checker (visit at most once).
        const CHECKED = 1 << 2;
        /// Expression is used as an rvalue.
        const RVALUE = 1 << 3;
        /// Binding has had its type refined by an enclosing condition.
        const NARROWED = 1 << 4;
        /// Has or contains an unresolved identifier. Bubbles child to parent.
        const UNKNOWN = 1 << 5;
        /// Type has a user-defined drop() function.
        const DROP = 1 << 6;
        /// Type transitively contains owning elements.
        const SUBOWNERS = 1 << 7;
        /// Block is terminated by return/break.
        const EXIT = 1 << 8;
        /// Expression is a constant.
        const CONST = 1 << 9;
        /// Type is a template (carries placeholder parameters).
        const TEMPLATE = 1 << 10;
        /// Type is an instantiation of a template.
        const TEMPLATE_INSTANCE = 1 << 11;
        /// Namespace is a package API.
        const PKG_NS = 1 << 12;
        /// Transient narrowing mark: under an odd number of `!`.
        const MARK_NEG = 1 << 13;
        /// Transient narrowing mark: freshly introduced binding.
        const MARK_LOCAL = 1 << 14;
    }
}

impl NodeFlags {
    /// Flags that transfer from children to parents.
    pub const BUBBLE: NodeFlags = NodeFlags::UNKNOWN;

    const VIS_MASK: NodeFlags = NodeFlags::VIS_PKG.union(NodeFlags::VIS_PUB);

    /// Raise visibility to at least `min_vis` (one of empty, VIS_PKG, VIS_PUB).
    pub fn upgrade_visibility(&mut self, min_vis: NodeFlags) {
        debug_assert!(Self::VIS_MASK.contains(min_vis));
        if (*self & Self::VIS_MASK).bits() < min_vis.bits() {
            *self = (*self - Self::VIS_MASK) | min_vis;
        }
    }

    pub fn set_visibility(&mut self, vis: NodeFlags) {
        debug_assert!(Self::VIS_MASK.contains(vis));
        *self = (*self - Self::VIS_MASK) | vis;
    }

    pub fn is_pub(self) -> bool {
        self.contains(NodeFlags::VIS_PUB)
    }
}
