//! AST for the Cinder compiler.
//!
//! One [`NodeArena`] owns every node of a compilation; nodes reference each
//! other by [`NodeId`]. The checker mutates nodes in place (flags, types,
//! in-slot variant transitions) and allocates wrapper nodes into the same
//! arena.

pub mod arena;
pub mod display;
pub mod effects;
pub mod flags;
pub mod fold;
pub mod node;
pub mod ops;

pub use arena::{NodeArena, NodeId};
pub use display::{fmt_kind, fmt_node};
pub use effects::{expr_no_side_effects, type_cons_no_side_effects};
pub use flags::NodeFlags;
pub use fold::{AstFolder, fold_children};
pub use node::{
    AliasType, ExprData, ExprKind, FunData, ImportData, ImportId, Local, Node, NodeKind, NsData,
    StructType, TypeData, TypeKind, UnitData,
};
pub use ops::Op;
