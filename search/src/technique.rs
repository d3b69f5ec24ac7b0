//! Traversal policies ("techniques") and the two stock depth-first ones.

use std::fmt;

use crate::contract::{NodeId, SearchTree};
use crate::moves::Move;

/// Discriminant that identifies a technique's policy.
///
/// Two techniques are equal when their kinds are equal, regardless of which
/// instance is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechniqueKind {
    DepthFirst,
    ReverseDepthFirst,
    /// A policy defined outside this crate, named by its author.
    Custom(&'static str),
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthFirst => f.write_str("depth_first"),
            Self::ReverseDepthFirst => f.write_str("reverse_depth_first"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// A pluggable traversal policy.
///
/// # Contract
///
/// - `next_move` is only asked about closed nodes.
/// - It must be a pure function of `(tree state, node, is_root)`: it never
///   mutates the tree and identical inputs give identical moves.
/// - `is_root` is true when `node` sits at the depth where this technique
///   took control; returning [`Move::None`] there hands control back.
pub trait Technique: fmt::Debug {
    fn kind(&self) -> TechniqueKind;

    fn next_move(&self, tree: &dyn SearchTree, node: NodeId, is_root: bool) -> Move;
}

impl PartialEq for dyn Technique {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for dyn Technique {}

/// Depth-first search: descend into the first open child, backtrack when
/// none remain, stop at the technique root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthFirstSearch;

impl Technique for DepthFirstSearch {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::DepthFirst
    }

    fn next_move(&self, tree: &dyn SearchTree, node: NodeId, is_root: bool) -> Move {
        descend_or_backtrack(tree.next_open_child(node), is_root)
    }
}

/// Depth-first search that tries children from the last one down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseDepthFirstSearch;

impl Technique for ReverseDepthFirstSearch {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::ReverseDepthFirst
    }

    fn next_move(&self, tree: &dyn SearchTree, node: NodeId, is_root: bool) -> Move {
        descend_or_backtrack(tree.last_open_child(node), is_root)
    }
}

fn descend_or_backtrack(open_child: Option<usize>, is_root: bool) -> Move {
    match open_child {
        Some(child) => Move::Child(child),
        None if is_root => Move::None,
        None => Move::Parent,
    }
}
