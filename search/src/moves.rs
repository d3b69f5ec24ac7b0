//! The navigation instruction a technique hands back to the driver.

use crate::contract::NodeRef;

/// One navigation step.
///
/// Produced fresh by every [`crate::technique::Technique::next_move`] call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    /// Stay put: the technique has nothing left to explore below its root.
    None,
    /// Backtrack to the parent of the current node.
    Parent,
    /// Descend into the child with this index.
    Child(usize),
    /// Reposition to a previously obtained reference.
    Jump(NodeRef),
}

impl Move {
    /// Stable lowercase name, used in traces and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Parent => "parent",
            Self::Child(_) => "child",
            Self::Jump(_) => "jump",
        }
    }
}
