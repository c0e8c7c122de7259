//! Flat, array-backed schema tree and its lazy view.
//!
//! Nodes are stored in depth-first pre-order, so every subtree is a
//! contiguous handle range:
//!
//! ```text
//!  handle:       0     1    2    3    4
//!  node:         root  A    B    C    D
//!  parent:       -     0    0    2    2
//!  next_sibling: 5     2    5    4    5
//! ```
//!
//! Navigation is index arithmetic over these fields; no node owns heap
//! pointers to its children.

mod flat;
mod state;
mod view;

pub use flat::{
    DEFAULT_TREE_BLOCK_SIZE, FlatTree, MAX_NODES, NO_PARENT, Navigate, TreeNode, TreeReader,
};
pub use state::{LiveValue, NodeState};
pub use view::{NodeLabel, TREE_HEADERS, TreeView};
