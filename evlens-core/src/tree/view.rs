//! One-level-at-a-time disclosure over a [`TreeReader`].

use super::flat::{Navigate, TreeNode, TreeReader};
use super::state::NodeState;
use crate::error::{EvlensError, Result};
use crate::store::RecordRef;
use crate::types::NodeHandle;

/// Columns of the schema tree.
pub const TREE_HEADERS: &[&str] = &["Name", "Type", "Count", "Last Value"];

/// Node data that can be shown in the "Name" and "Type" columns.
pub trait NodeLabel {
    /// Display name of the node.
    fn name(&self) -> &str;

    /// Display type of the node.
    fn type_name(&self) -> &str;
}

/// Consumer-side view of a schema tree.
///
/// Top-level nodes appear when the consumer calls [`advance`](Self::advance).
/// A node's children count as rows only after [`disclose`](Self::disclose)
/// was called on it, mirroring how a tree widget expands one level at a time.
#[derive(Debug)]
pub struct TreeView<D> {
    tree: TreeReader<D>,
    visible_top_level: usize,
    /// Disclosure flag per node handle.
    disclosed: Vec<bool>,
}

impl<D> TreeView<D> {
    /// Create a view with nothing visible yet.
    pub fn new(tree: TreeReader<D>) -> Self {
        Self {
            tree,
            visible_top_level: 0,
            disclosed: Vec::new(),
        }
    }

    /// Reveal newly published top-level nodes and return how many were new.
    pub fn advance(&mut self) -> usize {
        let published = self.tree.top_level_count();
        let delta = published.saturating_sub(self.visible_top_level);
        self.visible_top_level += delta;
        delta
    }

    /// Number of revealed top-level nodes.
    pub fn top_level_count(&self) -> usize {
        self.visible_top_level
    }

    /// Check if published top-level nodes are waiting to be revealed.
    pub fn can_advance(&self) -> bool {
        self.visible_top_level < self.tree.top_level_count()
    }

    /// The `rank`-th revealed top-level node.
    pub fn top_level_at(&self, rank: usize) -> Result<NodeHandle> {
        if rank >= self.visible_top_level {
            return Err(EvlensError::OutOfRange {
                index: rank,
                bound: self.visible_top_level,
            });
        }
        self.tree.top_level_at(rank)
    }

    /// Expose the children of `handle` and return their number.
    pub fn disclose(&mut self, handle: NodeHandle) -> Result<usize> {
        let count = self.tree.child_count(handle)?;
        let index = handle.index();
        if index >= self.disclosed.len() {
            self.disclosed.resize(index + 1, false);
        }
        self.disclosed[index] = true;
        Ok(count)
    }

    /// Check if the children of `handle` have been disclosed.
    pub fn is_disclosed(&self, handle: NodeHandle) -> bool {
        self.disclosed.get(handle.index()).copied().unwrap_or(false)
    }

    /// Rows under `handle`: its child count once disclosed, else 0.
    pub fn row_count_of(&self, handle: NodeHandle) -> Result<usize> {
        let count = self.tree.child_count(handle)?;
        Ok(if self.is_disclosed(handle) { count } else { 0 })
    }

    /// The `rank`-th disclosed child of `handle`.
    pub fn child_at(&self, handle: NodeHandle, rank: usize) -> Result<NodeHandle> {
        let bound = self.row_count_of(handle)?;
        if rank >= bound {
            return Err(EvlensError::OutOfRange { index: rank, bound });
        }
        self.tree.child_at(handle, rank)
    }

    /// Parent of `handle`, `None` for top-level nodes.
    pub fn parent_of(&self, handle: NodeHandle) -> Result<Option<NodeHandle>> {
        self.tree.parent_of(handle)
    }

    /// Row of `handle` under its parent.
    pub fn child_rank(&self, handle: NodeHandle) -> Result<usize> {
        self.tree.child_rank(handle)
    }

    /// The node behind `handle`.
    pub fn node(&self, handle: NodeHandle) -> Result<RecordRef<TreeNode<D>>> {
        self.tree.node(handle)
    }

    /// Latest live state of `handle`.
    pub fn value_at(&self, handle: NodeHandle) -> Result<NodeState> {
        self.tree.state_of(handle)
    }

    /// Column names.
    pub fn headers(&self) -> &'static [&'static str] {
        TREE_HEADERS
    }

    /// The underlying reader.
    pub fn reader(&self) -> &TreeReader<D> {
        &self.tree
    }
}

impl<D: NodeLabel> TreeView<D> {
    /// Render one column of `handle`. `None` past the last column.
    pub fn cell(&self, handle: NodeHandle, column: usize) -> Result<Option<String>> {
        let node = self.tree.node(handle)?;
        Ok(match column {
            0 => Some(node.data().name().to_owned()),
            1 => Some(node.data().type_name().to_owned()),
            2 => Some(node.state().count.to_string()),
            3 => Some(node.state().value.to_string()),
            _ => None,
        })
    }
}
