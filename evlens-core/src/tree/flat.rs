//! Array-backed forest built by depth-first appends.

use super::state::NodeState;
use crate::error::{EvlensError, Result};
use crate::store::{BlockReader, BlockStore, RecordRef};
use crate::types::NodeHandle;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Parent sentinel for top-level nodes.
pub const NO_PARENT: u32 = u32::MAX;

/// Largest number of nodes a tree can hold.
pub const MAX_NODES: usize = NO_PARENT as usize;

/// Default number of nodes per storage block.
pub const DEFAULT_TREE_BLOCK_SIZE: usize = 64;

/// `next_sibling` value of a node that is still open.
const OPEN: u32 = 0;

/// One node of a [`FlatTree`].
///
/// A node's subtree occupies handles `[handle, next_sibling)`.
pub struct TreeNode<D> {
    data: D,
    parent: u32,
    child_rank: u32,
    child_count: AtomicU32,
    next_sibling: AtomicU32,
    state: Mutex<NodeState>,
}

impl<D> TreeNode<D> {
    /// Node payload.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Parent handle, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeHandle> {
        (self.parent != NO_PARENT).then(|| NodeHandle::new(self.parent))
    }

    /// Position among the parent's children (or among top-level nodes).
    pub fn child_rank(&self) -> usize {
        self.child_rank as usize
    }

    /// Number of direct children appended so far.
    pub fn child_count(&self) -> usize {
        self.child_count.load(Ordering::Acquire) as usize
    }

    /// One past the last descendant, `None` while the node is open.
    pub fn next_sibling(&self) -> Option<NodeHandle> {
        match self.next_sibling.load(Ordering::Acquire) {
            OPEN => None,
            next => Some(NodeHandle::new(next)),
        }
    }

    /// Check if the node has been closed.
    pub fn is_closed(&self) -> bool {
        self.next_sibling().is_some()
    }

    /// Snapshot of the live state.
    pub fn state(&self) -> NodeState {
        self.state.lock().clone()
    }
}

impl<D: fmt::Debug> fmt::Debug for TreeNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("data", &self.data)
            .field("parent", &self.parent())
            .field("child_rank", &self.child_rank)
            .field("child_count", &self.child_count())
            .field("next_sibling", &self.next_sibling())
            .finish()
    }
}

/// Index-arithmetic navigation shared by the tree's write and read handles.
pub trait Navigate<D> {
    /// Look up a node.
    fn node(&self, handle: NodeHandle) -> Result<RecordRef<TreeNode<D>>>;

    /// Parent of `handle`, `None` for top-level nodes. O(1).
    fn parent_of(&self, handle: NodeHandle) -> Result<Option<NodeHandle>> {
        Ok(self.node(handle)?.parent())
    }

    /// Check if `handle` is a top-level node.
    fn is_root(&self, handle: NodeHandle) -> Result<bool> {
        Ok(self.parent_of(handle)?.is_none())
    }

    /// Position of `handle` among its siblings.
    fn child_rank(&self, handle: NodeHandle) -> Result<usize> {
        Ok(self.node(handle)?.child_rank())
    }

    /// Number of direct children of `handle`.
    fn child_count(&self, handle: NodeHandle) -> Result<usize> {
        Ok(self.node(handle)?.child_count())
    }

    /// One past the last descendant of `handle`, `None` while it is open.
    fn next_sibling(&self, handle: NodeHandle) -> Result<Option<NodeHandle>> {
        Ok(self.node(handle)?.next_sibling())
    }

    /// The `rank`-th child of `handle`.
    ///
    /// Walks `next_sibling` links from the first child, O(rank). When every
    /// child is a leaf the answer is computed directly.
    fn child_at(&self, handle: NodeHandle, rank: usize) -> Result<NodeHandle> {
        let node = self.node(handle)?;
        let count = node.child_count();
        if rank >= count {
            return Err(EvlensError::OutOfRange {
                index: rank,
                bound: count,
            });
        }

        let first = handle.as_u32() + 1;
        if node.next_sibling() == Some(NodeHandle::new(first + count as u32)) {
            return Ok(NodeHandle::new(first + rank as u32));
        }

        let mut child = NodeHandle::new(first);
        for _ in 0..rank {
            child = self
                .node(child)?
                .next_sibling()
                .ok_or(EvlensError::OutOfRange {
                    index: rank,
                    bound: count,
                })?;
        }
        Ok(child)
    }

    /// All direct children of `handle`, in rank order.
    fn children(&self, handle: NodeHandle) -> Result<Vec<NodeHandle>> {
        let count = self.child_count(handle)?;
        let mut children = Vec::with_capacity(count);
        let mut child = NodeHandle::new(handle.as_u32() + 1);
        for rank in 0..count {
            children.push(child);
            if rank + 1 < count {
                child = self
                    .node(child)?
                    .next_sibling()
                    .ok_or(EvlensError::OutOfRange {
                        index: rank + 1,
                        bound: count,
                    })?;
            }
        }
        Ok(children)
    }

    /// Snapshot of the live state of `handle`.
    fn state_of(&self, handle: NodeHandle) -> Result<NodeState> {
        Ok(self.node(handle)?.state())
    }
}

/// Publication state shared with readers.
#[derive(Debug, Default)]
struct Published {
    /// Nodes visible to readers: every closed top-level subtree.
    len: AtomicUsize,
    /// Closed top-level nodes in rank order.
    top_level: RwLock<Vec<NodeHandle>>,
}

/// Flat, array-backed forest of schema nodes.
///
/// Nodes are appended in depth-first pre-order with [`begin_node`] /
/// [`end_node`] pairs. A subtree becomes visible to [`TreeReader`]s when its
/// top-level node is closed, so readers never see half-built topology.
///
/// [`begin_node`]: FlatTree::begin_node
/// [`end_node`]: FlatTree::end_node
pub struct FlatTree<D> {
    nodes: BlockStore<TreeNode<D>>,
    published: Arc<Published>,
    /// Stack of open nodes, innermost last.
    open: Vec<NodeHandle>,
    /// All top-level nodes, including an open one.
    roots: Vec<NodeHandle>,
    max_nodes: usize,
}

impl<D: Send + Sync + 'static> FlatTree<D> {
    /// Create an empty tree with the default block size.
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_TREE_BLOCK_SIZE)
    }

    /// Create an empty tree storing `block_size` nodes per block.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            nodes: BlockStore::with_block_size(block_size),
            published: Arc::new(Published::default()),
            open: Vec::new(),
            roots: Vec::new(),
            max_nodes: MAX_NODES,
        }
    }

    /// Limit the number of nodes. Clamped to [`MAX_NODES`].
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.min(MAX_NODES);
        self
    }

    /// Open a node as the next child of the innermost open node, or as a new
    /// top-level node when nothing is open.
    pub fn begin_node(&mut self, data: D) -> Result<NodeHandle> {
        let index = self.nodes.len();
        if index >= self.max_nodes {
            return Err(EvlensError::TreeCapacity {
                capacity: self.max_nodes,
            });
        }
        let handle = NodeHandle::new(index as u32);

        let (parent, child_rank) = match self.open.last() {
            Some(&parent) => {
                let rank = self
                    .nodes
                    .get(parent.index())?
                    .child_count
                    .fetch_add(1, Ordering::Release);
                (parent.as_u32(), rank)
            }
            None => {
                let rank = self.roots.len() as u32;
                self.roots.push(handle);
                (NO_PARENT, rank)
            }
        };

        self.nodes.append(TreeNode {
            data,
            parent,
            child_rank,
            child_count: AtomicU32::new(0),
            next_sibling: AtomicU32::new(OPEN),
            state: Mutex::new(NodeState::default()),
        });
        self.open.push(handle);
        Ok(handle)
    }

    /// Close `handle`, which must be the innermost open node.
    pub fn end_node(&mut self, handle: NodeHandle) -> Result<()> {
        let innermost = self.open.last().copied();
        if innermost != Some(handle) {
            return Err(EvlensError::UnbalancedNode { handle, innermost });
        }

        let end = self.nodes.len() as u32;
        self.nodes
            .get(handle.index())?
            .next_sibling
            .store(end, Ordering::Release);
        self.open.pop();

        if self.open.is_empty() {
            self.publish(handle);
        }
        Ok(())
    }

    fn publish(&self, root: NodeHandle) {
        let mut top_level = self.published.top_level.write();
        top_level.push(root);
        self.published.len.store(self.nodes.len(), Ordering::Release);
        tracing::trace!(root = %root, nodes = self.nodes.len(), "Published subtree");
    }

    /// Replace the live state of `handle`.
    pub fn set_state(&self, handle: NodeHandle, state: NodeState) -> Result<()> {
        *self.nodes.get(handle.index())?.state.lock() = state;
        Ok(())
    }

    /// Update the live state of `handle` in place.
    pub fn update_state<F>(&self, handle: NodeHandle, f: F) -> Result<()>
    where
        F: FnOnce(&mut NodeState),
    {
        let node = self.nodes.get(handle.index())?;
        let mut state = node.state.lock();
        f(&mut *state);
        Ok(())
    }

    /// Number of appended nodes, open ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was appended yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes visible to readers.
    pub fn published_len(&self) -> usize {
        self.published.len.load(Ordering::Acquire)
    }

    /// Number of currently open nodes.
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// Number of top-level nodes, an open one included.
    pub fn top_level_count(&self) -> usize {
        self.roots.len()
    }

    /// The `rank`-th top-level node.
    pub fn top_level_at(&self, rank: usize) -> Result<NodeHandle> {
        self.roots
            .get(rank)
            .copied()
            .ok_or(EvlensError::OutOfRange {
                index: rank,
                bound: self.roots.len(),
            })
    }

    /// Create a read-only handle over published nodes.
    pub fn reader(&self) -> TreeReader<D> {
        TreeReader {
            nodes: self.nodes.reader(),
            published: Arc::clone(&self.published),
        }
    }
}

impl<D: Send + Sync + 'static> Default for FlatTree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Navigate<D> for FlatTree<D> {
    fn node(&self, handle: NodeHandle) -> Result<RecordRef<TreeNode<D>>> {
        self.nodes.get(handle.index())
    }
}

impl<D> fmt::Debug for FlatTree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatTree")
            .field("len", &self.nodes.len())
            .field("published", &self.published.len.load(Ordering::Acquire))
            .field("open", &self.open)
            .field("roots", &self.roots.len())
            .finish()
    }
}

/// Read-only handle to a [`FlatTree`], limited to published nodes.
pub struct TreeReader<D> {
    nodes: BlockReader<TreeNode<D>>,
    published: Arc<Published>,
}

impl<D> TreeReader<D> {
    /// Number of published nodes.
    pub fn published_len(&self) -> usize {
        self.published.len.load(Ordering::Acquire)
    }

    /// Number of published top-level nodes.
    pub fn top_level_count(&self) -> usize {
        self.published.top_level.read().len()
    }

    /// The `rank`-th published top-level node.
    pub fn top_level_at(&self, rank: usize) -> Result<NodeHandle> {
        let top_level = self.published.top_level.read();
        top_level
            .get(rank)
            .copied()
            .ok_or(EvlensError::OutOfRange {
                index: rank,
                bound: top_level.len(),
            })
    }
}

impl<D> Navigate<D> for TreeReader<D> {
    fn node(&self, handle: NodeHandle) -> Result<RecordRef<TreeNode<D>>> {
        let bound = self.published_len();
        if handle.index() >= bound {
            return Err(EvlensError::OutOfRange {
                index: handle.index(),
                bound,
            });
        }
        self.nodes.get(handle.index())
    }
}

impl<D> Clone for TreeReader<D> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            published: Arc::clone(&self.published),
        }
    }
}

impl<D> fmt::Debug for TreeReader<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeReader")
            .field("published", &self.published_len())
            .finish()
    }
}
