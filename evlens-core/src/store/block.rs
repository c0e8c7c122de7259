//! Block-chunked append-only store.

use crate::error::{EvlensError, Result};
use parking_lot::RwLock;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Default number of records per block.
pub const DEFAULT_BLOCK_SIZE: usize = 500;

/// One fixed-capacity chunk of record slots.
///
/// Every slot is written at most once. A slot is never read before the
/// store length covering it has been published.
struct Block<T> {
    slots: Box<[OnceLock<T>]>,
}

impl<T> Block<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
        }
    }
}

/// State shared between the writer and its readers.
struct Shared<T> {
    /// Records per block (never zero).
    block_size: usize,
    /// Block directory. Written only when a block is added.
    blocks: RwLock<Vec<Arc<Block<T>>>>,
    /// Number of published records.
    len: AtomicUsize,
}

impl<T> Shared<T> {
    fn published_len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn block(&self, block_index: usize) -> Option<Arc<Block<T>>> {
        self.blocks.read().get(block_index).cloned()
    }

    fn get(&self, index: usize) -> Result<RecordRef<T>> {
        let bound = self.published_len();
        if index >= bound {
            return Err(EvlensError::OutOfRange { index, bound });
        }

        let block = self
            .block(index / self.block_size)
            .ok_or(EvlensError::OutOfRange { index, bound })?;
        let offset = index % self.block_size;

        if block.slots[offset].get().is_none() {
            return Err(EvlensError::OutOfRange { index, bound });
        }

        Ok(RecordRef { block, offset })
    }
}

/// A stable reference to a stored record.
///
/// Holding a `RecordRef` keeps the record's block alive; later appends never
/// move or overwrite it.
pub struct RecordRef<T> {
    block: Arc<Block<T>>,
    offset: usize,
}

impl<T> Deref for RecordRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.block.slots[self.offset]
            .get()
            .expect("RecordRef is only created for written slots")
    }
}

impl<T> Clone for RecordRef<T> {
    fn clone(&self) -> Self {
        Self {
            block: Arc::clone(&self.block),
            offset: self.offset,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RecordRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: PartialEq> PartialEq<T> for RecordRef<T> {
    fn eq(&self, other: &T) -> bool {
        **self == *other
    }
}

/// Append-only store of fixed-shape records, chunked into blocks.
///
/// Record `i` lives in block `i / block_size` at offset `i % block_size`.
/// Blocks are allocated lazily and never reallocated, so a record keeps its
/// address for the lifetime of the store.
///
/// `BlockStore` is the single write handle. Readers are obtained with
/// [`BlockStore::reader`] and may live on another thread.
pub struct BlockStore<T> {
    shared: Arc<Shared<T>>,
    /// The last (possibly partially filled) block.
    tail: Option<Arc<Block<T>>>,
    /// Records written into `tail`.
    tail_fill: usize,
    /// Blocks before `tail`, all full.
    full_blocks: usize,
}

impl<T> BlockStore<T> {
    /// Create an empty store with the default block size.
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create an empty store. A block size of zero is clamped to one.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                block_size: block_size.max(1),
                blocks: RwLock::new(Vec::new()),
                len: AtomicUsize::new(0),
            }),
            tail: None,
            tail_fill: 0,
            full_blocks: 0,
        }
    }

    /// Append a record and return its index.
    pub fn append(&mut self, record: T) -> usize {
        let block_size = self.shared.block_size;

        let tail = match self.tail.take() {
            Some(block) if self.tail_fill < block_size => block,
            previous => {
                if previous.is_some() {
                    self.full_blocks += 1;
                }
                let block = Arc::new(Block::new(block_size));
                self.shared.blocks.write().push(Arc::clone(&block));
                self.tail_fill = 0;
                block
            }
        };

        let offset = self.tail_fill;
        let written = tail.slots[offset].set(record).is_ok();
        debug_assert!(written, "slot {offset} written twice");

        self.tail_fill += 1;
        self.tail = Some(tail);

        let index = self.full_blocks * block_size + offset;
        self.shared.len.store(index + 1, Ordering::Release);
        index
    }

    /// Read the record at `index`.
    pub fn get(&self, index: usize) -> Result<RecordRef<T>> {
        self.shared.get(index)
    }

    /// Number of appended records.
    pub fn len(&self) -> usize {
        self.full_blocks * self.shared.block_size + self.tail_fill
    }

    /// Check if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records per block.
    pub fn block_size(&self) -> usize {
        self.shared.block_size
    }

    /// Number of allocated blocks.
    pub fn block_count(&self) -> usize {
        self.full_blocks + usize::from(self.tail.is_some())
    }

    /// Create a read-only handle.
    pub fn reader(&self) -> BlockReader<T> {
        BlockReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for BlockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockStore")
            .field("len", &self.len())
            .field("block_size", &self.block_size())
            .field("blocks", &self.block_count())
            .finish()
    }
}

/// A read-only handle to a [`BlockStore`].
///
/// Sees every record whose append completed before the read started.
pub struct BlockReader<T> {
    shared: Arc<Shared<T>>,
}

impl<T> BlockReader<T> {
    /// Read the record at `index`.
    pub fn get(&self, index: usize) -> Result<RecordRef<T>> {
        self.shared.get(index)
    }

    /// Number of records visible to this reader.
    pub fn len(&self) -> usize {
        self.shared.published_len()
    }

    /// Check if no record is visible yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records per block.
    pub fn block_size(&self) -> usize {
        self.shared.block_size
    }

    /// Iterate over `range`, clamped to the records published right now.
    pub fn range(&self, range: std::ops::Range<usize>) -> Iter<T> {
        let end = range.end.min(self.len());
        Iter {
            shared: Arc::clone(&self.shared),
            block: None,
            next: range.start.min(end),
            end,
        }
    }

    /// Iterate over all records published right now.
    pub fn iter(&self) -> Iter<T> {
        self.range(0..self.len())
    }
}

impl<T> Clone for BlockReader<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for BlockReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockReader")
            .field("len", &self.len())
            .finish()
    }
}

/// Iterator over a snapshot range of a store.
///
/// Looks up each block once, not once per record.
pub struct Iter<T> {
    shared: Arc<Shared<T>>,
    block: Option<Arc<Block<T>>>,
    next: usize,
    end: usize,
}

impl<T> Iterator for Iter<T> {
    type Item = RecordRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        let block_size = self.shared.block_size;
        let offset = self.next % block_size;
        if offset == 0 || self.block.is_none() {
            self.block = self.shared.block(self.next / block_size);
        }

        let block = Arc::clone(self.block.as_ref()?);
        self.next += 1;
        Some(RecordRef { block, offset })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<T> {}
