//! Lazy, row-count-gated table over a [`BlockStore`].
//!
//! The producer appends through a [`TableWriter`]; the consumer reads through
//! a [`TableView`] that only exposes rows it explicitly advanced into. The
//! gap between the two counts is what lets a UI redraw at its own pace while
//! ingestion bursts ahead.
//!
//! ```text
//!  stored:  [r0 r1 r2 r3 r4 r5 r6 r7]
//!  visible: [r0 r1 r2 r3]             advance() -> 4
//!  visible: [r0 r1 r2 r3 r4 r5 r6 r7]
//! ```

mod record;

pub use record::{EventRow, Record, Scalar};

use crate::error::{EvlensError, Result};
use crate::store::{BlockReader, BlockStore, Iter, RecordRef};

/// Create a connected writer/view pair backed by a new store.
pub fn channel<T: Record>(block_size: usize) -> (TableWriter<T>, TableView<T>) {
    let store = BlockStore::with_block_size(block_size);
    let view = TableView {
        rows: store.reader(),
        visible: 0,
    };
    (TableWriter { store }, view)
}

/// Producer half of a table.
#[derive(Debug)]
pub struct TableWriter<T> {
    store: BlockStore<T>,
}

impl<T: Record> TableWriter<T> {
    /// Append a row. The consumer's visible count does not change.
    pub fn append(&mut self, record: T) -> usize {
        self.store.append(record)
    }

    /// Number of stored rows.
    pub fn stored_count(&self) -> usize {
        self.store.len()
    }

    /// Read back a stored row.
    pub fn get(&self, index: usize) -> Result<RecordRef<T>> {
        self.store.get(index)
    }
}

/// Consumer half of a table.
#[derive(Debug)]
pub struct TableView<T> {
    rows: BlockReader<T>,
    /// Rows the consumer has been told about. Never decreases.
    visible: usize,
}

impl<T: Record> TableView<T> {
    /// Rows the consumer has been told about.
    pub fn visible_count(&self) -> usize {
        self.visible
    }

    /// Rows written by the producer so far.
    pub fn stored_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if rows are waiting to be revealed.
    pub fn can_advance(&self) -> bool {
        self.visible < self.stored_count()
    }

    /// Reveal every row stored right now and return how many were new.
    ///
    /// Returns 0 between bursts; that is the expected steady state.
    pub fn advance(&mut self) -> usize {
        self.advance_by(usize::MAX)
    }

    /// Reveal at most `max` more rows and return how many were revealed.
    pub fn advance_by(&mut self, max: usize) -> usize {
        let stored = self.stored_count();
        let delta = stored.saturating_sub(self.visible).min(max);
        self.visible += delta;
        delta
    }

    /// Read a revealed row.
    pub fn row_at(&self, index: usize) -> Result<RecordRef<T>> {
        if index >= self.visible {
            return Err(EvlensError::OutOfRange {
                index,
                bound: self.visible,
            });
        }
        self.rows.get(index)
    }

    /// Column names.
    pub fn headers(&self) -> &'static [&'static str] {
        T::COLUMNS
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        T::COLUMNS.len()
    }

    /// Read one cell of a revealed row. `None` past the last column.
    pub fn cell(&self, row: usize, column: usize) -> Result<Option<Scalar>> {
        Ok(self.row_at(row)?.column(column))
    }

    /// Iterate over the revealed rows in `range`.
    pub fn rows(&self, range: std::ops::Range<usize>) -> Iter<T> {
        self.rows.range(range.start..range.end.min(self.visible))
    }

    /// Iterate over all revealed rows.
    pub fn visible_rows(&self) -> Iter<T> {
        self.rows(0..self.visible)
    }
}
