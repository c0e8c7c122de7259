//! Append-only block storage for fixed-shape records.
//!
//! The store is the data plane shared by the producer (ingest loop) and the
//! consumer (views). Records are written once into fixed-capacity blocks and
//! never move afterwards.
//!
//! # Layout
//!
//! ```text
//! directory ──> ┌─────────────────────────────┐
//!               │ block 0: [r0  r1  ...  rB-1] │  full
//!               ├─────────────────────────────┤
//!               │ block 1: [rB  ...  r2B-1]    │  full
//!               ├─────────────────────────────┤
//!               │ block 2: [r2B r2B+1 _ _ _ ]  │  tail, partially filled
//!               └─────────────────────────────┘
//! ```
//!
//! # Visibility
//!
//! The writer fills a slot, then publishes the new length with `Release`.
//! Readers load the length with `Acquire` and only touch slots below it, so
//! a record is observed either completely or not at all.

mod block;

pub use block::{BlockReader, BlockStore, DEFAULT_BLOCK_SIZE, Iter, RecordRef};
