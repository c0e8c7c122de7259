//! evlens core library
//!
//! Data structures behind a live trace event viewer: a producer appends
//! events and schema nodes at full speed while a consumer (a UI) pages them
//! in at its own pace.
//!
//! # Key Components
//!
//! - **Store**: block-chunked append-only storage; records never move
//! - **Table**: the event log, with a consumer-controlled visible row count
//! - **Tree**: the schema hierarchy as a flat depth-first array, with
//!   one-level-at-a-time disclosure and live per-node state
//! - **Schema / Message**: the trace model pulled from a [`MessageSource`]
//!
//! # Example
//!
//! ```
//! use evlens_core::tree::{FlatTree, Navigate};
//!
//! let mut tree = FlatTree::new();
//! let root = tree.begin_node("root")?;
//! let leaf = tree.begin_node("leaf")?;
//! tree.end_node(leaf)?;
//! tree.end_node(root)?;
//!
//! assert_eq!(tree.child_at(root, 0)?, leaf);
//! assert_eq!(tree.parent_of(leaf)?, Some(root));
//! # Ok::<(), evlens_core::EvlensError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod message;
pub mod prelude;
pub mod schema;
pub mod store;
pub mod table;
pub mod testing;
pub mod tree;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{EvlensError, Result};
pub use message::{EventMessage, Message, MessageSource};
pub use schema::{EventSchema, FieldClass, FieldValue, SchemaNode};
pub use store::{BlockReader, BlockStore};
pub use table::{EventRow, Record, Scalar, TableView, TableWriter};
pub use tree::{FlatTree, Navigate, TreeReader, TreeView};
pub use types::{NodeHandle, SchemaId, SessionId};
