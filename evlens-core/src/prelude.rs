//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! # Example
//!
//! ```
//! use evlens_core::prelude::*;
//!
//! let (mut writer, mut view) = table::channel::<EventRow>(DEFAULT_BLOCK_SIZE);
//! writer.append(EventRow::new(1, "Foo".into(), "{x: 1}"));
//! assert_eq!(view.advance(), 1);
//! ```

// Core types
pub use crate::types::{NodeHandle, SchemaId, SessionId};

// Error handling
pub use crate::error::{EvlensError, Result};

// Storage and views
pub use crate::store::{BlockReader, BlockStore, DEFAULT_BLOCK_SIZE, RecordRef};
pub use crate::table::{self, EventRow, Record, Scalar, TableView, TableWriter};
pub use crate::tree::{
    FlatTree, LiveValue, Navigate, NodeLabel, NodeState, TreeReader, TreeView,
};

// Trace model
pub use crate::message::{EventMessage, Message, MessageSource};
pub use crate::schema::{EventSchema, FieldClass, FieldValue, SchemaNode};

// Time
pub use crate::testing::{ClockProvider, MockClock, RealClock};
