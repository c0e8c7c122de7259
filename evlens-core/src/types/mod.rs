//! Core types for evlens.
//!
//! - `SessionId`: identifier of one ingest session
//! - `NodeHandle`: index of a node in a flat tree
//! - `SchemaId`: identifier of a producer-declared event schema

mod ids;

pub use ids::{NodeHandle, SchemaId, SessionId};
