//! Error types for evlens.
//!
//! Every variant carries a stable code so that log lines and bug reports can
//! be grepped regardless of how the message text evolves.

use crate::types::{NodeHandle, SchemaId};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for evlens operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvlensError {
    // =========================================================================
    // Storage/View Errors (E001-E099)
    // =========================================================================
    /// A read went past the stored or visible bound.
    ///
    /// This is a consumer-side contract violation: the caller should have
    /// checked the count before reading.
    #[error("E001: Index {index} out of range (bound {bound})")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The exclusive upper bound at the time of the read.
        bound: usize,
    },

    // =========================================================================
    // Tree Construction Errors (E100-E199)
    // =========================================================================
    /// `end_node` was called on a node that is not the innermost open node.
    #[error("E101: Unbalanced end of node {handle}: innermost open node is {}", fmt_innermost(.innermost))]
    UnbalancedNode {
        /// The handle passed to `end_node`.
        handle: NodeHandle,
        /// The node that was actually innermost, if any was open.
        innermost: Option<NodeHandle>,
    },

    /// The tree ran out of 32-bit node handles.
    #[error("E102: Flat tree capacity exceeded ({capacity} nodes)")]
    TreeCapacity {
        /// Maximum number of nodes.
        capacity: usize,
    },

    // =========================================================================
    // Protocol Errors (E200-E299)
    // =========================================================================
    /// The producer emitted a message the ingest loop does not understand.
    #[error("E201: Protocol error: {cause}")]
    Protocol {
        /// Description of the offending message.
        cause: String,
    },

    /// An event referenced a schema that was never declared.
    #[error("E202: Event references undeclared schema {schema_id}")]
    UnknownSchema {
        /// The schema identifier carried by the event.
        schema_id: SchemaId,
    },

    /// An event payload does not have the shape its schema declares.
    #[error("E203: Payload for schema '{schema}' does not match at '{path}': {cause}")]
    PayloadMismatch {
        /// Schema name.
        schema: String,
        /// Dotted path of the offending field.
        path: String,
        /// What was expected versus found.
        cause: String,
    },

    // =========================================================================
    // Source Errors (E300-E399)
    // =========================================================================
    /// The message source failed to produce the next message.
    #[error("E301: Message source failed: {cause}")]
    SourceRead {
        /// Reason for the failure.
        cause: String,
    },

    // =========================================================================
    // Configuration Errors (E800-E899)
    // =========================================================================
    /// Invalid configuration value.
    #[error("E801: Invalid config value for '{key}': {cause}")]
    ConfigValue {
        /// The configuration key.
        key: String,
        /// Why the value is invalid.
        cause: String,
    },

    /// A YAML or JSON document could not be parsed.
    #[error("E802: Failed to parse {path}: {cause}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Parser message.
        cause: String,
    },

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// Filesystem error.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Reason for the failure.
        cause: String,
    },
}

fn fmt_innermost(innermost: &Option<NodeHandle>) -> String {
    match innermost {
        Some(handle) => handle.to_string(),
        None => "<none>".to_string(),
    }
}

impl EvlensError {
    /// Shorthand for a protocol error.
    pub fn protocol(cause: impl Into<String>) -> Self {
        Self::Protocol {
            cause: cause.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "E001",
            Self::UnbalancedNode { .. } => "E101",
            Self::TreeCapacity { .. } => "E102",
            Self::Protocol { .. } => "E201",
            Self::UnknownSchema { .. } => "E202",
            Self::PayloadMismatch { .. } => "E203",
            Self::SourceRead { .. } => "E301",
            Self::ConfigValue { .. } => "E801",
            Self::Parse { .. } => "E802",
            Self::Io { .. } => "E901",
        }
    }

    /// Check if this error must terminate the ingest loop.
    ///
    /// `OutOfRange` is a local consumer mistake and never stops ingestion.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::OutOfRange { .. })
    }

    /// Check if this error originates at the producer boundary.
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::Protocol { .. } | Self::UnknownSchema { .. } | Self::PayloadMismatch { .. }
        )
    }
}

/// Result type alias using `EvlensError`.
pub type Result<T> = std::result::Result<T, EvlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_correct() {
        let err = EvlensError::OutOfRange { index: 3, bound: 2 };
        assert_eq!(err.code(), "E001");

        let err = EvlensError::UnbalancedNode {
            handle: NodeHandle::new(1),
            innermost: Some(NodeHandle::new(2)),
        };
        assert_eq!(err.code(), "E101");

        let err = EvlensError::UnknownSchema {
            schema_id: SchemaId::new(7),
        };
        assert_eq!(err.code(), "E202");
    }

    #[test]
    fn error_display() {
        let err = EvlensError::UnbalancedNode {
            handle: NodeHandle::new(1),
            innermost: Some(NodeHandle::new(2)),
        };
        let msg = err.to_string();
        assert!(msg.contains("E101"));
        assert!(msg.contains("node#1"));
        assert!(msg.contains("node#2"));

        let err = EvlensError::UnbalancedNode {
            handle: NodeHandle::new(0),
            innermost: None,
        };
        assert!(err.to_string().contains("<none>"));
    }

    #[test]
    fn fatal_classification() {
        assert!(!EvlensError::OutOfRange { index: 0, bound: 0 }.is_fatal());
        assert!(EvlensError::protocol("bad").is_fatal());
        assert!(EvlensError::protocol("bad").is_protocol_error());
        assert!(
            !EvlensError::TreeCapacity { capacity: 1 }.is_protocol_error(),
        );
    }
}
