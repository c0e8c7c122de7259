//! Cooperative, time-sliced ingest scheduler.
//!
//! This module provides the producer loop of an ingest session:
//! - [`IngestScheduler`] - pulls messages, stores events, maintains the schema tree
//! - [`SchedulerHandle`] - cross-thread view of the lifecycle and stop flag
//! - Schema walking: field classes become tree nodes at declaration, and
//!   payloads become live node state at data time
//!
//! The loop never suspends inside an append. It checks its time budget after
//! each message and, once the budget is spent, parks in a blocking hand-off
//! until the consumer has caught up.

mod ingest;
mod state;
mod walker;

pub use ingest::IngestScheduler;
pub use state::{IngestReport, IngestState, SchedulerHandle, StopReason};
