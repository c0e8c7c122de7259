//! evlens ingest - Producer side of a live trace viewer.
//!
//! This crate drives the data structures of `evlens-core`:
//! - Time-sliced ingest scheduler with a blocking consumer hand-off
//! - Schema walker building the schema tree and its live node state
//! - Session wiring of one producer and one consumer
//! - Built-in message sources (file replay, synthetic CAN traffic)
//! - Configuration and tracing setup
//!
//! # Example
//!
//! ```no_run
//! use evlens_ingest::prelude::*;
//!
//! # async fn demo() -> evlens_core::Result<()> {
//! let source = SyntheticCanSource::new(42).with_limit(10_000);
//! let (scheduler, mut consumer) = Session::new(IngestConfig::default()).open(source)?;
//! let producer = scheduler.spawn();
//!
//! while let Some(request) = consumer.handoff.recv().await {
//!     consumer.sync_views();
//!     println!("{}", consumer.status_line());
//!     request.resume();
//! }
//! # let _ = producer.await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod handoff;
pub mod observability;
pub mod scheduler;
pub mod session;
pub mod sources;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{DEFAULT_YIELD_BUDGET_MS, IngestConfig};
    pub use crate::handoff::{HandoffOutcome, HandoffReceiver, YieldPoint, YieldRequest, YieldStats};
    pub use crate::observability::{LogFormat, TracingConfig, init_tracing};
    pub use crate::scheduler::{
        IngestReport, IngestScheduler, IngestState, SchedulerHandle, StopReason,
    };
    pub use crate::session::{Consumer, Session};
    pub use crate::sources::{ReplaySource, SyntheticCanSource};
}
