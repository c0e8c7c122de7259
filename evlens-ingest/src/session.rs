//! Session wiring: one producer, one consumer, shared stores.

use crate::config::IngestConfig;
use crate::handoff::{self, HandoffReceiver};
use crate::scheduler::{IngestScheduler, SchedulerHandle};
use evlens_core::error::Result;
use evlens_core::message::MessageSource;
use evlens_core::schema::SchemaNode;
use evlens_core::table::{self, EventRow, TableView};
use evlens_core::testing::{ClockProvider, RealClock};
use evlens_core::tree::{FlatTree, TreeView};
use evlens_core::types::SessionId;
use std::sync::Arc;
use tracing::debug;

/// An ingest session.
///
/// Opening the session splits it into the producer ([`IngestScheduler`]) and
/// the [`Consumer`] with its read-only views.
pub struct Session {
    id: SessionId,
    config: IngestConfig,
    clock: Arc<dyn ClockProvider>,
}

impl Session {
    /// Create a session measuring time with the real clock.
    pub fn new(config: IngestConfig) -> Self {
        Self {
            id: SessionId::new(),
            config,
            clock: Arc::new(RealClock::new()),
        }
    }

    /// Use a different clock for time slicing.
    pub fn with_clock(mut self, clock: Arc<dyn ClockProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The session configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Wire the stores, the hand-off and the stop flag around `source`.
    pub fn open<S: MessageSource>(self, source: S) -> Result<(IngestScheduler<S>, Consumer)> {
        self.config.validate()?;

        let (writer, table) = table::channel::<EventRow>(self.config.table_block_size);
        let tree = FlatTree::<SchemaNode>::with_block_size(self.config.tree_block_size);
        let tree_view = TreeView::new(tree.reader());
        let (yield_point, handoff) = handoff::channel();
        let control = SchedulerHandle::new();

        debug!(
            session = %self.id,
            source = source.name(),
            table_block_size = self.config.table_block_size,
            tree_block_size = self.config.tree_block_size,
            yield_budget_ms = self.config.yield_budget_ms,
            "Session opened"
        );

        let scheduler = IngestScheduler::new(
            self.id,
            source,
            writer,
            tree,
            yield_point,
            self.clock,
            self.config.yield_budget(),
            control.clone(),
        );
        let consumer = Consumer {
            table,
            tree: tree_view,
            handoff,
            control,
        };
        Ok((scheduler, consumer))
    }
}

/// Consumer half of a session.
pub struct Consumer {
    /// The event log.
    pub table: TableView<EventRow>,
    /// The schema hierarchy.
    pub tree: TreeView<SchemaNode>,
    /// Hand-offs from the producer.
    pub handoff: HandoffReceiver,
    /// Producer lifecycle and stop flag.
    pub control: SchedulerHandle,
}

impl Consumer {
    /// Reveal everything the producer has stored so far.
    ///
    /// This is the consumer's pending work during a hand-off. Returns the
    /// number of newly visible rows and top-level tree nodes.
    pub fn sync_views(&mut self) -> (usize, usize) {
        (self.table.advance(), self.tree.advance())
    }

    /// One-line progress summary: stored versus visible events.
    pub fn status_line(&self) -> String {
        format!(
            "Events (processed/loaded): {} / {}",
            self.table.stored_count(),
            self.table.visible_count()
        )
    }
}
