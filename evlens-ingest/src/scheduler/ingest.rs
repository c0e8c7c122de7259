//! The cooperative ingest loop.

use super::state::{IngestReport, IngestState, SchedulerHandle, StopReason};
use super::walker::Binding;
use crate::handoff::{HandoffOutcome, YieldPoint, YieldStats};
use evlens_core::error::{EvlensError, Result};
use evlens_core::message::{EventMessage, Message, MessageSource};
use evlens_core::schema::{EventSchema, SchemaNode};
use evlens_core::table::{EventRow, TableWriter};
use evlens_core::testing::ClockProvider;
use evlens_core::tree::FlatTree;
use evlens_core::types::{SchemaId, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

/// A declared schema and the binding of its tree subtree.
struct DeclaredSchema {
    name: Arc<str>,
    binding: Binding,
}

/// Producer side of an ingest session.
///
/// Pulls messages from its source, appends events to the table, builds and
/// updates the schema tree, and hands control to the consumer whenever its
/// time budget is spent.
pub struct IngestScheduler<S> {
    session: SessionId,
    source: S,
    table: TableWriter<EventRow>,
    tree: FlatTree<SchemaNode>,
    schemas: HashMap<SchemaId, DeclaredSchema>,
    handoff: Option<YieldPoint>,
    clock: Arc<dyn ClockProvider>,
    budget: Duration,
    handle: SchedulerHandle,
    messages: u64,
    events: u64,
    yields: u64,
}

impl<S: MessageSource> IngestScheduler<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session: SessionId,
        source: S,
        table: TableWriter<EventRow>,
        tree: FlatTree<SchemaNode>,
        handoff: YieldPoint,
        clock: Arc<dyn ClockProvider>,
        budget: Duration,
        handle: SchedulerHandle,
    ) -> Self {
        Self {
            session,
            source,
            table,
            tree,
            schemas: HashMap::new(),
            handoff: Some(handoff),
            clock,
            budget,
            handle,
            messages: 0,
            events: 0,
            yields: 0,
        }
    }

    /// Control handle for observing state and requesting a stop.
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Session this scheduler belongs to.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Run until the source is exhausted, a stop is requested, the consumer
    /// goes away, or a fatal error occurs.
    ///
    /// Blocks the calling thread, including while parked in a hand-off. Run
    /// it on a dedicated thread or through [`spawn`](Self::spawn).
    #[instrument(skip(self), fields(session = %self.session, source = self.source.name()))]
    pub fn run(mut self) -> Result<IngestReport> {
        self.handle.set_state(IngestState::Running);
        info!(budget_ms = self.budget.as_millis() as u64, "Ingest started");

        let mut slice_start = self.clock.now();
        let stop_reason = loop {
            if self.handle.is_stop_requested() {
                break StopReason::StopRequested;
            }

            let message = match self.source.next_message() {
                Ok(Some(message)) => message,
                Ok(None) => break StopReason::Exhausted,
                Err(e) => return Err(self.fail(e)),
            };
            self.messages += 1;

            if let Err(e) = self.handle_message(message) {
                return Err(self.fail(e));
            }

            let slice = self.clock.elapsed_since(slice_start);
            if slice >= self.budget {
                if self.yield_to_consumer(slice) == HandoffOutcome::Disconnected {
                    break StopReason::ConsumerGone;
                }
                slice_start = self.clock.now();
            }
        };

        let report = self.finish(stop_reason);
        info!(
            reason = %report.stop_reason,
            messages = report.messages,
            events = report.events,
            schemas = report.schemas,
            yields = report.yields,
            "Ingest stopped"
        );
        Ok(report)
    }

    /// Run on tokio's blocking thread pool.
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<IngestReport>>
    where
        S: 'static,
    {
        tokio::task::spawn_blocking(move || self.run())
    }

    fn handle_message(&mut self, message: Message) -> Result<()> {
        match message {
            Message::StreamBegin { stream_id, schemas } => {
                debug!(stream_id, schemas = schemas.len(), "Stream began");
                for schema in schemas {
                    self.declare(schema)?;
                }
            }
            Message::PacketBegin { stream_id } => debug!(stream_id, "Packet began"),
            Message::PacketEnd { stream_id } => debug!(stream_id, "Packet ended"),
            Message::Event(event) => self.ingest_event(event)?,
            Message::StreamEnd { stream_id } => debug!(stream_id, "Stream ended"),
            Message::Other { kind } => {
                return Err(EvlensError::protocol(format!(
                    "unrecognized message kind '{kind}'"
                )));
            }
        }
        Ok(())
    }

    fn declare(&mut self, schema: EventSchema) -> Result<()> {
        if let Some(existing) = self.schemas.get(&schema.id) {
            debug!(
                schema_id = %schema.id,
                name = %existing.name,
                "Schema already declared, keeping the first declaration"
            );
            return Ok(());
        }

        let before = self.tree.len();
        let binding = Binding::build(&mut self.tree, &schema.name, &schema.payload)?;
        debug!(
            schema_id = %schema.id,
            name = %schema.name,
            root = %binding.node(),
            nodes = self.tree.len() - before,
            "Schema declared"
        );

        self.schemas.insert(
            schema.id,
            DeclaredSchema {
                name: Arc::from(schema.name),
                binding,
            },
        );
        Ok(())
    }

    fn ingest_event(&mut self, event: EventMessage) -> Result<()> {
        let declared = self
            .schemas
            .get(&event.schema_id)
            .ok_or(EvlensError::UnknownSchema {
                schema_id: event.schema_id,
            })?;

        declared
            .binding
            .check(&event.payload)
            .map_err(|mismatch| EvlensError::PayloadMismatch {
                schema: declared.name.to_string(),
                path: mismatch.path(),
                cause: mismatch.cause,
            })?;

        self.table.append(EventRow::new(
            event.clock,
            Arc::clone(&declared.name),
            event.payload.to_string(),
        ));
        declared.binding.apply(&self.tree, &event.payload)?;
        self.events += 1;
        Ok(())
    }

    fn yield_to_consumer(&mut self, slice: Duration) -> HandoffOutcome {
        self.yields += 1;
        let stats = YieldStats {
            messages: self.messages,
            events: self.events,
            stored_rows: self.table.stored_count(),
            tree_nodes: self.tree.len(),
            yields: self.yields,
            slice,
        };
        trace!(
            yields = self.yields,
            events = self.events,
            slice_ms = slice.as_millis() as u64,
            "Yielding to consumer"
        );

        self.handle.set_state(IngestState::Yielded);
        let outcome = match &self.handoff {
            Some(point) => point.yield_now(stats),
            None => HandoffOutcome::Disconnected,
        };

        match outcome {
            HandoffOutcome::Resumed => self.handle.set_state(IngestState::Running),
            HandoffOutcome::Disconnected => warn!("Consumer dropped the hand-off, stopping"),
        }
        outcome
    }

    /// Enter the terminal state and close the hand-off channel.
    fn finish(&mut self, stop_reason: StopReason) -> IngestReport {
        self.handoff = None;
        self.handle.set_state(IngestState::Stopped);
        IngestReport {
            messages: self.messages,
            events: self.events,
            schemas: self.schemas.len(),
            yields: self.yields,
            stop_reason,
        }
    }

    fn fail(&mut self, e: EvlensError) -> EvlensError {
        self.handoff = None;
        self.handle.set_state(IngestState::Stopped);
        error!(
            code = e.code(),
            error = %e,
            messages = self.messages,
            events = self.events,
            "Ingest failed"
        );
        e
    }
}
