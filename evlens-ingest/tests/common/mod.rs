//! Common test utilities for integration tests.

#![allow(dead_code)]

use evlens_core::error::{EvlensError, Result};
use evlens_core::message::{EventMessage, Message, MessageSource};
use evlens_core::schema::{EventSchema, FieldClass, FieldValue};
use evlens_core::testing::{ClockProvider, MockClock};
use evlens_ingest::config::IngestConfig;
use evlens_ingest::session::Session;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Schema `{id: 1, name: "Foo", x: int, y: int}`.
pub fn foo_schema() -> EventSchema {
    EventSchema::new(
        1,
        "Foo",
        FieldClass::structure([
            ("x", FieldClass::signed_int()),
            ("y", FieldClass::signed_int()),
        ]),
    )
}

/// A `Foo` event.
pub fn foo_event(clock: u64, x: i64, y: i64) -> Message {
    Message::Event(EventMessage::new(
        clock,
        1,
        FieldValue::structure([("x", FieldValue::Int(x)), ("y", FieldValue::Int(y))]),
    ))
}

/// Stream-begin declaring `schemas`.
pub fn stream_begin(schemas: Vec<EventSchema>) -> Message {
    Message::StreamBegin {
        stream_id: 0,
        schemas,
    }
}

/// Stream-begin with `Foo`, then `count` `Foo` events.
pub fn foo_trace(count: i64) -> Vec<Message> {
    let mut messages = vec![stream_begin(vec![foo_schema()])];
    messages.extend((0..count).map(|i| foo_event(i as u64 * 10, i, 2 * i)));
    messages
}

/// Plays back a fixed list of messages, then fails or ends.
pub struct ScriptedSource {
    messages: VecDeque<Message>,
    fail_at_end: bool,
}

impl ScriptedSource {
    /// Play back `messages`, then report exhaustion.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into(),
            fail_at_end: false,
        }
    }

    /// Play back `messages`, then fail with a read error.
    pub fn failing_after(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into(),
            fail_at_end: true,
        }
    }
}

impl MessageSource for ScriptedSource {
    fn next_message(&mut self) -> Result<Option<Message>> {
        match self.messages.pop_front() {
            Some(message) => Ok(Some(message)),
            None if self.fail_at_end => Err(EvlensError::SourceRead {
                cause: "device unplugged".to_string(),
            }),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Endless `Foo` events, advancing a clock for each message.
pub struct EndlessSource {
    clock: Arc<dyn ClockProvider>,
    per_message: Duration,
    sent: u64,
}

impl EndlessSource {
    /// Create a source that spends `per_message` on every message.
    pub fn new(clock: Arc<dyn ClockProvider>, per_message: Duration) -> Self {
        Self {
            clock,
            per_message,
            sent: 0,
        }
    }
}

impl MessageSource for EndlessSource {
    fn next_message(&mut self) -> Result<Option<Message>> {
        self.clock.advance(self.per_message);
        let message = if self.sent == 0 {
            stream_begin(vec![foo_schema()])
        } else {
            let i = self.sent as i64;
            foo_event(self.sent, i, -i)
        };
        self.sent += 1;
        Ok(Some(message))
    }

    fn name(&self) -> &str {
        "endless"
    }
}

/// A session on a mock clock with the given yield budget.
pub fn mock_session(budget_ms: u64) -> (Session, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new());
    let config = IngestConfig::default()
        .with_table_block_size(16)
        .with_tree_block_size(4)
        .with_yield_budget_ms(budget_ms);
    let session = Session::new(config).with_clock(clock.clone());
    (session, clock)
}
