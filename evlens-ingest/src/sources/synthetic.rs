//! Synthetic CAN-bus traffic for demos and load tests.

use evlens_core::error::Result;
use evlens_core::message::{EventMessage, Message, MessageSource};
use evlens_core::schema::{EnumMapping, EventSchema, FieldClass, FieldValue, VariantOption};
use evlens_core::testing::ClockProvider;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Schema ID of `EngineData` frames.
pub const ENGINE_DATA: u64 = 1;
/// Schema ID of `BrakeStatus` frames.
pub const BRAKE_STATUS: u64 = 2;
/// Schema ID of `DiagFrame` frames.
pub const DIAG_FRAME: u64 = 3;

/// Events per packet.
const PACKET_EVENTS: usize = 32;

const STREAM_ID: u64 = 0;

/// Endless stream of CAN-like frames of three event types.
///
/// Deterministic for a given seed. Emits a stream-begin declaring the
/// schemas, then packets of events, and a stream-end once the optional event
/// limit is reached.
pub struct SyntheticCanSource {
    rng: StdRng,
    limit: Option<u64>,
    events: u64,
    timestamp_ns: u64,
    phase: Phase,
    clock: Option<(Arc<dyn ClockProvider>, Duration)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Idle,
    InPacket { remaining: usize },
    Ended,
}

impl SyntheticCanSource {
    /// Create an unlimited source.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            limit: None,
            events: 0,
            timestamp_ns: 0,
            phase: Phase::Start,
            clock: None,
        }
    }

    /// Stop after `limit` events.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Advance `clock` by `per_message` for every message produced.
    ///
    /// Lets a [`MockClock`](evlens_core::testing::MockClock) stand in for
    /// the time a real source spends decoding.
    pub fn with_clock(mut self, clock: Arc<dyn ClockProvider>, per_message: Duration) -> Self {
        self.clock = Some((clock, per_message));
        self
    }

    /// Events produced so far.
    pub fn events(&self) -> u64 {
        self.events
    }

    /// The event schemas this source declares.
    pub fn schemas() -> Vec<EventSchema> {
        let gear = FieldClass::Enumeration {
            signed: false,
            mappings: vec![
                EnumMapping::single("P", 0),
                EnumMapping::single("R", 1),
                EnumMapping::single("N", 2),
                EnumMapping {
                    label: "D".into(),
                    ranges: vec![(3, 8)],
                },
            ],
        };
        let engine = FieldClass::structure([
            ("rpm", FieldClass::unsigned_int()),
            ("throttle", FieldClass::Real { double: true }),
            ("gear", gear),
        ]);

        let brake = FieldClass::structure([
            ("pressure", FieldClass::Real { double: false }),
            ("abs_active", FieldClass::Bool),
            (
                "wheel_speeds",
                FieldClass::StaticArray {
                    element: Box::new(FieldClass::Real { double: false }),
                    length: 4,
                },
            ),
        ]);

        let diag = FieldClass::structure([
            ("can_id", FieldClass::BitArray { length: 11 }),
            (
                "data",
                FieldClass::DynamicArray {
                    element: Box::new(FieldClass::unsigned_int()),
                },
            ),
            (
                "ext",
                FieldClass::Option {
                    inner: Box::new(FieldClass::unsigned_int()),
                },
            ),
            (
                "mode",
                FieldClass::Variant {
                    options: vec![
                        VariantOption::new("service", FieldClass::unsigned_int()),
                        VariantOption::new("text", FieldClass::String),
                    ],
                },
            ),
        ]);

        vec![
            EventSchema::new(ENGINE_DATA, "EngineData", engine),
            EventSchema::new(BRAKE_STATUS, "BrakeStatus", brake),
            EventSchema::new(DIAG_FRAME, "DiagFrame", diag),
        ]
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.events >= limit)
    }

    fn next_event(&mut self) -> EventMessage {
        self.events += 1;
        self.timestamp_ns += self.rng.gen_range(50_000..2_000_000);

        let (schema_id, payload) = match self.rng.gen_range(0..10) {
            0..=4 => (ENGINE_DATA, self.engine_data()),
            5..=8 => (BRAKE_STATUS, self.brake_status()),
            _ => (DIAG_FRAME, self.diag_frame()),
        };
        EventMessage::new(self.timestamp_ns, schema_id, payload)
    }

    fn engine_data(&mut self) -> FieldValue {
        FieldValue::structure([
            ("rpm", FieldValue::from(self.rng.gen_range(700u64..7_000))),
            ("throttle", FieldValue::from(self.rng.gen_range(0.0..100.0f64))),
            ("gear", FieldValue::from(self.rng.gen_range(0u64..=8))),
        ])
    }

    fn brake_status(&mut self) -> FieldValue {
        let base: f64 = self.rng.gen_range(0.0..180.0);
        let wheel_speeds: Vec<FieldValue> = (0..4)
            .map(|_| FieldValue::from(base + self.rng.gen_range(-2.0..2.0)))
            .collect();
        FieldValue::structure([
            ("pressure", FieldValue::from(self.rng.gen_range(0.0..120.0f64))),
            ("abs_active", FieldValue::from(self.rng.gen_bool(0.1))),
            ("wheel_speeds", FieldValue::Array(wheel_speeds)),
        ])
    }

    fn diag_frame(&mut self) -> FieldValue {
        let len = self.rng.gen_range(0..=8);
        let data: Vec<FieldValue> = (0..len)
            .map(|_| FieldValue::from(self.rng.gen_range(0u64..=255)))
            .collect();
        let mode = if self.rng.gen_bool(0.8) {
            FieldValue::variant("service", FieldValue::from(self.rng.gen_range(1u64..=10)))
        } else {
            FieldValue::variant("text", FieldValue::from("NO RESPONSE"))
        };

        let mut members = vec![
            ("can_id", FieldValue::from(self.rng.gen_range(0x700u64..0x7ff))),
            ("data", FieldValue::Array(data)),
        ];
        if self.rng.gen_bool(0.3) {
            members.push(("ext", FieldValue::from(self.rng.gen_range(0u64..=0xffff))));
        }
        members.push(("mode", mode));
        FieldValue::structure(members)
    }
}

impl MessageSource for SyntheticCanSource {
    fn next_message(&mut self) -> Result<Option<Message>> {
        let message = match self.phase {
            Phase::Ended => return Ok(None),
            Phase::Start => {
                self.phase = Phase::Idle;
                Message::StreamBegin {
                    stream_id: STREAM_ID,
                    schemas: Self::schemas(),
                }
            }
            Phase::InPacket { remaining } if remaining == 0 || self.limit_reached() => {
                self.phase = Phase::Idle;
                Message::PacketEnd {
                    stream_id: STREAM_ID,
                }
            }
            Phase::InPacket { remaining } => {
                self.phase = Phase::InPacket {
                    remaining: remaining - 1,
                };
                Message::Event(self.next_event())
            }
            Phase::Idle if self.limit_reached() => {
                self.phase = Phase::Ended;
                Message::StreamEnd {
                    stream_id: STREAM_ID,
                }
            }
            Phase::Idle => {
                self.phase = Phase::InPacket {
                    remaining: PACKET_EVENTS,
                };
                Message::PacketBegin {
                    stream_id: STREAM_ID,
                }
            }
        };

        if let Some((clock, per_message)) = &self.clock {
            clock.advance(*per_message);
        }
        Ok(Some(message))
    }

    fn name(&self) -> &str {
        "synthetic-can"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evlens_core::testing::MockClock;

    fn drain(source: &mut SyntheticCanSource) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Some(message) = source.next_message().unwrap() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn limited_stream_is_well_framed() {
        let mut source = SyntheticCanSource::new(7).with_limit(40);
        let messages = drain(&mut source);

        assert_eq!(messages.first().unwrap().kind(), "stream_begin");
        assert_eq!(messages.last().unwrap().kind(), "stream_end");
        assert_eq!(source.events(), 40);

        let events = messages.iter().filter(|m| m.kind() == "event").count();
        assert_eq!(events, 40);

        let begins = messages.iter().filter(|m| m.kind() == "packet_begin").count();
        let ends = messages.iter().filter(|m| m.kind() == "packet_end").count();
        assert_eq!(begins, 2);
        assert_eq!(begins, ends);

        assert!(source.next_message().unwrap().is_none());
    }

    #[test]
    fn same_seed_same_stream() {
        let a = drain(&mut SyntheticCanSource::new(42).with_limit(50));
        let b = drain(&mut SyntheticCanSource::new(42).with_limit(50));
        assert_eq!(a, b);
    }

    #[test]
    fn clock_moves_per_message() {
        let clock = Arc::new(MockClock::new());
        let mut source = SyntheticCanSource::new(1)
            .with_limit(3)
            .with_clock(clock.clone(), Duration::from_millis(2));
        let messages = drain(&mut source);
        assert_eq!(
            clock.current_nanos(),
            messages.len() as u64 * Duration::from_millis(2).as_nanos() as u64
        );
    }

    #[test]
    fn timestamps_increase() {
        let messages = drain(&mut SyntheticCanSource::new(3).with_limit(20));
        let clocks: Vec<u64> = messages
            .iter()
            .filter_map(|m| match m {
                Message::Event(event) => Some(event.clock),
                _ => None,
            })
            .collect();
        assert!(clocks.windows(2).all(|w| w[0] < w[1]));
    }
}
