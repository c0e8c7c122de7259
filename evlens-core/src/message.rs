//! Messages pulled from a trace source.

use crate::error::Result;
use crate::schema::{EventSchema, FieldValue};
use crate::types::SchemaId;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One message of a trace stream.
///
/// Serialized with a `type` tag so recorded traces can be written by hand:
///
/// ```yaml
/// - type: stream_begin
///   stream_id: 0
///   schemas: []
/// - type: event
///   clock: 1000
///   schema_id: 1
///   payload: { x: 1, y: 2 }
/// ```
///
/// Any other `type` decodes as [`Message::Other`] and is left for the ingest
/// loop to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A stream starts and declares its event schemas.
    StreamBegin {
        /// Stream ID.
        #[serde(default)]
        stream_id: u64,
        /// Event schemas of the stream.
        #[serde(default)]
        schemas: Vec<EventSchema>,
    },
    /// A packet of the stream starts.
    PacketBegin {
        /// Stream ID.
        #[serde(default)]
        stream_id: u64,
    },
    /// A packet of the stream ends.
    PacketEnd {
        /// Stream ID.
        #[serde(default)]
        stream_id: u64,
    },
    /// A trace event.
    Event(EventMessage),
    /// A stream ends.
    StreamEnd {
        /// Stream ID.
        #[serde(default)]
        stream_id: u64,
    },
    /// A message kind the ingest loop does not understand.
    #[serde(skip)]
    Other {
        /// Source-specific kind name.
        kind: String,
    },
}

impl Message {
    /// Short name of the message kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::StreamBegin { .. } => "stream_begin",
            Self::PacketBegin { .. } => "packet_begin",
            Self::PacketEnd { .. } => "packet_end",
            Self::Event(_) => "event",
            Self::StreamEnd { .. } => "stream_end",
            Self::Other { kind } => kind,
        }
    }
}

/// Tags decoded by the derived representation.
const KNOWN_KINDS: &[&str] = &[
    "stream_begin",
    "packet_begin",
    "packet_end",
    "event",
    "stream_end",
];

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Other { kind } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", kind)?;
                map.end()
            }
            known => Message::serialize(known, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = match value.get("type") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(_) => return Err(D::Error::custom("message `type` must be a string")),
            None => return Err(D::Error::missing_field("type")),
        };

        if KNOWN_KINDS.contains(&kind.as_str()) {
            Message::deserialize(value).map_err(D::Error::custom)
        } else {
            Ok(Self::Other { kind })
        }
    }
}

/// A trace event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Default clock snapshot value.
    #[serde(default)]
    pub clock: u64,
    /// Schema the payload follows.
    pub schema_id: SchemaId,
    /// Payload value.
    pub payload: FieldValue,
}

impl EventMessage {
    /// Create an event.
    pub fn new(clock: u64, schema_id: impl Into<SchemaId>, payload: FieldValue) -> Self {
        Self {
            clock,
            schema_id: schema_id.into(),
            payload,
        }
    }
}

/// Pull-style producer of trace messages.
///
/// Implementations may block inside [`next_message`](Self::next_message);
/// the ingest loop runs on a blocking thread.
pub trait MessageSource: Send {
    /// Pull the next message. `Ok(None)` means the source is exhausted.
    fn next_message(&mut self) -> Result<Option<Message>>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "source"
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn next_message(&mut self) -> Result<Option<Message>> {
        (**self).next_message()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
