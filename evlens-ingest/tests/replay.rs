//! Integration tests for replaying recorded traces from disk.

mod common;

use evlens_core::tree::Navigate;
use evlens_ingest::scheduler::StopReason;
use evlens_ingest::sources::ReplaySource;
use std::io::Write;

use common::{foo_trace, mock_session};

const FOO_TRACE_YAML: &str = r#"
- type: stream_begin
  stream_id: 0
  schemas:
    - id: 1
      name: Foo
      payload:
        type: structure
        members:
          - { name: x, class: { type: integer, signed: true } }
          - { name: y, class: { type: integer, signed: true } }
- type: packet_begin
- type: event
  clock: 100
  schema_id: 1
  payload: { x: 1, y: 2 }
- type: event
  clock: 200
  schema_id: 1
  payload: { x: 3, y: 4 }
- type: event
  clock: 300
  schema_id: 1
  payload: { x: 5, y: 6 }
- type: packet_end
- type: stream_end
"#;

fn trace_file(extension: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn replay_yaml_trace() {
    let file = trace_file(".yaml", FOO_TRACE_YAML);
    let source = ReplaySource::from_file(file.path()).unwrap();

    let (session, _clock) = mock_session(50);
    let (scheduler, mut consumer) = session.open(source).unwrap();
    let report = scheduler.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.messages, 7);
    assert_eq!(report.events, 3);

    consumer.sync_views();
    assert_eq!(consumer.table.visible_count(), 3);
    assert_eq!(consumer.table.row_at(0).unwrap().clock, 100);
    assert_eq!(consumer.table.row_at(2).unwrap().payload, "{x: 5, y: 6}");

    let foo = consumer.tree.top_level_at(0).unwrap();
    assert_eq!(consumer.tree.reader().child_count(foo).unwrap(), 2);
    assert_eq!(consumer.tree.value_at(foo).unwrap().count, 3);
}

#[test]
fn replay_json_lines_written_from_messages() {
    let mut lines = String::new();
    for message in foo_trace(4) {
        lines.push_str(&serde_json::to_string(&message).unwrap());
        lines.push('\n');
    }
    let file = trace_file(".jsonl", &lines);

    let (session, _clock) = mock_session(50);
    let (scheduler, mut consumer) = session
        .open(ReplaySource::from_file(file.path()).unwrap())
        .unwrap();
    let report = scheduler.run().unwrap();

    assert_eq!(report.events, 4);
    consumer.sync_views();
    assert_eq!(consumer.table.row_at(3).unwrap().payload, "{x: 3, y: 6}");
}

#[test]
fn broken_line_stops_after_stored_events() {
    let mut lines = String::new();
    for message in foo_trace(2) {
        lines.push_str(&serde_json::to_string(&message).unwrap());
        lines.push('\n');
    }
    lines.push_str("{not json}\n");
    let file = trace_file(".jsonl", &lines);

    let (session, _clock) = mock_session(50);
    let (scheduler, consumer) = session
        .open(ReplaySource::from_file(file.path()).unwrap())
        .unwrap();
    let err = scheduler.run().unwrap_err();

    assert_eq!(err.code(), "E301");
    assert!(err.to_string().contains(":4:"));
    assert_eq!(consumer.table.stored_count(), 2);
}

#[test]
fn unknown_message_kind_in_a_trace_is_a_protocol_error() {
    let mut lines = String::new();
    for message in foo_trace(2) {
        lines.push_str(&serde_json::to_string(&message).unwrap());
        lines.push('\n');
    }
    lines.push_str("{\"type\":\"discarded_events\"}\n");
    let jsonl = trace_file(".jsonl", &lines);

    let yaml_text = FOO_TRACE_YAML.replace("- type: packet_end", "- type: discarded_events");
    let yaml = trace_file(".yaml", &yaml_text);

    for (file, stored, first_clock) in [(jsonl, 2, 0), (yaml, 3, 100)] {
        let (session, _clock) = mock_session(50);
        let (scheduler, mut consumer) = session
            .open(ReplaySource::from_file(file.path()).unwrap())
            .unwrap();
        let err = scheduler.run().unwrap_err();

        assert_eq!(err.code(), "E201");
        assert!(err.to_string().contains("discarded_events"), "{err}");

        consumer.sync_views();
        assert_eq!(consumer.table.visible_count(), stored);
        assert_eq!(consumer.table.row_at(0).unwrap().clock, first_clock);
        let foo = consumer.tree.top_level_at(0).unwrap();
        assert_eq!(consumer.tree.value_at(foo).unwrap().count, stored as u64);
    }
}
