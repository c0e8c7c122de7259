//! Integration tests for ingesting traces into the table and tree views.

mod common;

use evlens_core::schema::FieldClass;
use evlens_core::table::Scalar;
use evlens_core::tree::{LiveValue, Navigate};
use evlens_ingest::scheduler::StopReason;
use evlens_ingest::sources::SyntheticCanSource;
use evlens_ingest::sources::synthetic::DIAG_FRAME;

use common::{ScriptedSource, foo_schema, foo_trace, mock_session, stream_begin};

#[test]
fn foo_events_fill_table_and_tree() {
    let (session, _clock) = mock_session(50);
    let (scheduler, mut consumer) = session.open(ScriptedSource::new(foo_trace(3))).unwrap();

    let report = scheduler.run().unwrap();
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.messages, 4);
    assert_eq!(report.events, 3);
    assert_eq!(report.schemas, 1);
    assert_eq!(report.yields, 0);

    assert_eq!(consumer.table.stored_count(), 3);
    assert_eq!(consumer.tree.top_level_count(), 0);
    consumer.sync_views();

    // Table
    let row = consumer.table.row_at(2).unwrap();
    assert_eq!(&*row.name, "Foo");
    assert_eq!(row.clock, 20);
    assert_eq!(row.payload, "{x: 2, y: 4}");
    assert_eq!(consumer.table.headers(), &["Timestamp", "Event", "Payload"]);
    assert_eq!(consumer.table.cell(0, 1).unwrap(), Some(Scalar::from("Foo")));
    assert!(consumer.table.row_at(3).is_err());

    // Tree
    assert_eq!(consumer.tree.top_level_count(), 1);
    let foo = consumer.tree.top_level_at(0).unwrap();
    assert_eq!(consumer.tree.parent_of(foo).unwrap(), None);
    assert_eq!(consumer.tree.row_count_of(foo).unwrap(), 0);
    assert_eq!(consumer.tree.disclose(foo).unwrap(), 2);

    let x = consumer.tree.child_at(foo, 0).unwrap();
    let y = consumer.tree.child_at(foo, 1).unwrap();
    assert_eq!(consumer.tree.cell(x, 0).unwrap().as_deref(), Some("x"));
    assert_eq!(consumer.tree.cell(y, 0).unwrap().as_deref(), Some("y"));
    assert_eq!(consumer.tree.parent_of(y).unwrap(), Some(foo));

    assert_eq!(consumer.tree.value_at(foo).unwrap().count, 3);
    assert_eq!(consumer.tree.value_at(x).unwrap().count, 3);
    assert_eq!(consumer.tree.value_at(y).unwrap().count, 3);
    assert_eq!(
        consumer.tree.value_at(y).unwrap().value,
        LiveValue::Scalar(Scalar::Int(4))
    );
    assert_eq!(consumer.tree.cell(x, 1).unwrap().as_deref(), Some("Signed integer"));
    assert_eq!(consumer.tree.cell(x, 2).unwrap().as_deref(), Some("3"));
    assert_eq!(consumer.tree.cell(x, 3).unwrap().as_deref(), Some("2"));
}

#[test]
fn duplicate_schema_keeps_first_declaration() {
    let mut messages = foo_trace(1);
    let mut redeclared = foo_schema();
    redeclared.payload = FieldClass::structure([("z", FieldClass::Bool)]);
    messages.push(stream_begin(vec![redeclared]));
    messages.extend(foo_trace(2).into_iter().skip(1));

    let (session, _clock) = mock_session(50);
    let (scheduler, mut consumer) = session.open(ScriptedSource::new(messages)).unwrap();
    let report = scheduler.run().unwrap();

    assert_eq!(report.schemas, 1);
    assert_eq!(report.events, 3);
    consumer.sync_views();
    assert_eq!(consumer.tree.top_level_count(), 1);
    let foo = consumer.tree.top_level_at(0).unwrap();
    assert_eq!(consumer.tree.value_at(foo).unwrap().count, 3);
}

#[test]
fn synthetic_traffic_is_accounted_for() {
    let (session, _clock) = mock_session(50);
    let source = SyntheticCanSource::new(11).with_limit(500);
    let (scheduler, mut consumer) = session.open(source).unwrap();
    let report = scheduler.run().unwrap();

    assert_eq!(report.events, 500);
    assert_eq!(report.schemas, 3);
    consumer.sync_views();
    assert_eq!(consumer.table.visible_count(), 500);
    assert_eq!(consumer.tree.top_level_count(), 3);

    // Top-level counts add up to the number of events.
    let mut total = 0;
    for rank in 0..consumer.tree.top_level_count() {
        let root = consumer.tree.top_level_at(rank).unwrap();
        total += consumer.tree.value_at(root).unwrap().count;
    }
    assert_eq!(total, 500);

    // Every row names one of the declared event types.
    assert!(consumer.table.visible_rows().all(|row| {
        matches!(&*row.name, "EngineData" | "BrakeStatus" | "DiagFrame")
    }));

    // DiagFrame: can_id, data (with its element template), ext, mode.
    let diag = consumer.tree.top_level_at((DIAG_FRAME - 1) as usize).unwrap();
    assert_eq!(consumer.tree.disclose(diag).unwrap(), 4);
    let data = consumer.tree.child_at(diag, 1).unwrap();
    assert_eq!(consumer.tree.disclose(data).unwrap(), 1);
    let template = consumer.tree.child_at(data, 0).unwrap();
    assert_eq!(consumer.tree.cell(template, 0).unwrap().as_deref(), Some("[]"));

    let diag_count = consumer.tree.value_at(diag).unwrap().count;
    assert_eq!(consumer.tree.value_at(data).unwrap().count, diag_count);

    let mode = consumer.tree.child_at(diag, 3).unwrap();
    assert_eq!(consumer.tree.reader().child_count(mode).unwrap(), 2);
    if diag_count > 0 {
        assert!(matches!(
            consumer.tree.value_at(mode).unwrap().value,
            LiveValue::Selected { .. }
        ));
    }
}
