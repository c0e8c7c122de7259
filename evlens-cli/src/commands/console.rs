//! Console consumer: drives a session and renders it as text.

use super::ViewOptions;
use anyhow::{Context, Result};
use evlens_core::message::MessageSource;
use evlens_core::schema::SchemaNode;
use evlens_core::tree::TreeView;
use evlens_core::types::NodeHandle;
use evlens_ingest::session::{Consumer, Session};

/// Ingest `source` until it stops, answering every hand-off.
pub async fn run<S: MessageSource + 'static>(source: S, options: &ViewOptions) -> Result<()> {
    let config = options.ingest_config()?;
    let session = Session::new(config);
    tracing::info!(session = %session.id(), "Starting ingest");

    let (scheduler, mut consumer) = session.open(source)?;
    let control = consumer.control.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping ingest");
            control.request_stop();
        }
    });
    let producer = scheduler.spawn();

    while let Some(request) = consumer.handoff.recv().await {
        consumer.sync_views();
        if options.follow {
            let stats = request.stats();
            println!(
                "{}  (schema nodes: {}, slice: {:.1} ms)",
                consumer.status_line(),
                stats.tree_nodes,
                stats.slice.as_secs_f64() * 1_000.0
            );
        }
        request.resume();
    }
    interrupt.abort();

    let outcome = producer.await.context("Ingest task panicked")?;
    consumer.sync_views();

    println!("{}", consumer.status_line());
    if options.tree {
        println!();
        print_tree(&mut consumer)?;
    }

    let report = outcome.context("Ingest stopped with an error")?;
    println!(
        "Stopped: {} ({} messages, {} events, {} schemas, {} hand-offs)",
        report.stop_reason, report.messages, report.events, report.schemas, report.yields
    );
    Ok(())
}

fn print_tree(consumer: &mut Consumer) -> Result<()> {
    let tree = &mut consumer.tree;
    println!("{}", tree.headers().join(" | "));
    for rank in 0..tree.top_level_count() {
        let root = tree.top_level_at(rank)?;
        print_node(tree, root, 0)?;
    }
    Ok(())
}

fn print_node(tree: &mut TreeView<SchemaNode>, handle: NodeHandle, depth: usize) -> Result<()> {
    let mut columns = Vec::with_capacity(tree.headers().len());
    for column in 0..tree.headers().len() {
        columns.push(tree.cell(handle, column)?.unwrap_or_default());
    }
    println!("{:indent$}{}", "", columns.join(" | "), indent = depth * 2);

    let children = tree.disclose(handle)?;
    for rank in 0..children {
        let child = tree.child_at(handle, rank)?;
        print_node(tree, child, depth + 1)?;
    }
    Ok(())
}
