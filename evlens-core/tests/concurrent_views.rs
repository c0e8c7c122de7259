//! Integration tests for a producer thread writing while a consumer reads.
//!
//! Tests verify that:
//! - Table rows are observed whole, in order, and only up to the visible count
//! - Tree readers only ever see closed top-level subtrees

use evlens_core::prelude::*;
use std::sync::Arc;
use std::thread;

const ROWS: u64 = 10_000;
const TOP_LEVEL: u32 = 200;
const CHILDREN: usize = 5;

#[test]
fn table_rows_are_never_torn() {
    let (mut writer, mut view) = table::channel::<EventRow>(7);
    let name: Arc<str> = Arc::from("Tick");

    let producer = thread::spawn(move || {
        for i in 0..ROWS {
            writer.append(EventRow::new(i, Arc::clone(&name), i.to_string()));
        }
        writer
    });

    let mut seen = 0;
    while seen < ROWS as usize {
        view.advance_by(333);
        let visible = view.visible_count();
        assert!(visible <= view.stored_count());

        for i in seen..visible {
            let row = view.row_at(i).unwrap();
            assert_eq!(row.clock, i as u64);
            assert_eq!(row.payload, i.to_string());
        }
        seen = visible;
        thread::yield_now();
    }

    let writer = producer.join().unwrap();
    assert_eq!(writer.stored_count(), ROWS as usize);
    assert_eq!(view.advance(), 0);
    assert_eq!(view.visible_rows().count(), ROWS as usize);
}

#[test]
fn tree_readers_see_closed_subtrees_only() {
    let mut tree: FlatTree<u32> = FlatTree::with_block_size(3);
    let mut view = TreeView::new(tree.reader());

    let producer = thread::spawn(move || {
        for t in 0..TOP_LEVEL {
            let root = tree.begin_node(t).unwrap();
            for c in 0..CHILDREN as u32 {
                let child = tree.begin_node(c).unwrap();
                tree.end_node(child).unwrap();
            }
            tree.end_node(root).unwrap();
        }
        tree
    });

    let mut checked = 0;
    while checked < TOP_LEVEL as usize {
        view.advance();
        for rank in checked..view.top_level_count() {
            let root = view.top_level_at(rank).unwrap();
            assert_eq!(*view.node(root).unwrap().data(), rank as u32);
            assert_eq!(view.disclose(root).unwrap(), CHILDREN);

            for c in 0..CHILDREN {
                let child = view.child_at(root, c).unwrap();
                assert_eq!(view.parent_of(child).unwrap(), Some(root));
                assert_eq!(view.child_rank(child).unwrap(), c);
                assert_eq!(*view.node(child).unwrap().data(), c as u32);
            }
        }
        checked = view.top_level_count();
        thread::yield_now();
    }

    let tree = producer.join().unwrap();
    assert_eq!(tree.len(), TOP_LEVEL as usize * (CHILDREN + 1));
    assert_eq!(tree.published_len(), tree.len());
}
