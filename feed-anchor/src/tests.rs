use crate::*;

use alloc::vec::Vec;

use feed_window::{ListWindow, WindowOptions};

fn rows(ts: core::ops::Range<i64>, height: u32) -> Vec<RowMeta<u64>> {
    ts.map(|t| RowMeta {
        key: t as u64,
        created_at_ms: t,
        estimated_height: height,
    })
    .collect()
}

#[test]
fn bottom_distance_anchor_keeps_distance_constant() {
    let mut w = ListWindow::new(WindowOptions::new(10, |_| 100));
    w.set_viewport_size(300);
    w.set_scroll_offset(700);
    assert_eq!(w.total_size(), 1000);

    let anchor = BottomDistanceAnchor::capture(&w);
    assert_eq!(anchor.distance, 300);

    // Total grows 1000 -> 1500; offset must land at 1200.
    w.set_count(15);
    let applied = anchor.apply(&mut w);
    assert_eq!(applied, 1200);
    assert_eq!(w.total_size() - w.scroll_offset(), 300);
}

#[test]
fn height_delta_anchor_shifts_offset_by_growth() {
    let mut w = ListWindow::new(WindowOptions::new(10, |_| 100));
    w.set_viewport_size(300);
    w.set_scroll_offset(250);

    let anchor = HeightDeltaAnchor::capture(&w);
    w.set_count(14); // +400 at estimate 100
    let applied = anchor.apply(&mut w);
    assert_eq!(applied, 250 + 400);
}

#[test]
fn anchors_clamp_to_max_scroll_offset() {
    let mut w = ListWindow::new(WindowOptions::new(10, |_| 100));
    w.set_viewport_size(300);
    w.set_scroll_offset(700);

    let anchor = BottomDistanceAnchor::from_parts(5_000, 700);
    let applied = anchor.apply(&mut w);
    assert_eq!(applied, 0); // distance larger than total saturates to 0

    let anchor = HeightDeltaAnchor::from_parts(0, u64::MAX);
    let applied = anchor.apply(&mut w);
    assert_eq!(applied, w.max_scroll_offset());
}

#[test]
fn buffer_merges_dedupes_and_orders() {
    let mut b: PageBuffer<u64> = PageBuffer::new();

    let added = b.merge(rows(10..15, 60));
    assert_eq!(added, 5);

    // Overlapping older page plus one duplicate.
    let added = b.merge(rows(8..12, 60));
    assert_eq!(added, 2);

    assert_eq!(b.len(), 7);
    let keys: Vec<u64> = b.rows().iter().map(|r| r.key).collect();
    assert_eq!(keys, alloc::vec![8, 9, 10, 11, 12, 13, 14]);

    assert_eq!(b.index_of(&8), Some(0));
    assert_eq!(b.index_of(&14), Some(6));
    assert_eq!(b.index_of(&99), None);
    assert!(b.contains(&10));
}

#[test]
fn buffer_orders_same_timestamp_rows_by_key() {
    let mut b: PageBuffer<u64> = PageBuffer::new();
    b.merge([
        RowMeta {
            key: 7,
            created_at_ms: 100,
            estimated_height: 60,
        },
        RowMeta {
            key: 3,
            created_at_ms: 100,
            estimated_height: 60,
        },
    ]);
    let keys: Vec<u64> = b.rows().iter().map(|r| r.key).collect();
    assert_eq!(keys, alloc::vec![3, 7]);
}

#[test]
fn initial_page_scrolls_to_bottom_exactly_once() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);

    let ticket = c.poll_load().expect("initial page load");
    assert_eq!(ticket.direction(), LoadDirection::Older);
    assert!(c.complete_load(ticket, rows(0..20, 100), true));

    // 20 rows * 100 = 2000, viewport 300 => bottom offset 1700.
    assert_eq!(c.window().scroll_offset(), 1700);

    // A later prepend must not jump to the bottom again.
    c.on_scroll(10, 0);
    let ticket = c.poll_load().expect("older page load");
    assert!(c.complete_load(ticket, rows(-20..0, 100), false));
    assert_ne!(c.window().scroll_offset(), c.window().max_scroll_offset());
}

#[test]
fn prepend_restores_offset_by_height_delta() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);

    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..20, 100), true);
    c.on_scroll(20, 0);

    let ticket = c.poll_load().expect("near-top trigger");
    c.complete_load(ticket, rows(-10..0, 100), true);

    // 10 rows of 100 were prepended above the viewport.
    assert_eq!(c.window().scroll_offset(), 20 + 1000);
    assert_eq!(c.buffer().len(), 30);
}

#[test]
fn prepend_can_use_bottom_distance_strategy() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_prepend_anchor(PrependAnchor::BottomDistance);
    c.set_viewport_size(300);

    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..10, 100), true);
    c.on_scroll(0, 0);

    let distance = c.window().total_size() - c.window().scroll_offset();
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(-5..0, 100), true);
    assert_eq!(c.window().total_size() - c.window().scroll_offset(), distance);
}

#[test]
fn duplicate_triggers_yield_one_outstanding_ticket() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..20, 100), true);

    // Scrolled to the very top: both the index-0 trigger and the raw-offset
    // trigger are live.
    c.on_scroll(0, 0);
    let ticket = c.poll_load().expect("one ticket");
    assert!(c.poll_load().is_none());
    assert!(c.is_loading(LoadDirection::Older));

    c.complete_load(ticket, rows(-10..0, 100), true);
    assert!(!c.is_loading(LoadDirection::Older));
}

#[test]
fn exhausted_edge_stops_polling() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..5, 100), false);

    c.on_scroll(0, 0);
    assert!(!c.has_more(LoadDirection::Older));
    assert!(c.poll_load().is_none());
}

#[test]
fn failed_load_releases_guard_and_leaves_window_untouched() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..20, 100), true);
    c.on_scroll(0, 0);

    let before_total = c.window().total_size();
    let before_offset = c.window().scroll_offset();

    let ticket = c.poll_load().unwrap();
    c.fail_load(ticket);

    assert_eq!(c.window().total_size(), before_total);
    assert_eq!(c.window().scroll_offset(), before_offset);
    assert!(!c.is_loading(LoadDirection::Older));
    // Retry is possible.
    assert!(c.poll_load().is_some());
}

#[test]
fn stale_epoch_page_is_discarded() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..20, 100), true);
    c.on_scroll(0, 0);

    let stale = c.poll_load().unwrap();
    c.switch_scope();
    assert_eq!(c.buffer().len(), 0);

    // The old scope's page arrives after the switch.
    assert!(!c.complete_load(stale, rows(-10..0, 100), true));
    assert_eq!(c.buffer().len(), 0);

    // The new scope loads from scratch.
    let ticket = c.poll_load().expect("initial load for new scope");
    assert!(c.complete_load(ticket, rows(100..110, 80), false));
    assert_eq!(c.buffer().len(), 10);
}

#[test]
fn append_rows_keeps_bottom_distance() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..20, 100), true);

    // Pinned at the bottom: appending keeps the view pinned.
    assert_eq!(c.window().scroll_offset(), c.window().max_scroll_offset());
    c.append_rows(rows(20..22, 100));
    assert_eq!(c.window().scroll_offset(), c.window().max_scroll_offset());
    assert_eq!(c.buffer().len(), 22);
}

#[test]
fn measured_rows_survive_prepend() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..10, 60), true);

    c.measure_row(&5, 144);
    let idx = c.buffer().index_of(&5).unwrap();
    assert_eq!(c.window().row_size(idx), Some(144));

    c.on_scroll(0, 0);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(-10..0, 60), true);

    let idx = c.buffer().index_of(&5).unwrap();
    assert_eq!(idx, 15);
    assert_eq!(c.window().row_size(idx), Some(144));
}

#[test]
fn request_load_newer_is_guarded() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(300);
    let ticket = c.poll_load().unwrap();
    c.complete_load(ticket, rows(0..10, 100), true);

    // The newer edge starts exhausted; a resume marks it live again.
    assert!(c.request_load(LoadDirection::Newer).is_none());

    // Completing an older load cannot release the newer guard.
    assert!(!c.is_loading(LoadDirection::Newer));
}
