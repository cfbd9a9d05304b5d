// Example: load older pages above the viewport without visual jumps.
use feed_anchor::{FeedController, RowMeta};

fn page(ts: std::ops::Range<i64>) -> Vec<RowMeta<u64>> {
    ts.map(|t| RowMeta {
        key: t as u64,
        created_at_ms: t,
        estimated_height: 60 + (t.unsigned_abs() % 3) as u32 * 20,
    })
    .collect()
}

fn main() {
    let mut c: FeedController<u64> = FeedController::new();
    c.set_viewport_size(400);

    // The controller asks for the initial page and lands at the newest row.
    let ticket = c.poll_load().expect("initial page");
    c.complete_load(ticket, page(100..150), true);
    println!(
        "after initial page: offset={} total={}",
        c.window().scroll_offset(),
        c.window().total_size()
    );

    // The user scrolls to the top; the near-top trigger fires once.
    c.on_scroll(0, 0);
    let ticket = c.poll_load().expect("older page");
    assert!(c.poll_load().is_none(), "guard holds while in flight");

    // The older page arrives; the offset shifts by the prepended height so
    // the rows on screen do not move.
    c.complete_load(ticket, page(50..100), true);
    println!(
        "after prepend: offset={} total={} rows={}",
        c.window().scroll_offset(),
        c.window().total_size(),
        c.buffer().len()
    );

    let mut rows = Vec::new();
    c.window().collect_rows(&mut rows);
    println!("first rendered row: {:?}", rows.first());
}
