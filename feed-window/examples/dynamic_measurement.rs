// Example: dynamic measurement and scroll jump prevention.
use feed_window::{Align, ListWindow, WindowOptions};

fn main() {
    let mut w = ListWindow::new(WindowOptions::new(100, |_| 60));
    w.set_viewport_and_scroll_clamped(300, 2_000);

    println!(
        "before: off={} total={} range={:?}",
        w.scroll_offset(),
        w.total_size(),
        w.window_range()
    );

    // If a row before the viewport changes size, `measure` adjusts the scroll
    // offset to prevent visual jumps.
    let applied = w.measure(0, 180);
    println!(
        "measure(0): applied_delta={applied} off={} total={}",
        w.scroll_offset(),
        w.total_size()
    );

    // To record a size without touching scroll, use `measure_unadjusted`.
    w.measure_unadjusted(2, 120);

    // Scroll-to helpers work with updated measurements.
    let to = w.scroll_to_index_offset(10, Align::Start);
    w.set_scroll_offset_clamped(to);
    println!(
        "scroll_to_index_offset(10): off={} range={:?}",
        w.scroll_offset(),
        w.window_range()
    );
}
