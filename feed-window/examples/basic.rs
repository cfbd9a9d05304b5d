// Example: minimal usage and scroll-to helper.
use feed_window::{Align, ListWindow, WindowOptions};

fn main() {
    let mut w = ListWindow::new(WindowOptions::new(1_000_000, |_| 60));
    w.set_viewport_and_scroll_clamped(600, 123_456);

    let mut rows = Vec::new();
    w.collect_rows(&mut rows);
    println!("total_size={}", w.total_size());
    println!("window_range={:?}", w.window_range());
    println!("first_row={:?}", rows.first());

    let off = w.scroll_to_index_offset(999_999, Align::End);
    w.set_scroll_offset_clamped(off);
    println!("after scroll_to_index: offset={}", w.scroll_offset());
}
