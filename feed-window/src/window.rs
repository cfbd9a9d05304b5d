use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::fenwick::Fenwick;
use crate::key::{KeyCacheKey, KeySizeMap};
use crate::{Align, ItemKey, RowRange, ScrollDirection, WindowOptions, WindowRow};

/// A headless windowed-rendering engine.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects.
/// - Your adapter drives it by providing viewport size and scroll offsets.
/// - Rendering is exposed via zero-allocation iteration (`for_each_row`).
///
/// Per-row sizes start as estimates and are replaced by real measurements via
/// [`Self::measure`]. Cumulative offsets are kept in a Fenwick tree, so
/// measuring a row updates all downstream offsets in `O(log n)`.
///
/// For anchoring patterns across asynchronous page loads, see the
/// `feed-anchor` crate.
#[derive(Clone, Debug)]
pub struct ListWindow<K = ItemKey> {
    options: WindowOptions<K>,
    viewport_size: u32,
    scroll_offset: u64,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,

    sizes: Vec<u32>,
    measured: Vec<bool>,
    sums: Fenwick,
    key_sizes: KeySizeMap<K>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K: KeyCacheKey> ListWindow<K> {
    /// Creates a new window from options.
    pub fn new(options: WindowOptions<K>) -> Self {
        let scroll_offset = options.initial_offset;
        wdebug!(
            count = options.count,
            overscan = options.overscan,
            "ListWindow::new"
        );
        let mut w = Self {
            viewport_size: 0,
            scroll_offset,
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            sizes: Vec::new(),
            measured: Vec::new(),
            sums: Fenwick::new(0),
            key_sizes: KeySizeMap::<K>::new(),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        w.rebuild_estimates();
        w
    }

    pub fn options(&self) -> &WindowOptions<K> {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowOptions<K>) {
        let prev_count = self.options.count;
        let estimate_size_unchanged =
            Arc::ptr_eq(&self.options.estimate_size, &options.estimate_size);
        let get_item_key_unchanged = Arc::ptr_eq(&self.options.get_item_key, &options.get_item_key);
        self.options = options;
        wtrace!(
            count = self.options.count,
            overscan = self.options.overscan,
            "ListWindow::set_options"
        );

        if self.options.count != prev_count || !estimate_size_unchanged || !get_item_key_unchanged {
            self.rebuild_estimates();
        }

        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to
    /// `set_options` which decides what needs rebuilding.
    pub fn update_options(&mut self, f: impl FnOnce(&mut WindowOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&ListWindow<K>, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame an adapter updates the viewport size, scroll offset
    /// and scrolling state together; without batching each setter would fire
    /// `on_change` separately.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        self.options.count = count;
        self.rebuild_estimates();
        self.notify();
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
        self.notify();
    }

    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    /// Resets `is_scrolling` once no scroll event arrived for the configured
    /// debounce delay. Call this from a frame/timer tick.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.set_is_scrolling(false);
        }
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size {
            return;
        }
        self.viewport_size = size;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Applies a scroll offset update from your UI layer (e.g. wheel/drag),
    /// and marks the window as scrolling.
    pub fn apply_scroll_offset_event(&mut self, offset: u64, now_ms: u64) {
        wtrace!(offset, now_ms, "apply_scroll_offset_event");
        self.batch_update(|w| {
            w.set_scroll_offset(offset);
            w.notify_scroll_event(now_ms);
        });
    }

    /// Same as `apply_scroll_offset_event`, but clamps the offset.
    pub fn apply_scroll_offset_event_clamped(&mut self, offset: u64, now_ms: u64) {
        wtrace!(offset, now_ms, "apply_scroll_offset_event_clamped");
        self.batch_update(|w| {
            w.set_scroll_offset_clamped(offset);
            w.notify_scroll_event(now_ms);
        });
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|w| {
            w.set_viewport_size(viewport_size);
            w.set_scroll_offset_clamped(scroll_offset);
        });
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_estimate_size(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.estimate_size = Arc::new(f);
        self.rebuild_estimates();
        self.notify();
    }

    pub fn set_get_item_key(&mut self, f: impl Fn(usize) -> K + Send + Sync + 'static) {
        self.options.get_item_key = Arc::new(f);
        self.rebuild_estimates();
        self.notify();
    }

    /// Rebuilds per-index sizes from the key-based measurement cache and
    /// current estimates.
    ///
    /// Call this after the underlying data set was reordered or replaced
    /// while `count` stayed the same.
    pub fn sync_keys(&mut self) {
        let count = self.options.count;
        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(count);
        self.measured.reserve_exact(count);

        for i in 0..count {
            let key = self.key_for(i);
            if let Some(&measured_size) = self.key_sizes.get(&key) {
                self.sizes.push(measured_size);
                self.measured.push(true);
            } else {
                self.sizes.push((self.options.estimate_size)(i));
                self.measured.push(false);
            }
        }

        self.rebuild_fenwick();
        self.notify();
    }

    pub fn reset_measurements(&mut self) {
        self.key_sizes.clear();
        self.rebuild_estimates();
        self.notify();
    }

    /// Records a real measurement for the row at `index`.
    ///
    /// When the measured row starts above the current scroll offset, the
    /// offset is shifted by the size delta so visible content does not jump.
    /// Returns the applied offset delta (0 when nothing changed).
    pub fn measure(&mut self, index: usize, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let key = self.key_for(index);
        self.measure_keyed(index, key, size)
    }

    pub fn measure_keyed(&mut self, index: usize, key: K, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let row = self.row(index);
        let delta = self.set_row_size_keyed(index, key, size);
        if delta == 0 {
            self.notify();
            return 0;
        }
        wtrace!(index, size, delta, "measure_keyed");

        if row.start < self.scroll_offset {
            if delta > 0 {
                self.scroll_offset = self.scroll_offset.saturating_add(delta as u64);
            } else {
                self.scroll_offset = self.scroll_offset.saturating_sub((-delta) as u64);
            }
            self.notify();
            delta
        } else {
            self.notify();
            0
        }
    }

    /// Records a measurement without adjusting the scroll offset.
    pub fn measure_unadjusted(&mut self, index: usize, size: u32) {
        if index >= self.options.count {
            return;
        }
        let key = self.key_for(index);
        self.set_row_size_keyed(index, key, size);
        self.notify();
    }

    /// Applies many measurements in one notification, without scroll
    /// adjustment.
    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        for (index, size) in measurements {
            if index >= self.options.count {
                continue;
            }
            let key = self.key_for(index);
            self.set_row_size_keyed(index, key, size);
        }
        self.notify();
    }

    // Returns the size delta, or 0 when the size did not change. The
    // unchanged case still marks the row measured and refreshes the key
    // cache, so the expensive Fenwick update runs at most once per distinct
    // measured change.
    fn set_row_size_keyed(&mut self, index: usize, key: K, size: u32) -> i64 {
        let cur = self.sizes[index];
        if cur == size {
            self.measured[index] = true;
            self.key_sizes.insert(key, size);
            return 0;
        }
        self.sizes[index] = size;
        self.measured[index] = true;
        self.key_sizes.insert(key, size);
        let delta = size as i64 - cur as i64;
        self.sums.add(index, delta);
        delta
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Total scrollable extent: the running sum of all per-row sizes.
    pub fn total_size(&self) -> u64 {
        self.sums.total()
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.get_item_key)(index)
    }

    /// The visible range plus the overscan margin.
    pub fn window_range(&self) -> RowRange {
        let mut range = self.visible_range();
        if range.is_empty() {
            return range;
        }
        let count = self.options.count;
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(count, range.end_index.saturating_add(overscan));
        range
    }

    /// The range of rows strictly intersecting the viewport.
    pub fn visible_range(&self) -> RowRange {
        self.visible_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> RowRange {
        self.compute_visible_range(scroll_offset, viewport_size)
    }

    /// Iterates the overscanned window rows without allocating.
    pub fn for_each_row(&self, f: impl FnMut(WindowRow)) {
        self.for_each_row_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_row_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(WindowRow),
    ) {
        let visible = self.visible_range_for(scroll_offset, viewport_size);
        if visible.is_empty() {
            return;
        }

        let count = self.options.count;
        let overscan = self.options.overscan;
        let start_index = visible.start_index.saturating_sub(overscan);
        let end_index = cmp::min(count, visible.end_index.saturating_add(overscan));
        if start_index >= end_index {
            return;
        }

        let mut start = self.start_of(start_index);
        for i in start_index..end_index {
            let size = self.sizes[i];
            f(WindowRow {
                index: i,
                start,
                size,
            });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects the overscanned window rows into `out` (clears `out` first).
    ///
    /// Convenience wrapper around [`Self::for_each_row`]; adapters that care
    /// about allocations should reuse a scratch buffer.
    pub fn collect_rows(&self, out: &mut Vec<WindowRow>) {
        out.clear();
        self.for_each_row(|row| out.push(row));
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.count;
        if count == 0 {
            return None;
        }
        Some(self.sums.lower_bound(offset).min(count - 1))
    }

    pub fn row_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.start_of(index))
    }

    pub fn row_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn row_end(&self, index: usize) -> Option<u64> {
        let start = self.row_start(index)?;
        let size = self.row_size(index)? as u64;
        Some(start.saturating_add(size))
    }

    /// Programmatically scrolls to an index (no animation).
    ///
    /// Sets the internal `scroll_offset` to the computed (clamped) target and
    /// triggers `on_change`. It does **not** mark the window as "scrolling".
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.options.count == 0 {
            return 0;
        }
        let index = index.min(self.options.count - 1);
        let start = self.start_of(index);
        let end = start.saturating_add(self.sizes[index] as u64);
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
        };

        self.clamp_scroll_offset(target)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        let total = self.total_size();
        let view = self.viewport_size as u64;
        total.saturating_sub(view)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    fn rebuild_estimates(&mut self) {
        wdebug!(
            count = self.options.count,
            cached = self.key_sizes.len(),
            "rebuild_estimates"
        );
        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(self.options.count);
        self.measured.reserve_exact(self.options.count);

        for i in 0..self.options.count {
            let key = self.key_for(i);
            if let Some(&measured_size) = self.key_sizes.get(&key) {
                self.sizes.push(measured_size);
                self.measured.push(true);
            } else {
                self.sizes.push((self.options.estimate_size)(i));
                self.measured.push(false);
            }
        }
        self.rebuild_fenwick();
    }

    fn rebuild_fenwick(&mut self) {
        self.sums = Fenwick::from_sizes(&self.sizes);
    }

    fn row(&self, index: usize) -> WindowRow {
        WindowRow {
            index,
            start: self.start_of(index),
            size: self.sizes[index],
        }
    }

    fn start_of(&self, index: usize) -> u64 {
        self.sums.prefix_sum(index)
    }

    fn compute_visible_range(&self, scroll_offset: u64, viewport_size: u32) -> RowRange {
        let count = self.options.count;
        if count == 0 || viewport_size == 0 {
            return RowRange {
                start_index: 0,
                end_index: 0,
            };
        }

        let view = viewport_size as u64;
        let total = self.total_size();
        let scroll_offset = scroll_offset.min(total.saturating_sub(view));

        if scroll_offset >= total {
            return RowRange {
                start_index: count,
                end_index: count,
            };
        }

        let visible_start = scroll_offset;
        let visible_end_inclusive = cmp::max(
            scroll_offset.saturating_add(view).saturating_sub(1),
            visible_start,
        );

        let start = self.sums.lower_bound(visible_start).min(count - 1);
        let end = self
            .sums
            .lower_bound(visible_end_inclusive)
            .min(count - 1)
            .saturating_add(1);

        RowRange {
            start_index: start.min(count),
            end_index: end.min(count),
        }
    }
}
