use alloc::sync::Arc;
use alloc::vec::Vec;

use feed_window::{Align, ListWindow, WindowOptions};

use crate::{BottomDistanceAnchor, HeightDeltaAnchor, PageBuffer, PrependAnchor, RowKey, RowMeta};

/// Raw scroll offset (pixels from the top) at or below which an older page is
/// requested.
const NEAR_TOP_THRESHOLD_PX: u64 = 30;

/// The fetch direction of one page load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadDirection {
    /// Rows older than the current top edge (prepended).
    Older,
    /// Rows newer than the current bottom edge (appended).
    Newer,
}

/// A handle for one outstanding page load.
///
/// Issued by [`FeedController::poll_load`] / [`FeedController::request_load`]
/// and redeemed with [`FeedController::complete_load`] or
/// [`FeedController::fail_load`]. The ticket snapshots the pre-load viewport
/// (for anchor restoration) and the scope epoch (so a page that arrives after
/// a scope switch is discarded).
#[derive(Clone, Copy, Debug)]
pub struct LoadTicket {
    direction: LoadDirection,
    epoch: u64,
    total_before: u64,
    offset_before: u64,
}

impl LoadTicket {
    pub fn direction(&self) -> LoadDirection {
        self.direction
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Drives a message-feed viewport: decides when to fetch, merges fetched
/// pages, and keeps the scroll position visually stable while doing so.
///
/// The controller is transport-agnostic. The adapter loop looks like:
///
/// 1. feed UI events in (`set_viewport_size`, `on_scroll`, `measure_row`)
/// 2. call `poll_load()`; if it returns a ticket, start the fetch
/// 3. when the fetch resolves, call `complete_load(ticket, rows, has_more)`
///    (or `fail_load(ticket)` on error)
/// 4. render `window().for_each_row(..)`
pub struct FeedController<K> {
    window: ListWindow<K>,
    buffer: PageBuffer<K>,
    epoch: u64,
    older_in_flight: bool,
    newer_in_flight: bool,
    has_more_older: bool,
    has_more_newer: bool,
    did_initial_jump: bool,
    near_top_px: u64,
    prepend_anchor: PrependAnchor,
}

impl<K: RowKey + Send + Sync + 'static> FeedController<K> {
    pub fn new() -> Self {
        let keys: Arc<[K]> = Arc::from(Vec::new());
        let heights: Arc<[u32]> = Arc::from(Vec::new());
        let options = WindowOptions::new_with_key(
            0,
            move |i| heights[i],
            move |i| keys[i].clone(),
        );
        Self {
            window: ListWindow::new(options),
            buffer: PageBuffer::new(),
            epoch: 0,
            older_in_flight: false,
            newer_in_flight: false,
            has_more_older: true,
            has_more_newer: false,
            did_initial_jump: false,
            near_top_px: NEAR_TOP_THRESHOLD_PX,
            prepend_anchor: PrependAnchor::HeightDelta,
        }
    }

    pub fn window(&self) -> &ListWindow<K> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut ListWindow<K> {
        &mut self.window
    }

    pub fn buffer(&self) -> &PageBuffer<K> {
        &self.buffer
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn set_near_top_threshold(&mut self, px: u64) {
        self.near_top_px = px;
    }

    pub fn set_prepend_anchor(&mut self, anchor: PrependAnchor) {
        self.prepend_anchor = anchor;
    }

    pub fn is_loading(&self, direction: LoadDirection) -> bool {
        match direction {
            LoadDirection::Older => self.older_in_flight,
            LoadDirection::Newer => self.newer_in_flight,
        }
    }

    pub fn has_more(&self, direction: LoadDirection) -> bool {
        match direction {
            LoadDirection::Older => self.has_more_older,
            LoadDirection::Newer => self.has_more_newer,
        }
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        self.window.set_viewport_size(size);
    }

    /// Call when the UI reports a scroll offset change (wheel/drag).
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        self.window.apply_scroll_offset_event_clamped(offset, now_ms);
    }

    /// Advance timers (`is_scrolling` debouncing). Call each frame tick.
    pub fn tick(&mut self, now_ms: u64) {
        self.window.update_scrolling(now_ms);
    }

    /// Records a real row measurement, keyed so it survives prepends.
    pub fn measure_row(&mut self, key: &K, size: u32) {
        if let Some(index) = self.buffer.index_of(key) {
            self.window.measure_keyed(index, key.clone(), size);
        }
    }

    /// Checks the near-top triggers and, at most once per outstanding fetch,
    /// hands out a ticket for an older page load.
    ///
    /// Two triggers are checked: the first rendered row reaching index 0, and
    /// the raw offset dropping to the near-top threshold. Firing both on the
    /// same frame still yields one ticket; the per-direction in-flight guard
    /// holds until the ticket is redeemed.
    pub fn poll_load(&mut self) -> Option<LoadTicket> {
        if self.older_in_flight || !self.has_more_older {
            return None;
        }
        if self.should_load_older() {
            return Some(self.issue(LoadDirection::Older));
        }
        None
    }

    /// Explicitly requests a load (e.g. a "load newer" resume after
    /// reconnect). Returns `None` while a load in that direction is already
    /// outstanding or the edge is exhausted.
    pub fn request_load(&mut self, direction: LoadDirection) -> Option<LoadTicket> {
        if self.is_loading(direction) || !self.has_more(direction) {
            return None;
        }
        Some(self.issue(direction))
    }

    fn should_load_older(&self) -> bool {
        // Nothing buffered yet: the initial page.
        if self.buffer.is_empty() {
            return true;
        }
        // Until the one-shot jump to the bottom has happened the offset sits
        // near 0, which must not count as "scrolled to the top".
        if !self.did_initial_jump {
            return false;
        }
        let range = self.window.window_range();
        let first_rendered_at_top = !range.is_empty() && range.start_index == 0;
        first_rendered_at_top || self.window.scroll_offset() <= self.near_top_px
    }

    fn issue(&mut self, direction: LoadDirection) -> LoadTicket {
        match direction {
            LoadDirection::Older => self.older_in_flight = true,
            LoadDirection::Newer => self.newer_in_flight = true,
        }
        LoadTicket {
            direction,
            epoch: self.epoch,
            total_before: self.window.total_size(),
            offset_before: self.window.scroll_offset(),
        }
    }

    /// Applies a completed page load.
    ///
    /// Returns `false` (and changes nothing) when the ticket's epoch is stale,
    /// i.e. the scope was switched while the fetch was in flight.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        rows: impl IntoIterator<Item = RowMeta<K>>,
        has_more: bool,
    ) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        match ticket.direction {
            LoadDirection::Older => {
                self.older_in_flight = false;
                self.has_more_older = has_more;
            }
            LoadDirection::Newer => {
                self.newer_in_flight = false;
                self.has_more_newer = has_more;
            }
        }

        let added = self.buffer.merge(rows);
        if added == 0 {
            return true;
        }
        self.rebuild_window();

        if !self.did_initial_jump {
            // First non-empty page: land at the newest row, exactly once.
            if !self.buffer.is_empty() {
                self.window
                    .scroll_to_index(self.buffer.len() - 1, Align::End);
                self.did_initial_jump = true;
            }
            return true;
        }

        match ticket.direction {
            LoadDirection::Older => match self.prepend_anchor {
                PrependAnchor::HeightDelta => {
                    HeightDeltaAnchor::from_parts(ticket.total_before, ticket.offset_before)
                        .apply(&mut self.window);
                }
                PrependAnchor::BottomDistance => {
                    BottomDistanceAnchor::from_parts(ticket.total_before, ticket.offset_before)
                        .apply(&mut self.window);
                }
            },
            LoadDirection::Newer => {
                BottomDistanceAnchor::from_parts(ticket.total_before, ticket.offset_before)
                    .apply(&mut self.window);
            }
        }
        true
    }

    /// Releases the in-flight guard after a failed fetch. The rendered window
    /// is left untouched; the next `poll_load` may retry.
    pub fn fail_load(&mut self, ticket: LoadTicket) {
        if ticket.epoch != self.epoch {
            return;
        }
        match ticket.direction {
            LoadDirection::Older => self.older_in_flight = false,
            LoadDirection::Newer => self.newer_in_flight = false,
        }
    }

    /// Appends locally created rows (optimistic insert / realtime delivery),
    /// keeping the distance to the bottom edge constant.
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = RowMeta<K>>) {
        let anchor = BottomDistanceAnchor::capture(&self.window);
        let added = self.buffer.merge(rows);
        if added == 0 {
            return;
        }
        self.rebuild_window();
        if self.did_initial_jump {
            anchor.apply(&mut self.window);
        } else if !self.buffer.is_empty() {
            self.window
                .scroll_to_index(self.buffer.len() - 1, Align::End);
            self.did_initial_jump = true;
        }
    }

    /// Switches to another scope: bumps the epoch (so in-flight pages for the
    /// old scope are discarded on arrival) and resets the buffer, the window
    /// and the one-shot bottom jump.
    pub fn switch_scope(&mut self) {
        self.epoch += 1;
        self.older_in_flight = false;
        self.newer_in_flight = false;
        self.has_more_older = true;
        self.has_more_newer = false;
        self.did_initial_jump = false;
        self.buffer.clear();
        self.window.reset_measurements();
        self.rebuild_window();
        self.window.set_scroll_offset(0);
    }

    fn rebuild_window(&mut self) {
        let keys: Arc<[K]> = self.buffer.rows().iter().map(|r| r.key.clone()).collect();
        let heights: Arc<[u32]> = self
            .buffer
            .rows()
            .iter()
            .map(|r| r.estimated_height)
            .collect();

        let mut options = self.window.options().clone();
        options.count = self.buffer.len();
        options.estimate_size = Arc::new(move |i| heights[i]);
        options.get_item_key = Arc::new({
            let keys = Arc::clone(&keys);
            move |i| keys[i].clone()
        });
        self.window.set_options(options);
    }
}

impl<K: RowKey + Send + Sync + 'static> Default for FeedController<K> {
    fn default() -> Self {
        Self::new()
    }
}
