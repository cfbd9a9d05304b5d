use alloc::sync::Arc;

use crate::ItemKey;
use crate::window::ListWindow;

/// A callback fired when a window state update occurs.
///
/// The second argument is `is_scrolling`. Anchor controllers typically use it
/// to snapshot viewport state only while the user is actually scrolling.
pub type OnChangeCallback<K> = Arc<dyn Fn(&ListWindow<K>, bool) + Send + Sync>;

/// Configuration for [`crate::ListWindow`].
///
/// Cheap to clone: closures are stored in `Arc`s so adapters can update a few
/// fields and call `ListWindow::set_options` without reallocating.
pub struct WindowOptions<K = ItemKey> {
    /// Number of rows in the data set.
    pub count: usize,

    /// Returns the estimated row size for an index. Used until the row has
    /// been measured.
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,

    /// Returns a stable identity for the row at an index.
    ///
    /// Measured sizes are cached per key, so measurements survive the
    /// reindexing caused by prepending older pages.
    pub get_item_key: Arc<dyn Fn(usize) -> K + Send + Sync>,

    /// Extra rows rendered beyond the strictly visible range.
    pub overscan: usize,

    /// Initial scroll offset.
    pub initial_offset: u64,

    /// Optional callback fired when the window's internal state changes.
    pub on_change: Option<OnChangeCallback<K>>,

    /// Debounce duration after which `is_scrolling` resets without further
    /// scroll events.
    pub is_scrolling_reset_delay_ms: u64,
}

impl<K> Clone for WindowOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            get_item_key: Arc::clone(&self.get_item_key),
            overscan: self.overscan,
            initial_offset: self.initial_offset,
            on_change: self.on_change.clone(),
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
        }
    }
}

impl WindowOptions<ItemKey> {
    /// Creates options for a list keyed by index (`ItemKey = u64`).
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            get_item_key: Arc::new(|i| i as u64),
            overscan: 1,
            initial_offset: 0,
            on_change: None,
            is_scrolling_reset_delay_ms: 150,
        }
    }
}

impl<K> WindowOptions<K> {
    /// Creates options with a custom key mapping.
    ///
    /// Use this when measurements must follow rows across reindexing (e.g.
    /// message ids in a feed that grows at the top).
    pub fn new_with_key(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            get_item_key: Arc::new(get_item_key),
            overscan: 1,
            initial_offset: 0,
            on_change: None,
            is_scrolling_reset_delay_ms: 150,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&ListWindow<K>, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }
}

impl<K> core::fmt::Debug for WindowOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("initial_offset", &self.initial_offset)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
