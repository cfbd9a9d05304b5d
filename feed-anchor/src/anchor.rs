use feed_window::ListWindow;

use crate::RowKey;

/// Which anchor strategy to use when older pages are prepended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrependAnchor {
    /// Shift the offset by the growth in total extent.
    HeightDelta,
    /// Keep the distance to the bottom edge constant.
    BottomDistance,
}

/// Keeps the viewport's distance to the bottom edge constant across a change
/// in total extent.
///
/// `distance = total - offset` at capture time; applying sets
/// `offset = total' - distance`. With `total = 1000`, `offset = 700` and a
/// new total of `1500`, the restored offset is `1200`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BottomDistanceAnchor {
    pub distance: u64,
}

impl BottomDistanceAnchor {
    pub fn capture<K: RowKey>(window: &ListWindow<K>) -> Self {
        Self::from_parts(window.total_size(), window.scroll_offset())
    }

    pub fn from_parts(total: u64, offset: u64) -> Self {
        Self {
            distance: total.saturating_sub(offset),
        }
    }

    pub fn apply<K: RowKey>(&self, window: &mut ListWindow<K>) -> u64 {
        let target = window.total_size().saturating_sub(self.distance);
        window.set_scroll_offset_clamped(target);
        window.scroll_offset()
    }
}

/// Shifts the scroll offset by exactly the growth in total extent, so the row
/// that was at the top of the viewport stays there after a prepend.
///
/// Applying sets `offset = total' - total + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightDeltaAnchor {
    pub total: u64,
    pub offset: u64,
}

impl HeightDeltaAnchor {
    pub fn capture<K: RowKey>(window: &ListWindow<K>) -> Self {
        Self {
            total: window.total_size(),
            offset: window.scroll_offset(),
        }
    }

    pub fn from_parts(total: u64, offset: u64) -> Self {
        Self { total, offset }
    }

    pub fn apply<K: RowKey>(&self, window: &mut ListWindow<K>) -> u64 {
        // total' - total + offset, ordered so shrinks also resolve correctly.
        let target = window
            .total_size()
            .saturating_add(self.offset)
            .saturating_sub(self.total);
        window.set_scroll_offset_clamped(target);
        window.scroll_offset()
    }
}
