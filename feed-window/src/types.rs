/// Alignment policy for [`crate::ListWindow::scroll_to_index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    /// Place the row's start edge at the top of the viewport.
    Start,
    /// Place the row's end edge at the bottom of the viewport.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// A contiguous index range of rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl RowRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }
}

/// A row positioned in the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRow {
    pub index: usize,
    /// Start offset in the scroll axis.
    pub start: u64,
    /// Size in the scroll axis (measured if known, else the estimate).
    pub size: u32,
}

impl WindowRow {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

pub type ItemKey = u64;
