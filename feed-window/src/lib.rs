//! A headless windowed-rendering engine for long message feeds.
//!
//! Given a monotonically indexed row sequence and a per-row size (an estimate
//! until the row has been measured), this crate computes cumulative offsets,
//! the total scrollable extent, and the contiguous index range intersecting
//! the current viewport plus an overscan margin.
//!
//! It is UI-agnostic. A rendering layer is expected to provide:
//! - viewport size (height for vertical feeds)
//! - scroll offset
//! - row size estimates and (optionally) real measurements
//!
//! For scroll anchoring across asynchronous page loads, see the `feed-anchor`
//! crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod fenwick;
mod key;
mod options;
mod types;
mod window;


pub use options::{OnChangeCallback, WindowOptions};
pub use types::{Align, ItemKey, RowRange, ScrollDirection, WindowRow};
pub use window::ListWindow;

#[doc(hidden)]
pub use key::KeyCacheKey;
