//! Adapter utilities for the `feed-window` crate.
//!
//! The `feed-window` crate is UI-agnostic and focuses on the core math and
//! state. This crate provides the pieces a message-feed adapter needs on top:
//!
//! - Scroll anchoring (prepend older pages without visual jumps)
//! - A client-side page buffer that merges and orders fetched rows
//! - A controller that turns scroll positions into load requests and applies
//!   completed pages back to the window
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod anchor;
mod buffer;
mod controller;
mod key;

#[cfg(test)]
mod tests;

pub use anchor::{BottomDistanceAnchor, HeightDeltaAnchor, PrependAnchor};
pub use buffer::{PageBuffer, RowMeta};
pub use controller::{FeedController, LoadDirection, LoadTicket};
pub use key::RowKey;
