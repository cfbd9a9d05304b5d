//! Domain layer for the spacefeed message service.
//!
//! Holds the item model, the cursor codec, the pagination and create
//! operations (`FeedService`), server-side height estimation, and the
//! `FeedStore` port with its in-memory implementation.

pub mod error;
pub mod estimate;
pub mod identity;
pub mod item;
pub mod memory;
pub mod ports;
pub mod service;
pub mod util;

pub type FeedResult<T> = Result<T, error::FeedError>;
