use serde::{Deserialize, Serialize};

use crate::FeedResult;
use crate::error::FeedError;

pub const MAX_CONTENT_LENGTH: usize = 5_000;
pub const PAGE_LIMIT_DEFAULT: usize = 50;
pub const PAGE_LIMIT_MAX: usize = 100;
/// Replies may nest one level deep: a root item (level 0) can be replied to,
/// a reply (level 1) cannot.
pub const MAX_THREAD_LEVEL: u8 = 1;
pub const PARENT_PREVIEW_LENGTH: usize = 100;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Text,
    Attachment,
    System,
}

/// A stored feed item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRecord {
    /// uuid v7 without dashes: opaque, strictly and totally ordered.
    pub id: String,
    pub scope_id: String,
    pub author_id: String,
    pub content: String,
    pub kind: ItemKind,
    pub created_at_ms: i64,
    pub thread_level: u8,
    pub parent_id: Option<String>,
}

impl ItemRecord {
    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            created_at_ms: self.created_at_ms,
            id: self.id.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentPreview {
    pub id: String,
    /// First 100 characters of the parent's content.
    pub content_preview: String,
    pub author_username: String,
}

/// The shape returned to clients: the record plus the joined fields the list
/// view renders without further requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub scope_id: String,
    pub author_id: String,
    pub content: String,
    pub kind: ItemKind,
    pub created_at_ms: i64,
    pub thread_level: u8,
    pub parent_id: Option<String>,
    pub author: UserProfile,
    pub parent_preview: Option<ParentPreview>,
    pub reply_count: u64,
    /// Server-side height estimate for the windowed renderer.
    pub estimated_height: u32,
}

/// The total order over feed items: `(created_at_ms, id)` ascending.
///
/// Serialized as the opaque cursor string `"{created_at_ms}:{id}"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderKey {
    pub created_at_ms: i64,
    pub id: String,
}

impl OrderKey {
    pub fn encode(&self) -> String {
        format!("{}:{}", self.created_at_ms, self.id)
    }

    pub fn decode(cursor: &str) -> FeedResult<Self> {
        let Some((ts, id)) = cursor.split_once(':') else {
            return Err(FeedError::Validation("malformed cursor".into()));
        };
        let created_at_ms: i64 = ts
            .parse()
            .map_err(|_| FeedError::Validation("malformed cursor".into()))?;
        if id.is_empty() {
            return Err(FeedError::Validation("malformed cursor".into()));
        }
        Ok(Self {
            created_at_ms,
            id: id.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Items older than the cursor, for scrolling up.
    #[default]
    Older,
    /// Items newer than the cursor, for catching up.
    Newer,
}

impl Direction {
    pub fn parse(value: &str) -> FeedResult<Self> {
        match value {
            "older" => Ok(Self::Older),
            "newer" => Ok(Self::Newer),
            other => Err(FeedError::Validation(format!(
                "direction must be older or newer, got {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub direction: Direction,
    pub limit: Option<usize>,
}

/// One page of the feed.
///
/// `items` are always ascending by order key. `next_cursor` continues in the
/// queried direction (present only while more rows exist); `previous_cursor`
/// points back the other way and is present whenever the page is non-empty.
/// `total_count` is computed only for the cursor-less first request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<ItemView>,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
    pub has_more: bool,
    pub total_count: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scope {
    pub id: String,
    pub name: String,
    /// Soft delete: a deleted scope denies access but keeps its items.
    pub deleted_at_ms: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub scope_id: String,
    pub user_id: String,
    /// Visibility floor: members only see items created at or after this.
    pub joined_at_ms: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemCreate {
    pub content: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Input to the store's atomic insert. The store assigns `id` and, when
/// `created_at_ms` is `None`, the insert-time timestamp.
#[derive(Clone, Debug)]
pub struct NewItem {
    pub scope_id: String,
    pub author_id: String,
    pub content: String,
    pub kind: ItemKind,
    pub thread_level: u8,
    pub parent_id: Option<String>,
    pub created_at_ms: Option<i64>,
}
