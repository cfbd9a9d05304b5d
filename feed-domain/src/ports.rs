use std::future::Future;
use std::pin::Pin;

use crate::FeedResult;
use crate::item::{Direction, ItemRecord, Membership, NewItem, OrderKey, Scope, UserProfile};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Storage port for the feed. The in-memory implementation stands in for the
/// append log; a SQL adapter would implement the same contract.
pub trait FeedStore: Send + Sync {
    /// Atomically assigns an id (and a timestamp when `created_at_ms` is
    /// `None`) and appends the item. Either the full row lands or nothing.
    fn insert_item(&self, item: &NewItem) -> BoxFuture<'_, FeedResult<ItemRecord>>;

    /// Returns up to `fetch_limit` rows of one scope, restricted to
    /// `created_at_ms >= visible_since_ms`, positioned strictly beyond
    /// `cursor` in `direction`.
    ///
    /// Ordering of the result follows the fetch direction: `Older` rows come
    /// back descending (newest first), `Newer` rows ascending.
    fn list_page(
        &self,
        scope_id: &str,
        visible_since_ms: i64,
        cursor: Option<&OrderKey>,
        direction: Direction,
        fetch_limit: usize,
    ) -> BoxFuture<'_, FeedResult<Vec<ItemRecord>>>;

    fn count_items(
        &self,
        scope_id: &str,
        visible_since_ms: i64,
    ) -> BoxFuture<'_, FeedResult<u64>>;

    fn get_item(
        &self,
        scope_id: &str,
        item_id: &str,
    ) -> BoxFuture<'_, FeedResult<Option<ItemRecord>>>;

    fn count_replies(&self, scope_id: &str, parent_id: &str) -> BoxFuture<'_, FeedResult<u64>>;

    fn get_scope(&self, scope_id: &str) -> BoxFuture<'_, FeedResult<Option<Scope>>>;

    /// Inserts or replaces a scope (replacement carries soft deletes).
    fn put_scope(&self, scope: &Scope) -> BoxFuture<'_, FeedResult<Scope>>;

    fn get_membership(
        &self,
        scope_id: &str,
        user_id: &str,
    ) -> BoxFuture<'_, FeedResult<Option<Membership>>>;

    fn upsert_membership(
        &self,
        membership: &Membership,
    ) -> BoxFuture<'_, FeedResult<Membership>>;

    fn get_user(&self, user_id: &str) -> BoxFuture<'_, FeedResult<Option<UserProfile>>>;

    fn create_user(&self, user: &UserProfile) -> BoxFuture<'_, FeedResult<UserProfile>>;
}
