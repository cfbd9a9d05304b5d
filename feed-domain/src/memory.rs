use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::FeedResult;
use crate::item::{Direction, ItemRecord, Membership, NewItem, OrderKey, Scope, UserProfile};
use crate::ports::{BoxFuture, FeedStore};
use crate::util::{now_ms, uuid_v7_without_dashes};

/// In-memory `FeedStore`. The stand-in for the append log: every operation
/// takes one lock, so inserts are atomic and reads see a consistent snapshot.
#[derive(Clone, Default)]
pub struct MemoryFeedStore {
    items: Arc<RwLock<HashMap<(String, String), ItemRecord>>>,
    scopes: Arc<RwLock<HashMap<String, Scope>>>,
    memberships: Arc<RwLock<HashMap<(String, String), Membership>>>,
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl MemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn scope_items_sorted(&self, scope_id: &str, visible_since_ms: i64) -> Vec<ItemRecord> {
        let items = self.items.read().await;
        let mut rows: Vec<ItemRecord> = items
            .values()
            .filter(|item| item.scope_id == scope_id && item.created_at_ms >= visible_since_ms)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }
}

impl FeedStore for MemoryFeedStore {
    fn insert_item(&self, item: &NewItem) -> BoxFuture<'_, FeedResult<ItemRecord>> {
        let item = item.clone();
        let items = self.items.clone();
        Box::pin(async move {
            let mut items = items.write().await;
            // Id and timestamp are assigned under the write lock; the row is
            // fully visible or not at all.
            let record = ItemRecord {
                id: uuid_v7_without_dashes(),
                scope_id: item.scope_id,
                author_id: item.author_id,
                content: item.content,
                kind: item.kind,
                created_at_ms: item.created_at_ms.unwrap_or_else(now_ms),
                thread_level: item.thread_level,
                parent_id: item.parent_id,
            };
            items.insert((record.scope_id.clone(), record.id.clone()), record.clone());
            Ok(record)
        })
    }

    fn list_page(
        &self,
        scope_id: &str,
        visible_since_ms: i64,
        cursor: Option<&OrderKey>,
        direction: Direction,
        fetch_limit: usize,
    ) -> BoxFuture<'_, FeedResult<Vec<ItemRecord>>> {
        let scope_id = scope_id.to_string();
        let cursor = cursor.cloned();
        Box::pin(async move {
            let rows = self.scope_items_sorted(&scope_id, visible_since_ms).await;

            let page: Vec<ItemRecord> = match direction {
                Direction::Older => rows
                    .into_iter()
                    .rev()
                    .filter(|row| match &cursor {
                        Some(key) => row.order_key() < *key,
                        None => true,
                    })
                    .take(fetch_limit)
                    .collect(),
                Direction::Newer => rows
                    .into_iter()
                    .filter(|row| match &cursor {
                        Some(key) => row.order_key() > *key,
                        None => true,
                    })
                    .take(fetch_limit)
                    .collect(),
            };
            Ok(page)
        })
    }

    fn count_items(
        &self,
        scope_id: &str,
        visible_since_ms: i64,
    ) -> BoxFuture<'_, FeedResult<u64>> {
        let scope_id = scope_id.to_string();
        Box::pin(async move {
            let rows = self.scope_items_sorted(&scope_id, visible_since_ms).await;
            Ok(rows.len() as u64)
        })
    }

    fn get_item(
        &self,
        scope_id: &str,
        item_id: &str,
    ) -> BoxFuture<'_, FeedResult<Option<ItemRecord>>> {
        let key = (scope_id.to_string(), item_id.to_string());
        let items = self.items.clone();
        Box::pin(async move {
            let items = items.read().await;
            Ok(items.get(&key).cloned())
        })
    }

    fn count_replies(&self, scope_id: &str, parent_id: &str) -> BoxFuture<'_, FeedResult<u64>> {
        let scope_id = scope_id.to_string();
        let parent_id = parent_id.to_string();
        let items = self.items.clone();
        Box::pin(async move {
            let items = items.read().await;
            let count = items
                .values()
                .filter(|item| {
                    item.scope_id == scope_id && item.parent_id.as_deref() == Some(&parent_id)
                })
                .count();
            Ok(count as u64)
        })
    }

    fn get_scope(&self, scope_id: &str) -> BoxFuture<'_, FeedResult<Option<Scope>>> {
        let scope_id = scope_id.to_string();
        let scopes = self.scopes.clone();
        Box::pin(async move {
            let scopes = scopes.read().await;
            Ok(scopes.get(&scope_id).cloned())
        })
    }

    fn put_scope(&self, scope: &Scope) -> BoxFuture<'_, FeedResult<Scope>> {
        let scope = scope.clone();
        let scopes = self.scopes.clone();
        Box::pin(async move {
            let mut scopes = scopes.write().await;
            scopes.insert(scope.id.clone(), scope.clone());
            Ok(scope)
        })
    }

    fn get_membership(
        &self,
        scope_id: &str,
        user_id: &str,
    ) -> BoxFuture<'_, FeedResult<Option<Membership>>> {
        let key = (scope_id.to_string(), user_id.to_string());
        let memberships = self.memberships.clone();
        Box::pin(async move {
            let memberships = memberships.read().await;
            Ok(memberships.get(&key).cloned())
        })
    }

    fn upsert_membership(
        &self,
        membership: &Membership,
    ) -> BoxFuture<'_, FeedResult<Membership>> {
        let membership = membership.clone();
        let memberships = self.memberships.clone();
        Box::pin(async move {
            let mut memberships = memberships.write().await;
            let key = (membership.scope_id.clone(), membership.user_id.clone());
            memberships.insert(key, membership.clone());
            Ok(membership)
        })
    }

    fn get_user(&self, user_id: &str) -> BoxFuture<'_, FeedResult<Option<UserProfile>>> {
        let user_id = user_id.to_string();
        let users = self.users.clone();
        Box::pin(async move {
            let users = users.read().await;
            Ok(users.get(&user_id).cloned())
        })
    }

    fn create_user(&self, user: &UserProfile) -> BoxFuture<'_, FeedResult<UserProfile>> {
        let user = user.clone();
        let users = self.users.clone();
        Box::pin(async move {
            let mut users = users.write().await;
            users.insert(user.id.clone(), user.clone());
            Ok(user)
        })
    }
}
