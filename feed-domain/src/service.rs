use std::sync::Arc;

use crate::FeedResult;
use crate::error::FeedError;
use crate::estimate::{EstimateInput, estimate_height};
use crate::identity::ActorIdentity;
use crate::item::{
    Direction, FeedPage, ItemCreate, ItemRecord, ItemView, MAX_CONTENT_LENGTH, MAX_THREAD_LEVEL,
    Membership, NewItem, OrderKey, PAGE_LIMIT_DEFAULT, PAGE_LIMIT_MAX, PARENT_PREVIEW_LENGTH,
    PageQuery, ParentPreview, Scope, UserProfile,
};
use crate::ports::FeedStore;
use crate::util::now_ms;

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn FeedStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    /// Returns one page of the feed, bidirectionally cursor-paginated.
    ///
    /// Items come back ascending by `(created_at_ms, id)` regardless of the
    /// fetch direction. The page is restricted to what the actor may see:
    /// members only, and only items created at or after their join time.
    pub async fn page(
        &self,
        actor: &ActorIdentity,
        scope_id: &str,
        query: PageQuery,
    ) -> FeedResult<FeedPage> {
        let membership = self.assert_member(actor, scope_id).await?;

        let limit = query
            .limit
            .unwrap_or(PAGE_LIMIT_DEFAULT)
            .clamp(1, PAGE_LIMIT_MAX);
        let cursor_key = query
            .cursor
            .as_deref()
            .map(OrderKey::decode)
            .transpose()?;

        // One extra row decides has_more without a second query.
        let mut rows = self
            .store
            .list_page(
                scope_id,
                membership.joined_at_ms,
                cursor_key.as_ref(),
                query.direction,
                limit + 1,
            )
            .await?;
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        if query.direction == Direction::Older {
            // The store returns older pages newest-first; clients want
            // ascending.
            rows.reverse();
        }

        let (next_cursor, previous_cursor) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => {
                let (next_edge, prev_edge) = match query.direction {
                    Direction::Older => (first, last),
                    Direction::Newer => (last, first),
                };
                (
                    has_more.then(|| next_edge.order_key().encode()),
                    Some(prev_edge.order_key().encode()),
                )
            }
            _ => (None, None),
        };

        let total_count = if query.cursor.is_none() {
            Some(
                self.store
                    .count_items(scope_id, membership.joined_at_ms)
                    .await?,
            )
        } else {
            None
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.view_of(row).await?);
        }

        tracing::debug!(
            scope_id,
            count = items.len(),
            has_more,
            "feed page served"
        );

        Ok(FeedPage {
            items,
            next_cursor,
            previous_cursor,
            has_more,
            total_count,
        })
    }

    /// Creates an item in a scope the actor belongs to.
    pub async fn create_item(
        &self,
        actor: &ActorIdentity,
        scope_id: &str,
        input: ItemCreate,
    ) -> FeedResult<ItemView> {
        self.assert_member(actor, scope_id).await?;

        let content = input.content.trim().to_string();
        validate_content(&content)?;

        let thread_level = match &input.parent_id {
            None => 0,
            Some(parent_id) => {
                let parent = self
                    .store
                    .get_item(scope_id, parent_id)
                    .await?
                    .ok_or_else(|| {
                        FeedError::Validation("parent item not found in this scope".into())
                    })?;
                if parent.thread_level >= MAX_THREAD_LEVEL {
                    return Err(FeedError::Validation(
                        "replies cannot be nested deeper than one level".into(),
                    ));
                }
                parent.thread_level + 1
            }
        };

        let record = self
            .store
            .insert_item(&NewItem {
                scope_id: scope_id.to_string(),
                author_id: actor.user_id.clone(),
                content,
                kind: input.kind,
                thread_level,
                parent_id: input.parent_id,
                created_at_ms: None,
            })
            .await?;

        tracing::debug!(scope_id, item_id = %record.id, "item created");
        self.view_of(record).await
    }

    pub async fn create_scope(&self, actor: &ActorIdentity, name: &str) -> FeedResult<Scope> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FeedError::Validation("name is required".into()));
        }
        let scope = self
            .store
            .put_scope(&Scope {
                id: crate::util::uuid_v7_without_dashes(),
                name: name.to_string(),
                deleted_at_ms: None,
            })
            .await?;
        // The creator joins at time zero and sees the full history.
        self.store
            .upsert_membership(&Membership {
                scope_id: scope.id.clone(),
                user_id: actor.user_id.clone(),
                joined_at_ms: 0,
            })
            .await?;
        Ok(scope)
    }

    /// Joins a scope. The join timestamp becomes the visibility floor: items
    /// from before the join stay hidden. Rejoining keeps the original floor.
    pub async fn join_scope(
        &self,
        actor: &ActorIdentity,
        scope_id: &str,
    ) -> FeedResult<Membership> {
        let scope = self
            .store
            .get_scope(scope_id)
            .await?
            .ok_or(FeedError::NotFound)?;
        if scope.deleted_at_ms.is_some() {
            return Err(FeedError::NotFound);
        }

        if let Some(existing) = self
            .store
            .get_membership(scope_id, &actor.user_id)
            .await?
        {
            return Ok(existing);
        }

        self.store
            .upsert_membership(&Membership {
                scope_id: scope_id.to_string(),
                user_id: actor.user_id.clone(),
                joined_at_ms: now_ms(),
            })
            .await
    }

    /// Soft-deletes a scope. Items are kept; further access is denied.
    pub async fn delete_scope(&self, actor: &ActorIdentity, scope_id: &str) -> FeedResult<Scope> {
        self.assert_member(actor, scope_id).await?;
        let mut scope = self
            .store
            .get_scope(scope_id)
            .await?
            .ok_or(FeedError::NotFound)?;
        if scope.deleted_at_ms.is_none() {
            scope.deleted_at_ms = Some(now_ms());
            scope = self.store.put_scope(&scope).await?;
        }
        Ok(scope)
    }

    pub async fn register_user(&self, username: &str) -> FeedResult<UserProfile> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FeedError::Validation("username is required".into()));
        }
        self.store
            .create_user(&UserProfile {
                id: crate::util::uuid_v7_without_dashes(),
                username: username.to_string(),
            })
            .await
    }

    async fn assert_member(
        &self,
        actor: &ActorIdentity,
        scope_id: &str,
    ) -> FeedResult<Membership> {
        // Unknown scope, deleted scope and non-membership are
        // indistinguishable to the caller.
        let scope = self
            .store
            .get_scope(scope_id)
            .await?
            .ok_or(FeedError::AccessDenied)?;
        if scope.deleted_at_ms.is_some() {
            return Err(FeedError::AccessDenied);
        }
        self.store
            .get_membership(scope_id, &actor.user_id)
            .await?
            .ok_or(FeedError::AccessDenied)
    }

    async fn view_of(&self, record: ItemRecord) -> FeedResult<ItemView> {
        let author = self
            .store
            .get_user(&record.author_id)
            .await?
            .unwrap_or_else(|| UserProfile {
                id: record.author_id.clone(),
                username: record.author_id.clone(),
            });

        let parent_preview = match &record.parent_id {
            None => None,
            Some(parent_id) => {
                let parent = self.store.get_item(&record.scope_id, parent_id).await?;
                match parent {
                    None => None,
                    Some(parent) => {
                        let author_username = self
                            .store
                            .get_user(&parent.author_id)
                            .await?
                            .map(|u| u.username)
                            .unwrap_or_else(|| parent.author_id.clone());
                        Some(ParentPreview {
                            id: parent.id.clone(),
                            content_preview: parent
                                .content
                                .chars()
                                .take(PARENT_PREVIEW_LENGTH)
                                .collect(),
                            author_username,
                        })
                    }
                }
            }
        };

        let reply_count = self
            .store
            .count_replies(&record.scope_id, &record.id)
            .await?;

        let estimated_height = estimate_height(&EstimateInput {
            content: &record.content,
            kind: record.kind,
            thread_level: record.thread_level,
            has_parent_preview: parent_preview.is_some(),
        });

        Ok(ItemView {
            id: record.id,
            scope_id: record.scope_id,
            author_id: record.author_id,
            content: record.content,
            kind: record.kind,
            created_at_ms: record.created_at_ms,
            thread_level: record.thread_level,
            parent_id: record.parent_id,
            author,
            parent_preview,
            reply_count,
            estimated_height,
        })
    }
}

fn validate_content(content: &str) -> FeedResult<()> {
    if content.is_empty() {
        return Err(FeedError::Validation("content is required".into()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(FeedError::Validation(format!(
            "content exceeds max length of {MAX_CONTENT_LENGTH}"
        )));
    }
    Ok(())
}
