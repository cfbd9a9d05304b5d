use axum::extract::{Extension, Path, Query, State};
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use feed_domain::identity::ActorIdentity;
use feed_domain::item::{
    Direction, FeedPage, ItemCreate, ItemView, Membership, PageQuery, Scope, UserProfile,
};

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/scopes", post(create_scope))
        .route("/v1/scopes/:scope_id", delete(delete_scope))
        .route("/v1/scopes/:scope_id/join", post(join_scope))
        .route(
            "/v1/scopes/:scope_id/items",
            get(list_items).post(create_item),
        )
        .route_layer(middleware::from_fn(session::require_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/v1/users", post(register_user))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::auth_middleware,
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct ListItemsQuery {
    cursor: Option<String>,
    limit: Option<usize>,
    direction: Option<String>,
}

async fn list_items(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(scope_id): Path<String>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<FeedPage>, ApiError> {
    let direction = match query.direction.as_deref() {
        Some(raw) => Direction::parse(raw)?,
        None => Direction::Older,
    };
    let page = state
        .feed
        .page(
            &actor,
            &scope_id,
            PageQuery {
                cursor: query.cursor,
                direction,
                limit: query.limit,
            },
        )
        .await?;
    Ok(Json(page))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(scope_id): Path<String>,
    Json(input): Json<ItemCreate>,
) -> Result<(StatusCode, Json<ItemView>), ApiError> {
    let view = state.feed.create_item(&actor, &scope_id, input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Deserialize)]
struct CreateScopeRequest {
    name: String,
}

async fn create_scope(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(input): Json<CreateScopeRequest>,
) -> Result<(StatusCode, Json<Scope>), ApiError> {
    let scope = state.feed.create_scope(&actor, &input.name).await?;
    Ok((StatusCode::CREATED, Json(scope)))
}

async fn join_scope(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(scope_id): Path<String>,
) -> Result<Json<Membership>, ApiError> {
    let membership = state.feed.join_scope(&actor, &scope_id).await?;
    Ok(Json(membership))
}

async fn delete_scope(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(scope_id): Path<String>,
) -> Result<Json<Scope>, ApiError> {
    let scope = state.feed.delete_scope(&actor, &scope_id).await?;
    Ok(Json(scope))
}

#[derive(Deserialize)]
struct RegisterUserRequest {
    username: String,
}

async fn register_user(
    State(state): State<AppState>,
    Json(input): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let user = state.feed.register_user(&input.username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
