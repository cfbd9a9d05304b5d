use std::collections::HashMap;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use feed_domain::identity::ActorIdentity;
use feed_domain::ports::BoxFuture;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves bearer tokens to identities. The static implementation below is
/// the stand-in for a real session backend.
pub trait SessionValidator: Send + Sync {
    fn validate(&self, token: &str) -> BoxFuture<'_, Option<ActorIdentity>>;
}

#[derive(Clone, Default)]
pub struct StaticTokenSessions {
    tokens: HashMap<String, ActorIdentity>,
}

impl StaticTokenSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, actor: ActorIdentity) -> Self {
        self.tokens.insert(token.into(), actor);
        self
    }

    /// Parses comma-separated `token=user_id` pairs; malformed entries are
    /// skipped with a warning.
    pub fn from_pairs(pairs: &str) -> Self {
        let mut sessions = Self::new();
        for entry in pairs.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((token, user_id)) if !token.is_empty() && !user_id.is_empty() => {
                    sessions
                        .tokens
                        .insert(token.to_string(), ActorIdentity::with_user_id(user_id));
                }
                _ => tracing::warn!(entry, "ignoring malformed session token entry"),
            }
        }
        sessions
    }
}

impl SessionValidator for StaticTokenSessions {
    fn validate(&self, token: &str) -> BoxFuture<'_, Option<ActorIdentity>> {
        let actor = self.tokens.get(token).cloned();
        Box::pin(async move { actor })
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match state.sessions.validate(token).await {
            Some(actor) => {
                req.extensions_mut().insert(actor);
            }
            None => tracing::warn!("invalid auth token"),
        }
    }
    next.run(req).await
}

pub async fn require_auth_middleware(req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<ActorIdentity>().is_some() {
        next.run(req).await
    } else {
        ApiError::Unauthorized.into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
}
