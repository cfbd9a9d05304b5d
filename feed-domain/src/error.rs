use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// No valid session was presented.
    #[error("authentication required")]
    AuthRequired,
    /// The scope is unknown, deleted, or the actor is not a member. All three
    /// collapse to the same error so callers cannot probe for scope existence.
    #[error("access denied")]
    AccessDenied,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    /// A transient store failure. Surfaced to callers as a generic failure.
    #[error("store error: {0}")]
    Store(String),
}
