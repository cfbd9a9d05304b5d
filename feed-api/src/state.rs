use std::sync::Arc;

use feed_domain::memory::MemoryFeedStore;
use feed_domain::service::FeedService;

use crate::config::AppConfig;
use crate::session::{SessionValidator, StaticTokenSessions};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub feed: FeedService,
    pub sessions: Arc<dyn SessionValidator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = StaticTokenSessions::from_pairs(&config.session_tokens);
        let feed = FeedService::new(Arc::new(MemoryFeedStore::new()));
        Self {
            config,
            feed,
            sessions: Arc::new(sessions),
        }
    }

    #[allow(dead_code)]
    pub fn with_parts(
        config: AppConfig,
        feed: FeedService,
        sessions: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            config,
            feed,
            sessions,
        }
    }
}
