use std::sync::Arc;

use crate::auth::SessionKeys;
use crate::config::SecurityConfig;
use crate::database::models::{ForumPost, Resource};
use crate::database::{CommentRepository, ContentRepository, Store, UserRepository};

/// Shared, read-only request context. Handlers reach the store only through
/// these repository handles.
#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<dyn ContentRepository<Resource>>,
    pub forum_posts: Arc<dyn ContentRepository<ForumPost>>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, security: &SecurityConfig) -> Self
    where
        S: ContentRepository<Resource>
            + ContentRepository<ForumPost>
            + CommentRepository
            + UserRepository
            + Store
            + 'static,
    {
        Self {
            resources: store.clone(),
            forum_posts: store.clone(),
            comments: store.clone(),
            users: store.clone(),
            store,
            sessions: SessionKeys::new(security),
        }
    }
}
