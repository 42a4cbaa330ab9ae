use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Content, NewContent};

/// A discussion thread. Owns zero or more [`super::Comment`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ForumPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Content for ForumPost {
    const TABLE: &'static str = "forum_posts";
    const LABEL: &'static str = "forum post";

    fn from_parts(id: i64, draft: NewContent, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            created_at,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}
