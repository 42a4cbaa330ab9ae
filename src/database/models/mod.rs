pub mod comment;
pub mod forum_post;
pub mod resource;
pub mod user;

pub use comment::{Comment, NewComment};
pub use forum_post::ForumPost;
pub use resource::Resource;
pub use user::{NewUser, User};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow};

/// Title/body payload shared by every titled entity on its way into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContent {
    pub title: String,
    pub content: String,
}

/// A titled entity (resources and forum posts) stored in its own table with
/// the columns `id, title, content, created_at`.
pub trait Content:
    for<'r> FromRow<'r, PgRow> + Clone + Serialize + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;

    /// Human readable name used in messages ("resource", "forum post").
    const LABEL: &'static str;

    fn from_parts(id: i64, draft: NewContent, created_at: DateTime<Utc>) -> Self;

    fn id(&self) -> i64;

    fn title(&self) -> &str;
}
