use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, Content, NewComment, NewContent, NewUser, User};

/// Read/create access to one kind of titled entity.
///
/// Every listing is returned in id (insertion) order.
#[async_trait]
pub trait ContentRepository<T: Content>: Send + Sync {
    async fn all(&self) -> Result<Vec<T>, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError>;

    /// Case-insensitive substring match on `title`. The query is matched
    /// literally; the empty query matches every row.
    ///
    /// Case folding is backend-specific: PostgreSQL `ILIKE` follows the
    /// database collation while the memory store uses Unicode
    /// `to_lowercase`, so the two may disagree on non-ASCII titles.
    async fn filter_by_title_substring(&self, query: &str) -> Result<Vec<T>, DatabaseError>;

    async fn create(&self, draft: NewContent) -> Result<T, DatabaseError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments of a post, oldest first.
    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError>;

    /// Fails with [`DatabaseError::NotFound`] when the post or the user is missing.
    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with [`DatabaseError::Conflict`] when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
}

/// Backend-level operations that are not tied to an entity.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
