use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Comment, Content, ForumPost, NewComment, NewContent, NewUser, User,
};
use crate::database::repository::{CommentRepository, ContentRepository, Store, UserRepository};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Repositories backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` wildcards so the user's query is matched literally.
/// Pairs with `ESCAPE '\'` in the query text.
pub(crate) fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn sql_state(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

#[async_trait]
impl<T: Content> ContentRepository<T> for PgStore {
    async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT id, title, content, created_at FROM {} ORDER BY id",
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "SELECT id, title, content, created_at FROM {} WHERE id = $1",
            T::TABLE
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn filter_by_title_substring(&self, query: &str) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            r"SELECT id, title, content, created_at FROM {}
              WHERE title ILIKE '%' || $1 || '%' ESCAPE '\'
              ORDER BY id",
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(escape_like(query))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, draft: NewContent) -> Result<T, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (title, content) VALUES ($1, $2)
             RETURNING id, title, content, created_at",
            T::TABLE
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(draft.title)
            .bind(draft.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.post_id, c.user_id, u.username AS author, c.body, c.created_at
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.post_id = $1
             ORDER BY c.created_at, c.id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let result = sqlx::query_as::<_, Comment>(
            "WITH inserted AS (
                 INSERT INTO comments (post_id, user_id, body)
                 VALUES ($1, $2, $3)
                 RETURNING id, post_id, user_id, body, created_at
             )
             SELECT i.id, i.post_id, i.user_id, u.username AS author, i.body, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.user_id",
        )
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.body)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(err) if sql_state(&err).as_deref() == Some(FOREIGN_KEY_VIOLATION) => Err(
                DatabaseError::NotFound(format!(
                    "{} {} or user {}",
                    ForumPost::LABEL,
                    comment.post_id,
                    comment.user_id
                )),
            ),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(err) if sql_state(&err).as_deref() == Some(UNIQUE_VIOLATION) => Err(
                DatabaseError::Conflict(format!("username '{}' is taken", user.username)),
            ),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("nutrition"), "nutrition");
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("snake_case"), r"snake\_case");
        assert_eq!(escape_like(r"C:\path"), r"C:\\path");
        assert_eq!(escape_like(""), "");
    }
}
