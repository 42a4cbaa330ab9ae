use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Comment, Content, ForumPost, NewComment, NewContent, NewUser, User,
};
use crate::database::repository::{CommentRepository, ContentRepository, Store, UserRepository};

#[derive(Debug, Clone)]
struct StoredContent {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl StoredContent {
    fn to_model<T: Content>(&self) -> T {
        let draft = NewContent {
            title: self.title.clone(),
            content: self.content.clone(),
        };
        T::from_parts(self.id, draft, self.created_at)
    }
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    user_id: i64,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    content: HashMap<&'static str, Vec<StoredContent>>,
    comments: Vec<StoredComment>,
    users: Vec<User>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    /// Next id for a table, starting at 1 like a SERIAL column.
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn rows(&self, table: &'static str) -> &[StoredContent] {
        self.content.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn username(&self, user_id: i64) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.as_str())
    }

    fn joined(&self, comment: &StoredComment) -> Comment {
        Comment {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            author: self.username(comment.user_id).unwrap_or_default().to_string(),
            body: comment.body.clone(),
            created_at: comment.created_at,
        }
    }
}

/// Process-local store used by tests and by development runs without a database.
/// Every write takes the table lock, so creates are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: Content> ContentRepository<T> for MemoryStore {
    async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.rows(T::TABLE).iter().map(StoredContent::to_model).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rows(T::TABLE)
            .iter()
            .find(|row| row.id == id)
            .map(StoredContent::to_model))
    }

    async fn filter_by_title_substring(&self, query: &str) -> Result<Vec<T>, DatabaseError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .rows(T::TABLE)
            .iter()
            .filter(|row| row.title.to_lowercase().contains(&needle))
            .map(StoredContent::to_model)
            .collect())
    }

    async fn create(&self, draft: NewContent) -> Result<T, DatabaseError> {
        let mut tables = self.tables.write().await;
        let row = StoredContent {
            id: tables.next_id(T::TABLE),
            title: draft.title,
            content: draft.content,
            created_at: Utc::now(),
        };
        let model = row.to_model();
        tables.content.entry(T::TABLE).or_default().push(row);
        Ok(model)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| tables.joined(c))
            .collect())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;

        if !tables.rows(ForumPost::TABLE).iter().any(|p| p.id == comment.post_id) {
            return Err(DatabaseError::NotFound(format!(
                "{} {}",
                ForumPost::LABEL,
                comment.post_id
            )));
        }
        if tables.username(comment.user_id).is_none() {
            return Err(DatabaseError::NotFound(format!("user {}", comment.user_id)));
        }

        let stored = StoredComment {
            id: tables.next_id("comments"),
            post_id: comment.post_id,
            user_id: comment.user_id,
            body: comment.body,
            created_at: Utc::now(),
        };
        let created = tables.joined(&stored);
        tables.comments.push(stored);
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }

        let created = User {
            id: tables.next_id("users"),
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
