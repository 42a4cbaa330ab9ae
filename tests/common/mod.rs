#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Response, StatusCode};

use resource_forum::config::AppConfig;
use resource_forum::database::models::{
    Comment, Content, ForumPost, NewComment, NewContent, NewUser, Resource, User,
};
use resource_forum::database::{
    CommentRepository, ContentRepository, DatabaseError, DatabaseManager, MemoryStore, PgStore,
    Store, UserRepository,
};
use resource_forum::{app, AppState};

pub const PASSWORD: &str = "correct horse battery";

/// The application on a free local port, over the given store.
pub struct TestServer<S = MemoryStore> {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<S>,
    pub client: reqwest::Client,
}

impl TestServer<MemoryStore> {
    /// Backed by its own empty in-memory store.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Arc::new(MemoryStore::new())).await
    }
}

impl TestServer<PgStore> {
    /// Backed by `DATABASE_URL` with migrations applied, or `None` when no
    /// database is configured.
    pub async fn spawn_postgres() -> Result<Option<Self>> {
        let Some(url) = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()) else {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
            return Ok(None);
        };

        let mut database = AppConfig::development().database;
        database.url = Some(url);
        database.max_connections = 2;
        let pool = DatabaseManager::connect(&database).await?;
        DatabaseManager::migrate(&pool).await?;

        Ok(Some(Self::spawn_with(Arc::new(PgStore::new(pool))).await?))
    }
}

impl<S> TestServer<S>
where
    S: ContentRepository<Resource>
        + ContentRepository<ForumPost>
        + CommentRepository
        + UserRepository
        + Store
        + 'static,
{
    pub async fn spawn_with(store: Arc<S>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(store.clone(), &AppConfig::development().security);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: client()?,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    /// Ready once the listener answers at all; `/health` may be 503 on a
    /// broken store.
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Response> {
        self.post_form(
            "/signup/",
            &[
                ("username", username),
                ("password", password),
                ("password_confirm", password),
            ],
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        self.post_form("/login/", &[("username", username), ("password", password)])
            .await
    }

    /// Sign up and log in with this server's client.
    pub async fn logged_in_as(&self, username: &str) -> Result<()> {
        let resp = self.signup(username, PASSWORD).await?;
        anyhow::ensure!(resp.status() == StatusCode::SEE_OTHER, "signup failed: {}", resp.status());
        let resp = self.login(username, PASSWORD).await?;
        anyhow::ensure!(resp.status() == StatusCode::SEE_OTHER, "login failed: {}", resp.status());
        Ok(())
    }

    pub async fn seed_resource(&self, title: &str, content: &str) -> Result<Resource> {
        Ok(ContentRepository::<Resource>::create(&*self.store, draft(title, content)).await?)
    }

    pub async fn seed_forum_post(&self, title: &str, content: &str) -> Result<ForumPost> {
        Ok(ContentRepository::<ForumPost>::create(&*self.store, draft(title, content)).await?)
    }

    pub async fn resources(&self) -> Result<Vec<Resource>> {
        Ok(ContentRepository::<Resource>::all(&*self.store).await?)
    }

    pub async fn forum_posts(&self) -> Result<Vec<ForumPost>> {
        Ok(ContentRepository::<ForumPost>::all(&*self.store).await?)
    }
}

/// Cookies are kept like a browser would; redirects are left to the test.
pub fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()?)
}

fn draft(title: &str, content: &str) -> NewContent {
    NewContent {
        title: title.to_string(),
        content: content.to_string(),
    }
}

/// Distinct per test run, so tests sharing a database never see each
/// other's rows.
pub fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}{}x{}", prefix, std::process::id(), nanos)
}

pub fn location(resp: &Response) -> Option<&str> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Set-Cookie headers of a response naming `cookie`.
pub fn set_cookies<'a>(resp: &'a Response, cookie: &str) -> Vec<&'a str> {
    let prefix = format!("{}=", cookie);
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with(&prefix))
        .collect()
}

/// Signed in per the page header.
pub fn is_signed_in(body: &str, username: &str) -> bool {
    body.contains(&format!("Signed in as {}", username))
}

/// A store whose pool never hands out a connection.
#[derive(Debug, Default)]
pub struct UnavailableStore;

fn pool_timed_out() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl<T: Content> ContentRepository<T> for UnavailableStore {
    async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn get_by_id(&self, _id: i64) -> Result<Option<T>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn filter_by_title_substring(&self, _query: &str) -> Result<Vec<T>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn create(&self, _draft: NewContent) -> Result<T, DatabaseError> {
        Err(pool_timed_out())
    }
}

#[async_trait]
impl CommentRepository for UnavailableStore {
    async fn for_post(&self, _post_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn create(&self, _comment: NewComment) -> Result<Comment, DatabaseError> {
        Err(pool_timed_out())
    }
}

#[async_trait]
impl UserRepository for UnavailableStore {
    async fn get_by_id(&self, _id: i64) -> Result<Option<User>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DatabaseError> {
        Err(pool_timed_out())
    }

    async fn create(&self, _user: NewUser) -> Result<User, DatabaseError> {
        Err(pool_timed_out())
    }
}

#[async_trait]
impl Store for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(pool_timed_out())
    }
}
