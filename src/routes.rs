use axum::{
    routing::{get, MethodRouter},
    Router,
};
use tower_cookies::CookieManagerLayer;

use crate::handlers;
use crate::state::AppState;

pub const HOME: &str = "/";
pub const RESOURCE_DETAIL: &str = "/resource/:resource_id/";
pub const FORUM_POST_DETAIL: &str = "/forum/:post_id/";
pub const SUBMIT_RESOURCE: &str = "/submit/resource/";
pub const SUBMIT_FORUM_POST: &str = "/submit/forum/";
pub const LOGIN: &str = "/login/";
pub const LOGOUT: &str = "/logout/";
pub const SEARCH: &str = "/search/";
pub const SIGNUP: &str = "/signup/";
pub const HEALTH: &str = "/health";

/// Fill the `:name` segments of a route pattern.
pub fn reverse(pattern: &str, params: &[(&str, String)]) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
                .unwrap_or(segment),
            None => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn forum_post_path(post_id: i64) -> String {
    reverse(FORUM_POST_DETAIL, &[("post_id", post_id.to_string())])
}

/// Where an anonymous user is sent before they may comment.
pub fn login_path(next: &str) -> String {
    format!("{}?next={}", LOGIN, urlencoding::encode(next))
}

/// Two patterns that differ only in parameter names match the same requests.
fn shape(path: &str) -> String {
    path.split('/')
        .map(|segment| if segment.starts_with(':') { ":" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// A shadowed registration, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub name: &'static str,
    pub path: &'static str,
    pub winner: &'static str,
}

struct Entry<S> {
    name: &'static str,
    path: &'static str,
    handler: MethodRouter<S>,
}

/// Ordered route list. The first registration of a path wins; later ones
/// are skipped with a warning instead of panicking inside axum.
pub struct RouteTable<S> {
    entries: Vec<Entry<S>>,
    shadowed: Vec<Shadowed>,
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            shadowed: Vec::new(),
        }
    }
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, name: &'static str, path: &'static str, handler: MethodRouter<S>) -> Self {
        let key = shape(path);
        if let Some(existing) = self.entries.iter().find(|e| shape(e.path) == key) {
            tracing::warn!(
                "Route '{}' ({}) is shadowed by '{}' ({}) and will never match",
                name,
                path,
                existing.name,
                existing.path
            );
            self.shadowed.push(Shadowed {
                name,
                path,
                winner: existing.name,
            });
            return self;
        }

        self.entries.push(Entry { name, path, handler });
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn shadowed(&self) -> &[Shadowed] {
        &self.shadowed
    }

    pub fn into_router(self) -> Router<S> {
        self.entries
            .into_iter()
            .fold(Router::new(), |router, entry| router.route(entry.path, entry.handler))
    }
}

pub fn route_table() -> RouteTable<AppState> {
    use handlers::{accounts, forum, health, home, resources, search, submit};

    RouteTable::new()
        .route("home", HOME, get(home::home))
        .route("resource_detail", RESOURCE_DETAIL, get(resources::resource_detail))
        .route(
            "forum_post_detail",
            FORUM_POST_DETAIL,
            get(forum::forum_post_detail).post(forum::add_comment),
        )
        .route(
            "submit_resource",
            SUBMIT_RESOURCE,
            get(submit::resource_form).post(submit::submit_resource),
        )
        .route(
            "submit_forum_post",
            SUBMIT_FORUM_POST,
            get(submit::forum_post_form).post(submit::submit_forum_post),
        )
        .route("login", LOGIN, get(accounts::login_form).post(accounts::login))
        .route("logout", LOGOUT, get(accounts::logout).post(accounts::logout))
        .route("search", SEARCH, get(search::search))
        .route("signup", SIGNUP, get(accounts::signup_form).post(accounts::signup))
        .route("health", HEALTH, get(health::health))
}

/// The complete application router.
pub fn app(state: AppState) -> Router {
    route_table()
        .into_router()
        .fallback(handlers::not_found)
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
