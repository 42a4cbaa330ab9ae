use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use crate::auth::{Claims, SessionError, SessionKeys};
use crate::database::models::User;
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// Authenticated user context extracted from the session cookie
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
        }
    }
}

/// `Anonymous --(login)--> Authenticated --(logout)--> Anonymous`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(SessionUser),
}

impl Session {
    /// A missing, forged or expired cookie is simply an anonymous session.
    pub fn from_cookies(cookies: &Cookies, keys: &SessionKeys) -> Self {
        let Some(cookie) = cookies.get(SESSION_COOKIE) else {
            return Session::Anonymous;
        };

        match keys.verify(cookie.value()) {
            Ok(claims) => Session::Authenticated(claims.into()),
            Err(e) => {
                tracing::debug!("Ignoring session cookie: {}", e);
                Session::Anonymous
            }
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(user) => Some(user),
        }
    }
}

/// Issue a session cookie for `user`, replacing any existing one.
pub fn start(cookies: &Cookies, keys: &SessionKeys, user: &User) -> Result<(), SessionError> {
    let token = keys.issue(user)?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(keys.secure_cookies());
    cookies.add(cookie);
    Ok(())
}

/// Drop the session cookie. Safe to call without a session.
pub fn end(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::internal_server_error(msg))?;

        let session = Session::from_cookies(&cookies, &state.sessions);

        // A valid token for a deleted account is no session at all
        if let Session::Authenticated(user) = &session {
            if state.users.get_by_id(user.id).await?.is_none() {
                tracing::warn!("Session names missing user {}; logging out", user.id);
                end(&cookies);
                return Ok(Session::Anonymous);
            }
        }
        Ok(session)
    }
}
