use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;

use super::View;
use crate::error::AppError;
use crate::middleware::{flash, Session};
use crate::state::AppState;

/// Per-request rendering context: who is asking, and the cookie jar that
/// carries their session and pending flash message.
pub struct Page {
    pub session: Session,
    pub cookies: Cookies,
}

impl Page {
    /// Start a view with the layout data every page shows.
    /// Consumes the pending flash message, if any.
    pub fn view(&self, template: &'static str) -> View {
        View::new(template)
            .with("user", &self.session.user())
            .with("flash", &flash::take(&self.cookies))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::internal_server_error(msg))?;
        Ok(Self { session, cookies })
    }
}
