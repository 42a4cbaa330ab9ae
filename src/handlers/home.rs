// handlers/home.rs - GET /
use axum::extract::State;

use crate::error::AppError;
use crate::state::AppState;
use crate::views::{Page, View};

/// Every resource and forum post, oldest first.
pub async fn home(State(state): State<AppState>, page: Page) -> Result<View, AppError> {
    let (resources, forum_posts) =
        tokio::try_join!(state.resources.all(), state.forum_posts.all())?;

    Ok(page
        .view("home.html")
        .with("resources", &resources)
        .with("forum_posts", &forum_posts))
}
