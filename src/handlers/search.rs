// handlers/search.rs - GET /search/?q=
use axum::extract::State;

use super::params::SearchTerm;
use crate::error::AppError;
use crate::state::AppState;
use crate::views::{Page, View};

/// Case-insensitive title search over resources and forum posts. An absent
/// or empty `q` matches everything.
pub async fn search(
    State(state): State<AppState>,
    page: Page,
    SearchTerm(query): SearchTerm,
) -> Result<View, AppError> {
    let (resources, forum_posts) = tokio::try_join!(
        state.resources.filter_by_title_substring(&query),
        state.forum_posts.filter_by_title_substring(&query)
    )?;

    tracing::debug!(
        "Search {:?}: {} resources, {} forum posts",
        query,
        resources.len(),
        forum_posts.len()
    );

    Ok(page
        .view("search_results.html")
        .with("query", &query)
        .with("resources", &resources)
        .with("forum_posts", &forum_posts))
}
