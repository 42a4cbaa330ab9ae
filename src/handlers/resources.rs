// handlers/resources.rs - GET /resource/:resource_id/
use axum::extract::State;

use super::{found, Id};
use crate::error::AppError;
use crate::state::AppState;
use crate::views::{Page, View};

pub async fn resource_detail(
    State(state): State<AppState>,
    Id(resource_id): Id,
    page: Page,
) -> Result<View, AppError> {
    let resource = found(state.resources.get_by_id(resource_id).await?)?;
    Ok(page.view("resource_detail.html").with("resource", &resource))
}
