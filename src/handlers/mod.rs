// One module per page of the site. Every handler takes its inputs through
// extractors and returns either a rendered `View` or a redirect.
pub mod accounts;
pub mod forum;
pub mod health;
pub mod home;
pub mod params;
pub mod resources;
pub mod search;
pub mod submit;

use crate::database::models::Content;
use crate::error::AppError;

pub use params::{FormData, Id, QueryData, SearchTerm};

pub const PAGE_NOT_FOUND: &str = "The page you requested does not exist.";

/// Turn a missing row into the 404 page for its entity.
pub fn found<T: Content>(item: Option<T>) -> Result<T, AppError> {
    item.ok_or_else(|| AppError::not_found(format!("No {} found.", T::LABEL)))
}

/// Fallback for every unmatched path.
pub async fn not_found() -> AppError {
    AppError::not_found(PAGE_NOT_FOUND)
}
