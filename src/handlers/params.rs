use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Form,
};
use serde::de::DeserializeOwned;

use super::PAGE_NOT_FOUND;
use crate::error::AppError;

pub const MALFORMED_FORM: &str = "The submitted form could not be read.";
pub const MALFORMED_QUERY: &str = "The query string could not be read.";

/// Numeric id taken from the single path parameter of a route.
///
/// Anything other than plain decimal digits fitting an `i64` is answered
/// with 404, the same as an id that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub i64);

pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[async_trait]
impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(PAGE_NOT_FOUND))?;

        parse_id(&raw)
            .map(Id)
            .ok_or_else(|| AppError::not_found(PAGE_NOT_FOUND))
    }
}

/// `application/x-www-form-urlencoded` body. A body that cannot be read
/// gets the rendered 400 page rather than axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct FormData<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(FormData(value)),
            Err(rejection) => Err(form_rejected(rejection)),
        }
    }
}

fn form_rejected(rejection: FormRejection) -> AppError {
    tracing::debug!("Rejected form body: {}", rejection.body_text());
    AppError::bad_request(MALFORMED_FORM)
}

/// Query string parameters, rejected with the rendered 400 page.
#[derive(Debug, Clone)]
pub struct QueryData<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| QueryData(value))
            .map_err(|e| {
                tracing::debug!("Rejected query string: {}", e.body_text());
                AppError::bad_request(MALFORMED_QUERY)
            })
    }
}

/// The `q` parameter of a search. Repeated `q` keeps the last value and
/// NUL characters are dropped, so every query string is searchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(pub String);

impl SearchTerm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .filter(|(key, _)| key == "q")
            .map(|(_, value)| value)
            .last()
            .unwrap_or_default();
        SearchTerm(q.replace('\0', ""))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SearchTerm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let QueryData(pairs) = QueryData::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(SearchTerm::from_pairs(pairs))
    }
}
