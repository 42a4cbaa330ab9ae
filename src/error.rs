// HTTP-facing error types
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::Context;

use crate::auth::SessionError;
use crate::database::DatabaseError;
use crate::views::{templates, ViewError};

/// Error that ends a request with a rendered error page. Expected failures
/// (bad forms, bad credentials) never become an `AppError`; handlers re-render
/// the form instead.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::InternalServerError(msg) => msg,
            AppError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        AppError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => AppError::not_found(format!("No {what} found.")),
            err if err.is_unavailable() => {
                tracing::error!("Database unavailable: {}", err);
                AppError::service_unavailable("The site is temporarily unavailable, please try again shortly.")
            }
            err => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", err);
                AppError::internal_server_error("An error occurred while processing your request.")
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Session error: {}", err);
        AppError::internal_server_error("An error occurred while processing your request.")
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        tracing::error!("Template error: {}", err);
        AppError::internal_server_error("An error occurred while rendering this page.")
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut context = Context::new();
        context.insert("user", &Option::<()>::None);
        context.insert("flash", &Option::<()>::None);
        context.insert("status", &status.as_u16());
        context.insert("reason", status.canonical_reason().unwrap_or("Error"));
        context.insert("message", self.message());

        match templates::render("error.html", &context) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                // Never recurse into another error page
                tracing::error!("Error page failed to render: {}", err);
                (status, self.message().to_string()).into_response()
            }
        }
    }
}
