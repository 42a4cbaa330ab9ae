pub mod page;
pub mod templates;

pub use page::Page;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tera::Context;
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("template engine failed to initialize: {0}")]
    Engine(String),

    #[error("failed to render {template}: {reason}")]
    Render { template: String, reason: String },
}

/// Result payload of a handler: a template name plus the data it renders.
#[derive(Debug)]
pub struct View {
    template: &'static str,
    context: Context,
    status: StatusCode,
}

impl View {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Context::new(),
            status: StatusCode::OK,
        }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        match templates::render(self.template, &self.context) {
            Ok(body) => (self.status, Html(body)).into_response(),
            Err(err) => AppError::from(err).into_response(),
        }
    }
}
