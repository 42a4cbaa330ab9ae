pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;

pub use error::AppError;
pub use routes::app;
pub use state::AppState;
