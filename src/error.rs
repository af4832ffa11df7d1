use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Seed data is absent for a category. Should not occur after
    /// initialization; an internal invariant violation, not a user error.
    SeedMissing { category: &'static str },
    /// A read or write against the backing store failed.
    Store { category: &'static str, detail: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            AppError::SeedMissing { category } => {
                write!(f, "no seed data for {category}")
            }
            AppError::Store { category, detail } => {
                write!(f, "store error for {category}: {detail}")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => {
                tracing::warn!(error_type = "bad_request", message = %msg, "Responding with 400");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::SeedMissing { category } => {
                tracing::error!(error_type = "seed_missing", category, "Responding with 500");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch {category}"),
                )
            }
            AppError::Store { category, detail } => {
                tracing::error!(error_type = "store", category, detail = %detail, "Responding with 500");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch {category}"),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
