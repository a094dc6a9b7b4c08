use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollsError {
    #[error("No question matches the given query.")]
    NotFound,

    #[error("Invalid stored timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for PollsError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            PollsError::NotFound => (
                StatusCode::NOT_FOUND,
                "<h1>Not Found</h1>\n<p>No question matches the given query.</p>\n",
            ),
            PollsError::InvalidTimestamp { .. } | PollsError::Database(_) | PollsError::Template(_) => {
                error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Server Error</h1>\n")
            }
        };

        (status, Html(body)).into_response()
    }
}
