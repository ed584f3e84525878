use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::views;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::errors::not_found())).into_response()
            }
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, Html(views::errors::bad_request())).into_response()
            }
            AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(views::errors::internal())).into_response()
            }
        }
    }
}

/// Join a `spawn_blocking` task, folding panics into internal errors.
pub(crate) fn joined<T>(
    result: Result<anyhow::Result<T>, tokio::task::JoinError>,
) -> Result<T, AppError> {
    result
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
        .map_err(AppError::from)
}
