use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::workflow::WorkflowError;

/// Failure of an HTML page request
#[derive(Error, Debug)]
pub enum PageError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("{0}")]
    Internal(String),
}

impl PageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PageError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Session(_) | PageError::Template(_) | PageError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<WorkflowError> for PageError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Repository(RepositoryError::NotFound(what)) => {
                PageError::NotFound(format!("{} not found", what))
            }
            WorkflowError::Repository(e) => PageError::Internal(e.to_string()),
            other => PageError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Page request failed");
            return (status, "Internal Server Error").into_response();
        }

        tracing::debug!(error = %self, status = status.as_u16(), "Page request rejected");
        (status, self.to_string()).into_response()
    }
}
