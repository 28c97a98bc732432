use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::model::UpstreamError;

/// Per-request failures that are answered with a JSON `{ "error": ... }` body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("a request for this session is already in progress, retry shortly")]
    SessionBusy,
    #[error("message is required")]
    MissingMessage,
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::SessionBusy => StatusCode::TOO_MANY_REQUESTS,
            RelayError::MissingMessage | RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
