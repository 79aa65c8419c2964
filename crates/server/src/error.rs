//! HTTP mapping for pipeline errors.
//!
//! Every pipeline failure is a 500 whose plain-text body is the error message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sieve_core::Error;

/// Pipeline error as returned from the request handler.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ServerError(#[from] Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}
