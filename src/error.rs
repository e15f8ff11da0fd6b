use axum::response::{IntoResponse, Response};
use axum::Json;
use hyper::StatusCode;
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),
    #[error("token exchange failed")]
    UpstreamAuth,
    #[error("{0}")]
    UpstreamPush(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            PaymentError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            PaymentError::UpstreamPush(msg) => failure(msg),
            PaymentError::UpstreamAuth => failure("Failed to initiate payment".to_owned()),
            PaymentError::Http(err) => {
                error!("upstream request failed: {err}");
                failure("Failed to initiate payment".to_owned())
            }
        }
    }
}

fn failure(msg: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": msg })),
    )
        .into_response()
}
