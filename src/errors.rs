// src/errors.rs
use actix_web::{error::JsonPayloadError, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::completion::CompletionError;
use crate::trade_log::TradeLogError;
use crate::types::ErrorResponse;

/// Everything that can stop a webhook request. All kinds answer with the same
/// 400 body; the kind only shows up in the server log.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonPayloadError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    TradeLog(#[from] TradeLogError),
}

impl WebhookError {
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::InvalidBody(_) => "invalid_body",
            WebhookError::Completion(_) => "completion",
            WebhookError::TradeLog(_) => "trade_log",
        }
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
