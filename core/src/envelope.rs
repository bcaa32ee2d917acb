//! The result envelope every API operation returns.
//!
//! # Design
//! A call settles to exactly one of `Success(data)` or `Failure { error,
//! status }`; the enum makes "both" and "neither" unrepresentable.
//! `normalize` is the single place an `HttpResponse` becomes an envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

/// Message used when no response was obtained at all.
pub const NETWORK_ERROR: &str = "Network error";
/// Message used when a failed response carries no usable `error` field.
pub const FALLBACK_ERROR: &str = "An error occurred";
/// Message used when a success response does not decode into the expected shape.
pub const INVALID_RESPONSE: &str = "Invalid response from server";
/// Status reported for failures that never produced an HTTP status.
pub const CLIENT_FAILURE_STATUS: u16 = 500;

/// The error half of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error} (HTTP {status})")]
pub struct ApiFailure {
    pub error: String,
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    pub fn failure(error: impl Into<String>, status: u16) -> Self {
        ApiResponse::Failure(ApiFailure {
            error: error.into(),
            status,
        })
    }

    pub fn network_error() -> Self {
        Self::failure(NETWORK_ERROR, CLIENT_FAILURE_STATUS)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success(data) => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure(failure) => Some(&failure.error),
        }
    }

    /// The HTTP status of a failure. Successes carry none.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure(failure) => Some(failure.status),
        }
    }

    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            ApiResponse::Success(data) => Ok(data),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success(data) => ApiResponse::Success(f(data)),
            ApiResponse::Failure(failure) => ApiResponse::Failure(failure),
        }
    }
}

/// Turn a raw response into an envelope.
///
/// Non-2xx responses keep their status and take the message from the body's
/// `error` field when it is a non-empty string.
pub fn normalize<T: DeserializeOwned>(response: &HttpResponse) -> ApiResponse<T> {
    if !response.is_success() {
        let message = server_error_message(&response.body).unwrap_or_else(|| FALLBACK_ERROR.to_string());
        tracing::debug!(status = response.status, error = %message, "request rejected by server");
        return ApiResponse::failure(message, response.status);
    }

    match serde_json::from_str(&response.body) {
        Ok(data) => ApiResponse::Success(data),
        Err(err) => {
            tracing::warn!(status = response.status, error = %err, "undecodable success body");
            ApiResponse::failure(INVALID_RESPONSE, CLIENT_FAILURE_STATUS)
        }
    }
}

fn server_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
