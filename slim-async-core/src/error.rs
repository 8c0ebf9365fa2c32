//! Validation and request errors

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// A malformed async action descriptor.
///
/// Returned synchronously by [`AsyncMiddleware::handle`](crate::AsyncMiddleware::handle),
/// always before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Expected an array of three string types.")]
    InvalidTypes,

    #[error("Expected type to be a string.")]
    InvalidType,

    #[error("Expected callAPI to be a function.")]
    InvalidCallApi,

    #[error("Expected formatData to be a function.")]
    InvalidFormatData,

    #[error("Expected shouldCallAPI to be a function.")]
    InvalidShouldCallApi,

    #[error("Expected payload to be an object")]
    InvalidPayload,

    #[error("Expected meta to be an object")]
    InvalidMeta,

    #[error("Expected each suffix to be a string")]
    InvalidOptions,
}

/// Error produced by a `callAPI` function.
///
/// Serializes as `{ "message": .., "data": .. }`, which is what standard-mode
/// error actions carry as their payload.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    /// Attach extra structured detail (status code, response body, ...).
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Capture the display message of any error.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        Self::new(error.to_string())
    }
}

/// Failure of a started request, delivered through the request future.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AsyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Expected formatData to return an object.")]
    InvalidFormatDataReturn,
}

impl AsyncError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// JSON form used as the payload of a standard-mode error action.
    pub fn to_payload(&self) -> Value {
        match self {
            AsyncError::Api(error) => {
                let mut payload = json!({ "message": error.message });
                if let (Some(data), Value::Object(map)) = (&error.data, &mut payload) {
                    map.insert("data".into(), data.clone());
                }
                payload
            }
            AsyncError::InvalidFormatDataReturn => json!({ "message": self.message() }),
        }
    }
}
