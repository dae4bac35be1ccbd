//! Shared HTTP building blocks: response envelope, error mapping,
//! validating extractors and procedure outcome shaping.

pub mod error;
pub mod outcome;
pub mod validated_json;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::{field_errors, ApiError, FieldError};
pub use outcome::{invoke, parse_path_id, OutcomeExt};
pub use validated_json::{ValidatedJson, ValidatedQuery};

/// Standard API response envelope
///
/// Success: `{"success": true, "data": ..., "message": ...}`;
/// failure: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success carrying only a human readable message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

/// Success envelope whose `data` may be absent.
pub fn maybe<T>(data: Option<T>, message: impl Into<String>) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        message: Some(message.into()),
        error: None,
    }
}

/// Empty strings are sent to procedures as `NULL`.
pub fn blank_as_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
