//! Uniform envelope returned by every exposed operation.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Machine-readable failure codes carried in the `code` field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ServiceNotInitialized,
    ServiceNotFound,
    ControllerNotInitialized,
    UnexpectedError,
    InvalidInput,
    FeatureRegistrationFailed,
    DependencyNotFound,
}

/// `{success, data?}` on success, `{success: false, error, code, data?}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn success(data: Option<T>) -> Self {
        Self { success: true, error: None, code: None, data }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, code: ErrorCode, data: Option<T>) -> Self {
        Self { success: false, error: Some(message.into()), code: Some(code), data }
    }

    #[must_use]
    pub fn service_not_initialized(service_name: &str) -> Self {
        Self::error(
            format!("{service_name} service not initialized"),
            ErrorCode::ServiceNotInitialized,
            None,
        )
    }

    #[must_use]
    pub fn service_not_found(service_name: &str) -> Self {
        Self::error(format!("{service_name} service not found"), ErrorCode::ServiceNotFound, None)
    }

    #[must_use]
    pub fn unexpected_error(message: impl Into<String>) -> Self {
        Self::error(message, ErrorCode::UnexpectedError, None)
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::error(message, ErrorCode::InvalidInput, None)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }
}
