//! Utility module
//!
//! - [`logger`] - tracing subscriber setup
//! - [`validation`] - payload validation helpers

pub mod logger;
pub mod validation;

use shared::error::ApiResponse;

/// Wrap a payload in the success envelope
pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// Wrap a payload in the success envelope with a custom message
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::success_with_message(message, data)
}
