//! Helper types and traits for cleaner route handlers.
//!
//! Provides extension traits for converting `Option` and `Result` types
//! into HTTP-appropriate error responses, reducing boilerplate in routes.

use axum::http::StatusCode;
use layout_translator_core::Error;
use tracing::error;

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Option<T>` to `RouteResult<T>`.
pub trait OptionExt<T> {
    /// Returns the contained value or a 400 Bad Request error.
    fn or_bad_request(self, msg: &str) -> RouteResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_bad_request(self, msg: &str) -> RouteResult<T> {
        self.ok_or_else(|| (StatusCode::BAD_REQUEST, msg.to_string()))
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

/// Extension trait for pipeline results: maps each error kind to its status.
pub trait PipelineResultExt<T> {
    fn or_pipeline_error(self) -> RouteResult<T>;
}

impl<T> PipelineResultExt<T> for layout_translator_core::Result<T> {
    fn or_pipeline_error(self) -> RouteResult<T> {
        self.map_err(|e| {
            let status = status_for(&e);
            error!("Request failed ({}): {}", status, e);
            (status, e.to_string())
        })
    }
}

/// Status code for a pipeline error.
///
/// Configuration problems are the server's fault (500), upstream failures
/// are reported as a bad gateway (502), unusable documents as 422.
pub const fn status_for(err: &Error) -> StatusCode {
    if err.is_config() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if err.is_fetch() || err.is_translation() {
        return StatusCode::BAD_GATEWAY;
    }
    match err {
        Error::PdfOpen(_)
        | Error::PdfInvalidPage { .. }
        | Error::PdfTextExtraction { .. }
        | Error::LayoutFormat(_)
        | Error::LayoutEmpty => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
