//! HTTP route handlers for the layout translator service.
//!
//! Translation routes return the translated PDF as `application/pdf`;
//! `/health` reports whether the translation service is configured.

mod health;
mod translate;

pub use health::health;
pub use translate::{pdf_translate, pdf_translate_direct};

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::state::AppState;

/// JSON body of `POST /pdf-translate`.
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub source_url: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Query params of `POST /pdf-translate`.
#[derive(Deserialize, Default)]
pub struct PageLimitQuery {
    /// Translate only the first N pages (0 = all)
    #[serde(default)]
    pub max_pages: Option<usize>,
}

/// Query params of `GET /pdf-translate-direct`.
#[derive(Deserialize, Default)]
pub struct DirectQuery {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub max_pages: Option<usize>,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pdf-translate", post(pdf_translate))
        .route("/pdf-translate-direct", get(pdf_translate_direct))
        .route("/health", get(health))
        .with_state(state)
}
