//! Translation routes - download a source PDF, translate it, return the PDF.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use layout_translator_core::PdfDocument;
use std::sync::Arc;
use tracing::{error, info};

use super::{DirectQuery, PageLimitQuery, TranslateRequest};
use crate::helpers::{OptionExt, PipelineResultExt, ResultExt, RouteResult};
use crate::state::AppState;

/// Translate the PDF at `source_url` given as JSON.
pub async fn pdf_translate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageLimitQuery>,
    Json(request): Json<TranslateRequest>,
) -> RouteResult<Response> {
    generate_translated_pdf(&state, &request, query.max_pages).await
}

/// Same as [`pdf_translate`] with everything in the query string, for
/// clients that can only follow a link.
pub async fn pdf_translate_direct(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DirectQuery>,
) -> RouteResult<Response> {
    let request = TranslateRequest {
        source_url: query.source_url.or_bad_request("source_url is required")?,
        source_lang: query.source_lang.or_bad_request("source_lang is required")?,
        target_lang: query.target_lang.or_bad_request("target_lang is required")?,
    };
    generate_translated_pdf(&state, &request, query.max_pages).await
}

async fn generate_translated_pdf(
    state: &AppState,
    request: &TranslateRequest,
    max_pages: Option<usize>,
) -> RouteResult<Response> {
    // Configuration problems surface before the download starts
    let pipeline = Arc::new(
        state
            .pipeline(&request.source_lang, &request.target_lang, max_pages)
            .or_pipeline_error()?,
    );

    let bytes = state.fetcher.fetch(&request.source_url).await.or_pipeline_error()?;

    // Parsing and extraction run on the blocking pool
    let (doc, mut layout) = run_blocking({
        let pipeline = Arc::clone(&pipeline);
        move || {
            let doc = PdfDocument::from_bytes(bytes.to_vec())?;
            let layout = pipeline.extract(&doc)?;
            Ok((doc, layout))
        }
    })
    .await?;

    layout.truncate_pages(pipeline.config().max_pages);
    pipeline.translate(&mut layout, None).await.or_pipeline_error()?;

    let pdf = run_blocking(move || pipeline.export(&layout, Some(&doc))).await?;

    info!(
        "Translated {} ({} -> {}): {} bytes",
        request.source_url,
        request.source_lang,
        request.target_lang,
        pdf.len()
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name(&request.target_lang)),
        )
        .body(Body::from(pdf))
        .or_internal_error()
}

/// Run a CPU-bound pipeline stage off the async runtime.
async fn run_blocking<T, F>(task: F) -> RouteResult<T>
where
    F: FnOnce() -> layout_translator_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .inspect_err(|e| error!("Pipeline task panicked: {}", e))
        .or_internal_error()?
        .or_pipeline_error()
}

/// `translated_{target}.pdf`, keeping only header-safe characters.
fn download_name(target_lang: &str) -> String {
    let lang: String = target_lang
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    format!("translated_{lang}.pdf")
}
