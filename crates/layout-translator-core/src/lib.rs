//! Layout Translator Core Library
//!
//! Translates the text of a PDF while keeping its layout:
//! - Extraction of per-block text and bounding boxes into a layout document
//! - Translation through a LibreTranslate-compatible API, one request per
//!   distinct text
//! - Fit-to-box re-flow of translated text and PDF re-rendering, optionally
//!   over the original pages

pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod fit;
pub mod layout;
pub mod normalize;
pub mod pdf;
pub mod translator;
pub mod util;

pub use compose::{ComposeOptions, Compositor, DrawOp, ExportMode, PagePlan, PlacementPolicy, SkipFn};
pub use config::{
    AppConfig, ExportConfig, Lang, LayoutConfig, TextColor, TranslatorConfig,
    DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG,
};
pub use dispatch::{translate_document, DispatchReport, ProgressFn, TranslationMemo};
pub use error::{Error, Result};
pub use fetch::SourceFetcher;
pub use fit::{layout_block_text, FitConfig, FitOutcome, FlowConfig, FontMetrics, Helvetica, TextFit};
pub use layout::{BoundingBox, LayoutBlock, LayoutDocument, LayoutPage};
pub use normalize::normalize;
pub use pdf::{LayoutExtractor, PdfDocument, PdfWriter};
pub use translator::{create_translator, LibreTranslator, Translator};

use std::sync::Arc;
use tracing::info;

/// High-level pipeline: extraction, translation and export.
pub struct LayoutTranslator {
    translator: Arc<dyn Translator>,
    config: AppConfig,
}

impl LayoutTranslator {
    /// Create a pipeline using the configured translation service.
    pub fn new(config: AppConfig) -> Result<Self> {
        let translator = create_translator(&config.translator)?;
        Ok(Self { translator, config })
    }

    /// Create with a custom translator
    pub fn with_translator(translator: Arc<dyn Translator>, config: AppConfig) -> Self {
        Self { translator, config }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn translator_info(&self) -> translator::TranslatorInfo {
        self.translator.info()
    }

    /// Build the layout document of a PDF.
    pub fn extract(&self, doc: &PdfDocument) -> Result<LayoutDocument> {
        LayoutExtractor::new(doc).extract()
    }

    /// Translate every pending block of `layout` in place.
    pub async fn translate(
        &self,
        layout: &mut LayoutDocument,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<DispatchReport> {
        translate_document(
            layout,
            &self.config.source_lang,
            &self.config.target_lang,
            self.translator.as_ref(),
            progress,
        )
        .await
    }

    /// Render `layout` with the configured export mode.
    pub fn export(&self, layout: &LayoutDocument, original: Option<&PdfDocument>) -> Result<Vec<u8>> {
        export_layout(layout, original, &self.config, None)
    }

    /// Full run: extract, truncate to `max_pages`, translate, export.
    pub async fn run(
        &self,
        doc: &PdfDocument,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Vec<u8>> {
        let mut layout = self.extract(doc)?;
        layout.truncate_pages(self.config.max_pages);
        self.translate(&mut layout, progress).await?;
        self.export(&layout, Some(doc))
    }
}

/// Render a layout document to PDF bytes.
///
/// `original` is required for the background mode. `skip` hides chosen
/// blocks from every mode.
pub fn export_layout(
    layout: &LayoutDocument,
    original: Option<&PdfDocument>,
    config: &AppConfig,
    skip: Option<SkipFn<'_>>,
) -> Result<Vec<u8>> {
    let options = ComposeOptions::from_config(config);
    let mut compositor = Compositor::new(options);
    if let Some(skip) = skip {
        compositor = compositor.with_skip(skip);
    }

    let plans = compositor.compose_document(layout);
    let original_bytes = original
        .filter(|_| options.mode.needs_original())
        .map(PdfDocument::bytes);

    let bytes = PdfWriter::new(config.export.text_color).write(&plans, original_bytes)?;
    info!(
        "Exported {} ({} mode): {} pages, {} bytes",
        layout.document_id,
        options.mode,
        plans.len(),
        bytes.len()
    );
    Ok(bytes)
}
