use anyhow::{Context, Result};
use layout_translator_core::{AppConfig, ExportMode, Lang, LayoutTranslator, SourceFetcher, Translator};
use std::sync::Arc;
use std::time::Duration;

/// Global application state
pub struct AppState {
    /// Base configuration, resolved once at startup
    pub config: AppConfig,
    /// Client used to download source documents
    pub fetcher: SourceFetcher,
    /// Replaces the configured service when set
    translator: Option<Arc<dyn Translator>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = SourceFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            fetcher,
            translator: None,
        })
    }

    /// Use `translator` instead of the configured translation service.
    #[cfg_attr(not(test), allow(dead_code))]
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Build the pipeline for one request.
    ///
    /// Requests always render over the original pages.
    pub fn pipeline(
        &self,
        source_lang: &str,
        target_lang: &str,
        max_pages: Option<usize>,
    ) -> layout_translator_core::Result<LayoutTranslator> {
        let mut config = self.config.clone();
        config.source_lang = Lang::new(source_lang);
        config.target_lang = Lang::new(target_lang);
        config.max_pages = max_pages;
        config.export.mode = ExportMode::Background;

        match &self.translator {
            Some(translator) => Ok(LayoutTranslator::with_translator(Arc::clone(translator), config)),
            None => LayoutTranslator::new(config),
        }
    }
}
