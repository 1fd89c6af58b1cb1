use thiserror::Error;

/// Unified error type for layout-translator-core
///
/// This enum encompasses all error cases that can surface from the pipeline:
/// - PDF operations (opening, extracting, writing)
/// - Layout document operations (parsing, reading, writing)
/// - Translation operations (API requests, responses)
/// - Source document retrieval
/// - Configuration operations (loading, validation)
///
/// Degenerate block geometry and text overflow are absorbed by the fit
/// engine and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Invalid page number requested
    #[error("invalid page number {page} (document has {total} pages)")]
    PdfInvalidPage { page: usize, total: usize },

    /// Failed to extract text from a PDF page
    #[error("failed to extract text from page {page}: {reason}")]
    PdfTextExtraction { page: usize, reason: String },

    /// Failed to build the output PDF
    #[error("failed to export PDF: {0}")]
    PdfExport(String),

    /// Failed to save a PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    /// Error from the lopdf library
    #[error("lopdf error: {0}")]
    Lopdf(String),

    // ==========================================================================
    // Layout Errors
    // ==========================================================================
    /// Layout JSON could not be parsed or serialized
    #[error("invalid layout document: {0}")]
    LayoutFormat(String),

    /// Layout document has nothing to render
    #[error("layout document has no pages")]
    LayoutEmpty,

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed (transport error or non-2xx status)
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    // ==========================================================================
    // Fetch Errors
    // ==========================================================================
    /// Source document could not be downloaded
    #[error("failed to fetch source document: {0}")]
    Fetch(String),

    /// Source document download timed out
    #[error("source document download timed out")]
    FetchTimeout,

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    /// Missing required configuration field
    #[error("missing required config field: {0}")]
    ConfigMissing(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the translation service boundary.
    pub const fn is_translation(&self) -> bool {
        matches!(
            self,
            Self::TranslationRequest(_) | Self::TranslationInvalidResponse(_) | Self::TranslationTimeout
        )
    }

    /// Whether this error came from retrieving the source document.
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::FetchTimeout)
    }

    /// Whether this error is a configuration problem.
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad(_) | Self::ConfigInvalid { .. } | Self::ConfigMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::TranslationTimeout.is_translation());
        assert!(Error::FetchTimeout.is_fetch());
        assert!(Error::ConfigMissing("LT_URL".to_string()).is_config());
        assert!(!Error::LayoutEmpty.is_config());
    }

    #[test]
    fn test_missing_config_message_names_field() {
        let err = Error::ConfigMissing("LT_API_KEY".to_string());
        assert_eq!(err.to_string(), "missing required config field: LT_API_KEY");
    }
}
