use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compose::ExportMode;
use crate::error::{Error, Result};
use crate::fit::{FitConfig, FlowConfig};

/// Language codes as understood by the translation service ("es", "en", "auto", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Serde default functions for common languages
fn default_source_lang() -> Lang {
    Lang::new(DEFAULT_SOURCE_LANG)
}

fn default_target_lang() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "es";
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Environment variables holding the translation service URL, in lookup order
pub const URL_ENV_VARS: [&str; 2] = ["LT_URL", "EXPO_PUBLIC_LT_URL"];
/// Environment variables holding the translation service key, in lookup order
pub const API_KEY_ENV_VARS: [&str; 2] = ["LT_API_KEY", "EXPO_PUBLIC_LT_API_KEY"];

/// Fill color for translated text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TextColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn dark_red() -> Self {
        Self::new(0.8, 0.0, 0.0)
    }

    pub const fn blue() -> Self {
        Self::new(0.0, 0.0, 0.8)
    }

    pub const fn dark_green() -> Self {
        Self::new(0.0, 0.5, 0.0)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "black" => Some(Self::black()),
            "darkred" | "dark_red" | "dark-red" => Some(Self::dark_red()),
            "blue" => Some(Self::blue()),
            "darkgreen" | "dark_green" | "dark-green" => Some(Self::dark_green()),
            _ => None,
        }
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::black()
    }
}

/// Translation service configuration (LibreTranslate-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Base URL of the service; required
    pub api_base: Option<String>,
    /// API key; required
    pub api_key: Option<String>,
    /// Wall-clock bound on each translation call
    #[serde(default = "default_translate_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_translate_timeout_secs() -> u64 {
    crate::translator::DEFAULT_TIMEOUT_SECS
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl TranslatorConfig {
    pub fn new(api_base: Option<String>, api_key: Option<String>) -> Self {
        Self {
            api_base,
            api_key,
            timeout_secs: default_translate_timeout_secs(),
        }
    }

    /// Read the endpoint and key from the environment (`LT_URL`/`LT_API_KEY`,
    /// falling back to their `EXPO_PUBLIC_` variants).
    pub fn from_env() -> Self {
        Self::new(first_env(&URL_ENV_VARS), first_env(&API_KEY_ENV_VARS))
    }

    /// Fill missing fields from `other` (explicit values win).
    #[must_use]
    pub fn or(mut self, other: Self) -> Self {
        self.api_base = self.api_base.or(other.api_base);
        self.api_key = self.api_key.or(other.api_key);
        self
    }

    /// Check that both the endpoint and the key are present and non-blank.
    pub fn validate(&self) -> Result<(&str, &str)> {
        let api_base = non_blank(self.api_base.as_deref())
            .ok_or_else(|| Error::ConfigMissing(URL_ENV_VARS[0].to_string()))?;
        let api_key = non_blank(self.api_key.as_deref())
            .ok_or_else(|| Error::ConfigMissing(API_KEY_ENV_VARS[0].to_string()))?;
        Ok((api_base, api_key))
    }

    pub fn has_api_base(&self) -> bool {
        non_blank(self.api_base.as_deref()).is_some()
    }

    pub fn has_api_key(&self) -> bool {
        non_blank(self.api_key.as_deref()).is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}

/// Text fitting parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Largest font size tried when fitting a block
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f32,

    /// Smallest font size; text that still overflows is truncated
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,

    /// Line height as a multiple of font size
    #[serde(default = "default_line_height_factor")]
    pub line_height_factor: f32,

    /// Inset subtracted from each bbox side before fitting
    #[serde(default = "default_inner_margin")]
    pub inner_margin: f32,

    /// Font size of the flowing export
    #[serde(default = "default_flow_font_size")]
    pub flow_font_size: f32,

    /// Line height factor of the flowing export
    #[serde(default = "default_flow_line_height_factor")]
    pub flow_line_height_factor: f32,

    /// Page margin of the flowing export
    #[serde(default = "default_flow_margin")]
    pub flow_margin: f32,
}

const fn default_base_font_size() -> f32 {
    9.0
}

const fn default_min_font_size() -> f32 {
    5.0
}

const fn default_line_height_factor() -> f32 {
    1.2
}

const fn default_inner_margin() -> f32 {
    1.0
}

const fn default_flow_font_size() -> f32 {
    10.0
}

const fn default_flow_line_height_factor() -> f32 {
    1.4
}

const fn default_flow_margin() -> f32 {
    40.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_font_size: default_base_font_size(),
            min_font_size: default_min_font_size(),
            line_height_factor: default_line_height_factor(),
            inner_margin: default_inner_margin(),
            flow_font_size: default_flow_font_size(),
            flow_line_height_factor: default_flow_line_height_factor(),
            flow_margin: default_flow_margin(),
        }
    }
}

impl LayoutConfig {
    pub const fn fit(&self) -> FitConfig {
        FitConfig {
            base_font_size: self.base_font_size,
            min_font_size: self.min_font_size,
            line_height_factor: self.line_height_factor,
        }
    }

    pub const fn flow(&self) -> FlowConfig {
        FlowConfig {
            font_size: self.flow_font_size,
            line_height_factor: self.flow_line_height_factor,
            margin: self.flow_margin,
        }
    }

    /// Reject values the fit engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: &str| Error::ConfigInvalid {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.min_font_size <= 0.0 {
            return Err(invalid("min_font_size", "must be positive"));
        }
        if self.base_font_size < self.min_font_size {
            return Err(invalid("base_font_size", "must not be smaller than min_font_size"));
        }
        if self.line_height_factor <= 0.0 || self.flow_line_height_factor <= 0.0 {
            return Err(invalid("line_height_factor", "must be positive"));
        }
        if self.inner_margin < 0.0 {
            return Err(invalid("inner_margin", "must not be negative"));
        }
        if self.flow_font_size <= 0.0 {
            return Err(invalid("flow_font_size", "must be positive"));
        }
        Ok(())
    }
}

/// Output rendering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Which rendering variant to produce
    #[serde(default)]
    pub mode: ExportMode,

    /// Translated text color
    #[serde(default)]
    pub text_color: TextColor,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source language
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Target language
    #[serde(default = "default_target_lang")]
    pub target_lang: Lang,

    /// Translation service configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Text fitting configuration
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Output rendering configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Wall-clock bound on downloading a source document
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Translate only the first N pages (None or 0 = all)
    #[serde(default)]
    pub max_pages: Option<usize>,
}

const fn default_fetch_timeout_secs() -> u64 {
    crate::fetch::DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            translator: TranslatorConfig::default(),
            layout: LayoutConfig::default(),
            export: ExportConfig::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_pages: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/layout-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("layout-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fit_engine_defaults() {
        let config = AppConfig::default();
        let fit = config.layout.fit();
        assert!((fit.base_font_size - 9.0).abs() < f32::EPSILON);
        assert!((fit.min_font_size - 5.0).abs() < f32::EPSILON);
        assert!((fit.line_height_factor - 1.2).abs() < f32::EPSILON);
        assert!((config.layout.inner_margin - 1.0).abs() < f32::EPSILON);

        let flow = config.layout.flow();
        assert!((flow.font_size - 10.0).abs() < f32::EPSILON);
        assert!((flow.line_height_factor - 1.4).abs() < f32::EPSILON);
        assert_eq!(config.export.mode, ExportMode::Background);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            source_lang = "fr"
            max_pages = 3

            [translator]
            api_base = "http://lt.local"

            [layout]
            base_font_size = 11.0

            [export]
            mode = "positioned"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_lang.as_str(), "fr");
        assert_eq!(config.target_lang.as_str(), "en");
        assert_eq!(config.max_pages, Some(3));
        assert_eq!(config.translator.api_base.as_deref(), Some("http://lt.local"));
        assert_eq!(config.translator.timeout_secs, 60);
        assert!((config.layout.base_font_size - 11.0).abs() < f32::EPSILON);
        assert!((config.layout.min_font_size - 5.0).abs() < f32::EPSILON);
        assert_eq!(config.export.mode, ExportMode::Positioned);
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let err = AppConfig::from_toml("[layout]\nbase_font_size = 4.0\n").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_translator_validate_reports_missing_fields() {
        let missing_url = TranslatorConfig::new(None, Some("key".to_string()));
        assert!(matches!(missing_url.validate(), Err(Error::ConfigMissing(f)) if f == "LT_URL"));

        let blank_key = TranslatorConfig::new(Some("http://lt".to_string()), Some("  ".to_string()));
        assert!(matches!(blank_key.validate(), Err(Error::ConfigMissing(f)) if f == "LT_API_KEY"));

        let ok = TranslatorConfig::new(Some("http://lt".to_string()), Some("key".to_string()));
        assert_eq!(ok.validate().unwrap(), ("http://lt", "key"));
    }

    #[test]
    fn test_translator_or_prefers_explicit_values() {
        let explicit = TranslatorConfig::new(Some("http://cli".to_string()), None);
        let file = TranslatorConfig::new(Some("http://file".to_string()), Some("k".to_string()));
        let merged = explicit.or(file);
        assert_eq!(merged.api_base.as_deref(), Some("http://cli"));
        assert_eq!(merged.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_text_color_names() {
        assert_eq!(TextColor::from_name("Dark-Red"), Some(TextColor::dark_red()));
        assert_eq!(TextColor::from_name("black"), Some(TextColor::black()));
        assert_eq!(TextColor::from_name("mauve"), None);
    }
}
