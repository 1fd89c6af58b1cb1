mod traits;
mod libre;

pub use traits::{Translator, TranslatorInfo};
pub use libre::{LibreTranslator, DEFAULT_TIMEOUT_SECS};

use crate::config::TranslatorConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Create a translator from configuration.
///
/// Fails with a configuration error when the endpoint or the key is missing.
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    let (api_base, api_key) = config.validate()?;

    let translator = LibreTranslator::new(
        api_base,
        api_key,
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Arc::new(translator))
}
