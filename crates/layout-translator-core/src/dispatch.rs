//! Translation dispatch over a layout document.
//!
//! Identical block texts are sent to the translation service once per pass.
//! Results are staged and written into the layout only after every request
//! succeeded, so a failed pass leaves the document as it was.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::Lang;
use crate::error::Result;
use crate::layout::LayoutDocument;
use crate::normalize::normalize_opt;
use crate::translator::Translator;

/// Progress notification: `(blocks done, blocks to translate)`.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Normalized source text -> translation, for the duration of one pass.
#[derive(Debug, Default)]
pub struct TranslationMemo {
    entries: HashMap<String, String>,
}

impl TranslationMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn insert(&mut self, source: String, translated: String) {
        self.entries.insert(source, translated);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters from one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Blocks that received a translation
    pub blocks_translated: usize,
    /// Distinct normalized texts seen
    pub unique_entries: usize,
    /// Blocks served from the memo
    pub cache_hits: usize,
    /// Calls made to the translation service
    pub requests: usize,
}

/// A block that still needs a translation, addressed by position.
struct Pending {
    page: usize,
    block: usize,
    source: String,
}

/// Translate every eligible block of `layout` in page then block order.
///
/// A block is skipped when it has no original text, when its normalized text
/// is blank, or when it already carries a non-empty translation.
pub async fn translate_document(
    layout: &mut LayoutDocument,
    source_lang: &Lang,
    target_lang: &Lang,
    translator: &dyn Translator,
    progress: Option<ProgressFn<'_>>,
) -> Result<DispatchReport> {
    let pending = collect_pending(layout);
    let total = pending.len();
    info!(
        "Dispatching {} blocks of {} to {} ({} -> {})",
        total,
        layout.document_id,
        translator.name(),
        source_lang,
        target_lang
    );

    let mut memo = TranslationMemo::new();
    let mut report = DispatchReport::default();
    let mut staged = Vec::with_capacity(total);

    for (done, item) in pending.into_iter().enumerate() {
        let translated = if let Some(hit) = memo.get(&item.source) {
            debug!("Memo hit for block {}:{}", item.page, item.block);
            report.cache_hits += 1;
            hit.to_string()
        } else {
            let translated = translator.translate(&item.source, source_lang, target_lang).await?;
            report.requests += 1;
            memo.insert(item.source, translated.clone());
            translated
        };

        staged.push((item.page, item.block, translated));

        if let Some(callback) = progress {
            callback(done + 1, total);
        }
    }

    for (page, block, translated) in staged {
        layout.pages[page].blocks[block].translated_text = Some(translated);
        report.blocks_translated += 1;
    }
    report.unique_entries = memo.len();

    info!(
        "Translated {} blocks ({} unique, {} memo hits, {} requests)",
        report.blocks_translated, report.unique_entries, report.cache_hits, report.requests
    );

    Ok(report)
}

fn collect_pending(layout: &LayoutDocument) -> Vec<Pending> {
    let mut pending = Vec::new();

    for (page_idx, page) in layout.pages.iter().enumerate() {
        for (block_idx, block) in page.blocks.iter().enumerate() {
            if block.original_text.is_none() || block.is_translated() {
                continue;
            }

            let source = normalize_opt(block.original_text.as_deref());
            if source.trim().is_empty() {
                debug!("Skipping blank block {}", block.block_id);
                continue;
            }

            pending.push(Pending {
                page: page_idx,
                block: block_idx,
                source,
            });
        }
    }

    pending
}
