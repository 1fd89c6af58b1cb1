use mupdf::{Document as MuDocument, TextPageOptions};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::{BoundingBox, LayoutBlock, LayoutDocument, LayoutPage};
use crate::util::document_id_for;
use super::document::PdfDocument;
use super::page_index::PageIndex;

/// Builds a [`LayoutDocument`] from a PDF's structured text.
///
/// Each MuPDF block becomes one layout block: its lines are joined with
/// `\n`, cleaned with [`clean_block_text`], and its bbox is the union of the
/// character quads.
pub struct LayoutExtractor<'a> {
    /// The PDF document to extract text from
    pub doc: &'a PdfDocument,
    /// Overrides the generated document id
    pub document_id: Option<String>,
}

impl<'a> LayoutExtractor<'a> {
    pub const fn new(doc: &'a PdfDocument) -> Self {
        Self {
            doc,
            document_id: None,
        }
    }

    #[must_use]
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    /// Extract every page, in source order.
    pub fn extract(&self) -> Result<LayoutDocument> {
        let document_id = self
            .document_id
            .clone()
            .unwrap_or_else(|| document_id_for(self.doc.path()));
        let mut layout = LayoutDocument::new(document_id);

        let doc = self.doc.open_document()?;
        for page_num in 0..self.doc.page_count() {
            layout.pages.push(Self::extract_from(&doc, page_num, self.doc.page_count())?);
        }

        info!(
            "Extracted {} pages, {} blocks, {} characters from {}",
            layout.pages.len(),
            layout.block_count(),
            layout.char_count(),
            layout.document_id
        );
        if let Some(title) = &self.doc.metadata().title {
            debug!("Document title: {}", title);
        }

        Ok(layout)
    }

    fn extract_from(doc: &MuDocument, page_num: usize, total: usize) -> Result<LayoutPage> {
        let page_index = PageIndex::try_from_page_num(page_num, total)?;
        let extraction_error = |reason: String| Error::PdfTextExtraction { page: page_num, reason };

        let page = doc
            .load_page(page_index.into())
            .map_err(|e| extraction_error(format!("Failed to load page: {e}")))?;

        let bounds = page
            .bounds()
            .map_err(|e| extraction_error(format!("Failed to get bounds: {e}")))?;

        let text_page = page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| extraction_error(format!("Failed to get text page: {e}")))?;

        let mut blocks = Vec::new();

        for block in text_page.blocks() {
            let mut lines = Vec::new();
            let mut block_bbox: Option<BoundingBox> = None;

            for line in block.lines() {
                let mut line_text = String::new();

                for text_char in line.chars() {
                    if let Some(c) = text_char.char() {
                        line_text.push(c);
                    }

                    let char_bbox = BoundingBox::from_quad(&text_char.quad());
                    block_bbox = Some(block_bbox.map_or(char_bbox, |bbox| bbox.union(char_bbox)));
                }

                lines.push(line_text);
            }

            let text = clean_block_text(&lines.join("\n"));
            if text.is_empty() {
                continue;
            }

            let Some(bbox) = block_bbox else {
                continue;
            };

            let block_id = format!("p{page_num}-blk-{}", blocks.len());
            blocks.push(LayoutBlock::new(block_id, bbox, text));
        }

        debug!("Page {}: {} blocks", page_num, blocks.len());

        Ok(LayoutPage {
            page_index: page_num,
            width: bounds.x1 - bounds.x0,
            height: bounds.y1 - bounds.y0,
            blocks,
        })
    }
}

/// Cleanup applied to each extracted block:
/// - a hyphen at a line end joins the two halves of the word
/// - whitespace inside each line collapses to single spaces
/// - surrounding whitespace is trimmed
///
/// Line breaks are kept.
pub fn clean_block_text(text: &str) -> String {
    text.replace("-\n", "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_joins_hyphenated_words() {
        assert_eq!(clean_block_text("medi-\ncion larga"), "medicion larga");
    }

    #[test]
    fn test_clean_collapses_whitespace_per_line() {
        assert_eq!(clean_block_text("  uno \t dos  \ntres   cuatro "), "uno dos\ntres cuatro");
    }

    #[test]
    fn test_clean_keeps_line_breaks() {
        assert_eq!(clean_block_text("Titulo\n\nCuerpo"), "Titulo\n\nCuerpo");
    }

    #[test]
    fn test_clean_blank_is_empty() {
        assert_eq!(clean_block_text(" \n \t\n"), "");
        assert_eq!(clean_block_text(""), "");
    }
}
