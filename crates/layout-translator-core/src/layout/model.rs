use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bbox::BoundingBox;
use crate::error::{Error, Result};

/// A whole document's layout: the interchange format between extraction,
/// translation and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    /// Opaque identifier assigned at extraction time
    pub document_id: String,
    /// Pages in source order
    pub pages: Vec<LayoutPage>,
}

/// One page of a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    /// 0-based index of the page in the source PDF
    pub page_index: usize,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
}

/// A contiguous text region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBlock {
    pub block_id: String,
    pub bbox: BoundingBox,
    /// Extracted text; `None` for regions that carry no text
    #[serde(default)]
    pub original_text: Option<String>,
    /// `None` until translated. A non-empty value is never overwritten.
    #[serde(default)]
    pub translated_text: Option<String>,
}

impl LayoutBlock {
    /// Create a block with untranslated text.
    pub fn new(block_id: impl Into<String>, bbox: BoundingBox, original_text: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            bbox,
            original_text: Some(original_text.into()),
            translated_text: None,
        }
    }

    /// Whether the block already carries a usable translation.
    pub fn is_translated(&self) -> bool {
        self.translated_text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Text to draw for this block: the translation when present and
    /// non-empty, else the original. Line endings normalized, outer
    /// whitespace trimmed. Empty when the block has no text at all.
    pub fn display_text(&self) -> String {
        let raw = match self.translated_text.as_deref() {
            Some(t) if !t.is_empty() => Some(t),
            _ => self.original_text.as_deref(),
        };

        raw.map(|t| t.replace("\r\n", "\n").replace('\r', "\n").trim().to_string())
            .unwrap_or_default()
    }
}

impl LayoutDocument {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            pages: Vec::new(),
        }
    }

    /// Parse a layout document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::LayoutFormat(e.to_string()))
    }

    /// Serialize as indented JSON (non-ASCII characters are written as-is).
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::LayoutFormat(e.to_string()))
    }

    /// Read a layout document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::LayoutFormat(format!("Failed to read layout {}: {}", path.display(), e))
        })?;
        let layout = Self::from_json(&content)?;
        debug!("Loaded layout {} ({} pages) from {}", layout.document_id, layout.pages.len(), path.display());
        Ok(layout)
    }

    /// Write the layout document to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Keep only the first `max_pages` pages. `None` or `Some(0)` keeps all.
    pub fn truncate_pages(&mut self, max_pages: Option<usize>) {
        if let Some(max) = max_pages.filter(|&m| m > 0)
            && self.pages.len() > max
        {
            debug!("Truncating layout from {} to {} pages", self.pages.len(), max);
            self.pages.truncate(max);
        }
    }

    /// Total number of blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }

    /// Total number of characters of original text across all blocks.
    pub fn char_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .filter_map(|b| b.original_text.as_deref())
            .map(|t| t.chars().count())
            .sum()
    }

    /// Iterate over every block in page order, then block order.
    pub fn blocks(&self) -> impl Iterator<Item = &LayoutBlock> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "documentId": "report-1a2b3c4d",
        "pages": [
            {
                "pageIndex": 0,
                "width": 595.0,
                "height": 842.0,
                "blocks": [
                    { "blockId": "p0-blk-0", "bbox": [10, 20, 200, 60],
                      "originalText": "Hola mundo", "translatedText": null },
                    { "blockId": "p0-blk-1", "bbox": [10, 70, 200, 90],
                      "originalText": null }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_interchange_shape() {
        let layout = LayoutDocument::from_json(SAMPLE).unwrap();
        assert_eq!(layout.document_id, "report-1a2b3c4d");
        assert_eq!(layout.pages.len(), 1);

        let page = &layout.pages[0];
        assert_eq!(page.page_index, 0);
        assert_eq!(page.blocks[0].bbox, BoundingBox::new(10.0, 20.0, 200.0, 60.0));
        assert_eq!(page.blocks[0].original_text.as_deref(), Some("Hola mundo"));
        assert!(page.blocks[0].translated_text.is_none());
        assert!(page.blocks[1].original_text.is_none());
    }

    #[test]
    fn test_serialize_uses_camel_case_and_nulls() {
        let layout = LayoutDocument::from_json(SAMPLE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&layout.to_json_pretty().unwrap()).unwrap();

        let block = &value["pages"][0]["blocks"][0];
        assert_eq!(block["blockId"], "p0-blk-0");
        assert_eq!(block["bbox"], serde_json::json!([10.0, 20.0, 200.0, 60.0]));
        assert!(block["translatedText"].is_null());
        assert_eq!(value["pages"][0]["pageIndex"], 0);
    }

    #[test]
    fn test_malformed_json_is_layout_error() {
        let err = LayoutDocument::from_json("{\"pages\": 3}").unwrap_err();
        assert!(matches!(err, Error::LayoutFormat(_)));
    }

    #[test]
    fn test_display_text_prefers_translation() {
        let mut block = LayoutBlock::new("b", BoundingBox::new(0.0, 0.0, 10.0, 10.0), "  Hola\r\nmundo ");
        assert_eq!(block.display_text(), "Hola\nmundo");

        block.translated_text = Some(String::new());
        assert_eq!(block.display_text(), "Hola\nmundo");

        block.translated_text = Some("Hello world".to_string());
        assert_eq!(block.display_text(), "Hello world");
    }

    #[test]
    fn test_display_text_empty_without_text() {
        let block = LayoutBlock {
            block_id: "img".to_string(),
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            original_text: None,
            translated_text: None,
        };
        assert_eq!(block.display_text(), "");
    }

    #[test]
    fn test_is_translated_ignores_blank() {
        let mut block = LayoutBlock::new("b", BoundingBox::new(0.0, 0.0, 1.0, 1.0), "x");
        assert!(!block.is_translated());
        block.translated_text = Some("   ".to_string());
        assert!(!block.is_translated());
        block.translated_text = Some("y".to_string());
        assert!(block.is_translated());
    }

    #[test]
    fn test_truncate_pages() {
        let mut layout = LayoutDocument::new("doc");
        for i in 0..5 {
            layout.pages.push(LayoutPage { page_index: i, width: 100.0, height: 100.0, blocks: vec![] });
        }

        layout.truncate_pages(None);
        assert_eq!(layout.pages.len(), 5);
        layout.truncate_pages(Some(0));
        assert_eq!(layout.pages.len(), 5);
        layout.truncate_pages(Some(2));
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[1].page_index, 1);
    }

    #[test]
    fn test_counts() {
        let layout = LayoutDocument::from_json(SAMPLE).unwrap();
        assert_eq!(layout.block_count(), 2);
        assert_eq!(layout.char_count(), "Hola mundo".len());
    }
}
