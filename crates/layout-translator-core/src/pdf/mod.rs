mod document;
mod extract;
mod page_index;
mod writer;

pub use document::{DocumentMetadata, PdfDocument};
pub use extract::{clean_block_text, LayoutExtractor};
pub use page_index::PageIndex;
pub use writer::{encode_win_ansi, PdfWriter};
