//! In-memory and serialized representation of a document's layout.

mod bbox;
mod model;

pub use bbox::BoundingBox;
pub use model::{LayoutBlock, LayoutDocument, LayoutPage};
