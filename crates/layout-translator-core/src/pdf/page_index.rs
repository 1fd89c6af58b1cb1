//! Page index newtype bridging `usize` page numbers and MuPDF's `i32`.

use std::fmt;

use crate::error::Error;

/// A validated 0-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(i32);

impl PageIndex {
    /// Check `page_num` against the document's page count and convert.
    pub fn try_from_page_num(page_num: usize, total_pages: usize) -> Result<Self, Error> {
        let invalid = || Error::PdfInvalidPage {
            page: page_num,
            total: total_pages,
        };

        if page_num >= total_pages {
            return Err(invalid());
        }

        i32::try_from(page_num).map(Self).map_err(|_| invalid())
    }

    /// 1-based page number, as lopdf's page map uses.
    #[must_use]
    pub const fn as_lopdf_page_number(self) -> u32 {
        (self.0 + 1).cast_unsigned()
    }
}

impl From<PageIndex> for i32 {
    fn from(index: PageIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_page() {
        let idx = PageIndex::try_from_page_num(5, 10).unwrap();
        assert_eq!(i32::from(idx), 5);
        assert_eq!(idx.to_string(), "5");
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            PageIndex::try_from_page_num(10, 5),
            Err(Error::PdfInvalidPage { page: 10, total: 5 })
        ));
    }

    #[test]
    fn test_lopdf_numbers_are_one_based() {
        assert_eq!(PageIndex::try_from_page_num(0, 1).unwrap().as_lopdf_page_number(), 1);
        assert_eq!(PageIndex::try_from_page_num(5, 9).unwrap().as_lopdf_page_number(), 6);
    }
}
