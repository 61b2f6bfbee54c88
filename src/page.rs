//! Per-fetch result page.

use serde::Serialize;

use crate::comment::CommentRecord;

/// One comment node that could not be built into a record.
///
/// Recorded on the page instead of aborting it; the rest of the page is
/// still extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    /// What mandatory field or structure was missing.
    pub reason: String,
    /// Identifying context for the failed node, the comment id when one was
    /// readable.
    pub context: String,
}

/// One page of extraction results: built records in platform order, per-item
/// errors, and the token for the next page when one exists.
///
/// Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    items: Vec<CommentRecord>,
    errors: Vec<ItemError>,
    next_page: Option<String>,
}

impl ResultPage {
    #[must_use]
    pub fn new(
        items: Vec<CommentRecord>,
        errors: Vec<ItemError>,
        next_page: Option<String>,
    ) -> Self {
        Self {
            items,
            errors,
            next_page,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CommentRecord] {
        &self.items
    }

    #[must_use]
    pub fn errors(&self) -> &[ItemError] {
        &self.errors
    }

    /// Continuation token for the next page, absent once exhausted.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    /// Consume the page into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<CommentRecord>, Vec<ItemError>, Option<String>) {
        (self.items, self.errors, self.next_page)
    }
}
