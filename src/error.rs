use thiserror::Error;

use crate::transport::TransportError;

/// Errors that abort a page fetch.
///
/// Per-item extraction failures are not represented here; they are collected
/// on the page as [`crate::page::ItemError`] values and never abort a fetch.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed before any parse began.
    #[error("transport failure")]
    Transport(#[from] TransportError),

    /// Client identity discovery failed; requests cannot be built without it.
    #[error("failed to resolve client identity: {0}")]
    IdentityResolution(String),

    /// None of the known response layouts matched. The remote schema has
    /// likely changed.
    #[error("response structure matched no known layout: {0}")]
    StructuralMismatch(String),

    /// The response body was not valid JSON at all.
    #[error("response body is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),

    /// A next page was requested after pagination was exhausted. Callers
    /// must check `has_next_page()` first.
    #[error("no further pages are available")]
    PageExhausted,

    /// The initial page was requested before `fetch_page` ran.
    #[error("initial page has not been fetched yet")]
    NotFetched,

    /// A caller-supplied argument violated a constraint.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No registered service handles the given URL.
    #[error("no service handles url: {0}")]
    UnsupportedUrl(String),
}
