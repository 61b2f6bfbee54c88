//! Service selection and the service-agnostic facade.
//!
//! The engine is written against the [`CommentsExtractor`] trait; each
//! supported platform contributes a [`CommentsService`] that recognizes its
//! URLs and constructs the right extractor. The facade functions layer the
//! extractor surface into a one-call interface.

use serde::Serialize;
use url::Url;

use crate::comment::CommentRecord;
use crate::error::Error;
use crate::extractor::{CommentsExtractor, Session, YoutubeCommentsExtractor};
use crate::page::{ItemError, ResultPage};

/// One supported platform.
pub trait CommentsService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this service recognizes the URL.
    fn handles(&self, url: &str) -> bool;

    /// Construct a comments extractor for the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the URL is recognized but
    /// carries no extractable content id.
    fn comments_extractor(
        &self,
        session: Session,
        url: &str,
    ) -> Result<Box<dyn CommentsExtractor>, Error>;
}

/// Registry of supported services, tried in insertion order.
pub struct ServiceRegistry {
    services: Vec<Box<dyn CommentsService>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self {
            services: vec![Box::new(YoutubeService)],
        }
    }
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the service handling the URL, if any.
    #[must_use]
    pub fn find(&self, url: &str) -> Option<&dyn CommentsService> {
        self.services
            .iter()
            .find(|s| s.handles(url))
            .map(AsRef::as_ref)
    }
}

/// The YouTube web client service.
pub struct YoutubeService;

impl CommentsService for YoutubeService {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn handles(&self, url: &str) -> bool {
        extract_video_id(url).is_some()
    }

    fn comments_extractor(
        &self,
        session: Session,
        url: &str,
    ) -> Result<Box<dyn CommentsExtractor>, Error> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| Error::InvalidArgument(format!("no video id in url: {url}")))?;
        Ok(Box::new(YoutubeCommentsExtractor::new(
            session, url, video_id,
        )))
    }
}

/// Extract the video ID from a watch URL.
///
/// Supports formats:
/// - https://www.youtube.com/watch?v=ID
/// - https://youtu.be/ID
/// - https://www.youtube.com/shorts/ID
fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    if host == "youtube.com" {
        if parsed.path() == "/watch" {
            return parsed
                .query_pairs()
                .find(|(name, _)| name == "v")
                .map(|(_, value)| value.into_owned())
                .filter(|id| !id.is_empty());
        }
        if let Some(id) = parsed.path().strip_prefix("/shorts/") {
            return Some(id.trim_matches('/').to_string()).filter(|id| !id.is_empty());
        }
        return None;
    }
    if host == "youtu.be" {
        let id = parsed.path().trim_matches('/');
        return if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        };
    }
    None
}

/// Comments info for a content URL: the list name, the initial items, and
/// the token for fetching more.
#[derive(Debug, Clone, Serialize)]
pub struct CommentsInfo {
    pub name: String,
    pub service: &'static str,
    pub url: String,
    pub items: Vec<CommentRecord>,
    pub errors: Vec<ItemError>,
    pub next_page: Option<String>,
}

impl CommentsInfo {
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Fetch the initial comments page for any supported platform URL.
///
/// # Errors
///
/// Returns [`Error::UnsupportedUrl`] if no service handles the URL, or any
/// fatal error from the underlying fetch.
pub async fn get_info(
    registry: &ServiceRegistry,
    session: Session,
    url: &str,
) -> Result<CommentsInfo, Error> {
    let service = registry
        .find(url)
        .ok_or_else(|| Error::UnsupportedUrl(url.to_string()))?;
    let mut extractor = service.comments_extractor(session, url)?;
    extractor.fetch_page().await?;
    let (items, errors, next_page) = extractor.initial_page()?.into_parts();
    Ok(CommentsInfo {
        name: "Comments".to_string(),
        service: service.name(),
        url: url.to_string(),
        items,
        errors,
        next_page,
    })
}

/// Fetch a further comments page for previously obtained info.
///
/// # Errors
///
/// Returns any fatal error from the underlying fetch, or
/// [`Error::InvalidArgument`] for an empty token.
pub async fn get_more_items(
    service: &dyn CommentsService,
    session: Session,
    info: &CommentsInfo,
    token: &str,
) -> Result<ResultPage, Error> {
    let extractor = service.comments_extractor(session, &info.url)?;
    extractor.page(token).await
}
