//! The paginated extraction engine.
//!
//! A fetch resolves the client identity, issues one request, and parses the
//! response into a [`ResultPage`]. Pages are strictly sequential: each
//! continuation request depends on the token produced by the previous
//! response, so there is nothing to parallelize. The [`Paginator`] drives
//! the fetch-next loop and guards against a remote service that echoes the
//! same token forever.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::comment::build_comment;
use crate::config::ExtractorConfig;
use crate::error::Error;
use crate::identity::ClientIdentityCache;
use crate::page::ResultPage;
use crate::request;
use crate::transport::{HttpTransport, Transport};
use crate::walker;

/// Shared collaborators for one or more extraction sessions.
///
/// Cloning shares the transport and the identity cache, so concurrent
/// sessions within a process resolve the client identity at most once.
#[derive(Clone)]
pub struct Session {
    pub config: ExtractorConfig,
    pub transport: Arc<dyn Transport>,
    pub identity: ClientIdentityCache,
}

impl Session {
    /// Session backed by the default reqwest transport.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(&config));
        Self {
            config,
            transport,
            identity: ClientIdentityCache::new(),
        }
    }

    /// Session with an injected transport, used by tests and by callers
    /// that wrap the transport with their own retry policy.
    #[must_use]
    pub fn with_transport(config: ExtractorConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            identity: ClientIdentityCache::new(),
        }
    }
}

/// Public surface of a comments extractor, implemented per platform.
#[async_trait]
pub trait CommentsExtractor: Send + Sync {
    /// URL this extractor was created for.
    fn url(&self) -> &str;

    /// Perform the initial request and parse. Must be called once before
    /// the initial page is read; calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if identity resolution, the transport, or the
    /// parse fails.
    async fn fetch_page(&mut self) -> Result<(), Error>;

    /// The page produced by `fetch_page`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFetched`] if `fetch_page` has not run.
    fn initial_page(&self) -> Result<ResultPage, Error>;

    /// Fetch and parse the page identified by a continuation token.
    ///
    /// # Errors
    ///
    /// Returns a fatal error on transport, identity, or structural failure,
    /// and [`Error::InvalidArgument`] for an empty token.
    async fn page(&self, token: &str) -> Result<ResultPage, Error>;

    /// Whether the initial page carried a continuation token. False before
    /// `fetch_page`.
    fn has_next_page(&self) -> bool;
}

/// Comments extractor for the YouTube web client.
pub struct YoutubeCommentsExtractor {
    session: Session,
    url: String,
    video_id: String,
    initial: Option<ResultPage>,
}

impl YoutubeCommentsExtractor {
    #[must_use]
    pub fn new(session: Session, url: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
            video_id: video_id.into(),
            initial: None,
        }
    }

    async fn fetch(&self, api_request: crate::transport::ApiRequest) -> Result<ResultPage, Error> {
        let bytes = self.session.transport.send(&api_request).await?;
        let root: Value = serde_json::from_slice(&bytes)?;
        parse_page(&root, &self.video_id, &self.session.config.base_url)
    }
}

#[async_trait]
impl CommentsExtractor for YoutubeCommentsExtractor {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&mut self) -> Result<(), Error> {
        if self.initial.is_some() {
            return Ok(());
        }
        let identity = self
            .session
            .identity
            .resolve(self.session.transport.as_ref(), &self.session.config)
            .await?;
        let api_request = request::initial_request(&self.session.config, &identity, &self.video_id)?;
        debug!(video_id = %self.video_id, "Fetching initial comments page");
        let page = self.fetch(api_request).await?;
        self.initial = Some(page);
        Ok(())
    }

    fn initial_page(&self) -> Result<ResultPage, Error> {
        self.initial.clone().ok_or(Error::NotFetched)
    }

    async fn page(&self, token: &str) -> Result<ResultPage, Error> {
        let identity = self
            .session
            .identity
            .resolve(self.session.transport.as_ref(), &self.session.config)
            .await?;
        let api_request = request::continuation_request(&self.session.config, &identity, token)?;
        debug!(video_id = %self.video_id, "Fetching comments continuation page");
        self.fetch(api_request).await
    }

    fn has_next_page(&self) -> bool {
        self.initial.as_ref().is_some_and(ResultPage::has_next_page)
    }
}

/// Walk a response and build its comment records, isolating per-item
/// failures into the page's error list.
fn parse_page(root: &Value, video_id: &str, base_url: &str) -> Result<ResultPage, Error> {
    let nodes = walker::locate_comment_nodes(root)?;

    let mut items = Vec::with_capacity(nodes.len());
    let mut errors = Vec::new();
    for node in nodes {
        match build_comment(node, video_id, base_url) {
            Ok(record) => items.push(record),
            Err(error) => {
                warn!(context = %error.context, reason = %error.reason, "Skipping comment node");
                errors.push(error);
            }
        }
    }

    let next_page = walker::locate_continuation_token(root);
    info!(
        items = items.len(),
        errors = errors.len(),
        has_next = next_page.is_some(),
        "Parsed comments page"
    );
    Ok(ResultPage::new(items, errors, next_page))
}

/// Drives fetch-next over an extractor's continuation tokens.
///
/// Two states: a token is held (`has_more`) or pagination is exhausted.
/// Fetching while exhausted is a contract violation reported as
/// [`Error::PageExhausted`]. A response echoing the token that requested it
/// is treated as exhaustion so well-formed loops terminate.
pub struct Paginator<'a> {
    extractor: &'a dyn CommentsExtractor,
    next_token: Option<String>,
}

impl<'a> Paginator<'a> {
    /// Start paginating after `first_page`, whose token seeds the state.
    #[must_use]
    pub fn new(extractor: &'a dyn CommentsExtractor, first_page: &ResultPage) -> Self {
        Self {
            extractor,
            next_token: first_page.next_page().map(str::to_string),
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }

    /// Fetch the next page and advance the held token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageExhausted`] when called with no token held, or
    /// any fatal error from the underlying fetch.
    pub async fn fetch_next(&mut self) -> Result<ResultPage, Error> {
        let token = self.next_token.take().ok_or(Error::PageExhausted)?;
        let page = self.extractor.page(&token).await?;

        match page.next_page() {
            Some(next) if next == token => {
                warn!("Continuation token repeated; treating pagination as exhausted");
            }
            Some(next) => self.next_token = Some(next.to_string()),
            None => {}
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiRequest, TransportError};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const SW_BODY: &str = r#"{"INNERTUBE_API_KEY":"AIzaTestKey","INNERTUBE_CONTEXT_CLIENT_VERSION":"2.20260101.00.00"}"#;

    /// Transport that serves identity discovery from a canned body and API
    /// calls from a queue.
    struct QueueTransport {
        pages: Mutex<VecDeque<Value>>,
    }

    impl QueueTransport {
        fn new(pages: Vec<Value>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl Transport for QueueTransport {
        async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
            if request.url.ends_with("/sw.js") {
                return Ok(SW_BODY.as_bytes().to_vec());
            }
            let page = self
                .pages
                .lock()
                .expect("page queue poisoned")
                .pop_front()
                .expect("unexpected API request");
            Ok(page.to_string().into_bytes())
        }
    }

    fn comment_item(id: &str, text: &str) -> Value {
        json!({
            "commentThreadRenderer": {
                "comment": {
                    "commentRenderer": {
                        "commentId": id,
                        "authorText": { "simpleText": "Author" },
                        "authorThumbnail": { "thumbnails": [ { "url": "https://example.com/a.jpg" } ] },
                        "authorEndpoint": { "browseEndpoint": { "browseId": "UC1" } },
                        "contentText": { "runs": [ { "text": text } ] },
                        "publishedTimeText": { "simpleText": "1 day ago" },
                        "voteCount": { "simpleText": "3" },
                    }
                }
            }
        })
    }

    fn page_json(ids: &[&str], token: Option<&str>) -> Value {
        let mut items: Vec<Value> = ids.iter().map(|id| comment_item(id, "hello")).collect();
        if let Some(token) = token {
            items.push(json!({
                "continuationItemRenderer": {
                    "continuationEndpoint": { "continuationCommand": { "token": token } }
                }
            }));
        }
        json!({
            "onResponseReceivedEndpoints": [{
                "appendContinuationItemsAction": { "continuationItems": items }
            }]
        })
    }

    fn session(pages: Vec<Value>) -> Session {
        Session::with_transport(
            ExtractorConfig::with_base_url("http://127.0.0.1:1"),
            Arc::new(QueueTransport::new(pages)),
        )
    }

    #[tokio::test]
    async fn test_initial_page_is_idempotent() {
        let session = session(vec![page_json(&["a", "b"], Some("t1"))]);
        let mut extractor = YoutubeCommentsExtractor::new(session, "u", "vid");

        extractor.fetch_page().await.unwrap();
        // Second call must not refetch; the queue holds no more pages.
        extractor.fetch_page().await.unwrap();

        let first = extractor.initial_page().unwrap();
        let second = extractor.initial_page().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.items().len(), 2);
        assert!(extractor.has_next_page());
    }

    #[tokio::test]
    async fn test_initial_page_before_fetch_is_error() {
        let session = session(Vec::new());
        let extractor = YoutubeCommentsExtractor::new(session, "u", "vid");
        assert!(matches!(extractor.initial_page(), Err(Error::NotFetched)));
        assert!(!extractor.has_next_page());
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let session = session(Vec::new());
        let extractor = YoutubeCommentsExtractor::new(session, "u", "vid");
        assert!(matches!(
            extractor.page("").await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_paginator_walks_until_exhausted() {
        let session = session(vec![
            page_json(&["a"], Some("t1")),
            page_json(&["b"], Some("t2")),
            page_json(&["c"], None),
        ]);
        let mut extractor = YoutubeCommentsExtractor::new(session, "u", "vid");
        extractor.fetch_page().await.unwrap();
        let first = extractor.initial_page().unwrap();

        let mut paginator = Paginator::new(&extractor, &first);
        let mut seen = vec![first.items()[0].comment_id.clone()];
        while paginator.has_more() {
            let page = paginator.fetch_next().await.unwrap();
            seen.push(page.items()[0].comment_id.clone());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);

        assert!(matches!(
            paginator.fetch_next().await,
            Err(Error::PageExhausted)
        ));
    }

    #[tokio::test]
    async fn test_repeated_token_treated_as_exhaustion() {
        // The second page echoes the token that requested it.
        let session = session(vec![
            page_json(&["a"], Some("loop")),
            page_json(&["b"], Some("loop")),
        ]);
        let mut extractor = YoutubeCommentsExtractor::new(session, "u", "vid");
        extractor.fetch_page().await.unwrap();
        let first = extractor.initial_page().unwrap();

        let mut paginator = Paginator::new(&extractor, &first);
        let page = paginator.fetch_next().await.unwrap();
        assert_eq!(page.items()[0].comment_id, "b");
        assert!(!paginator.has_more());
    }

    #[tokio::test]
    async fn test_structural_mismatch_is_fatal() {
        let session = session(vec![json!({ "unexpected": {} })]);
        let mut extractor = YoutubeCommentsExtractor::new(session, "u", "vid");
        assert!(matches!(
            extractor.fetch_page().await,
            Err(Error::StructuralMismatch(_))
        ));
    }
}
