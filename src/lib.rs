//! Comment Harvester library.
//!
//! Extracts structured comment data from video platforms' undocumented
//! internal web APIs: resolves the client identity the platform expects,
//! walks its loosely shaped JSON responses, and pages through comments via
//! opaque continuation tokens.

pub mod comment;
pub mod config;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod page;
pub mod request;
pub mod service;
pub mod transport;
pub mod walker;

pub use comment::CommentRecord;
pub use config::ExtractorConfig;
pub use error::Error;
pub use extractor::{CommentsExtractor, Paginator, Session};
pub use identity::{ClientIdentity, ClientIdentityCache};
pub use page::{ItemError, ResultPage};
pub use service::{get_info, get_more_items, CommentsInfo, CommentsService, ServiceRegistry};
pub use transport::{ApiRequest, HttpTransport, Transport, TransportError};
