pub mod classify;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod result;

pub use classify::HostMatch;
pub use crawler::{CrawlSummary, Crawler, PageSink, ProgressCallback};
pub use error::ScanError;
pub use extract::PageMetadata;
pub use fetch::{Fetch, FetchResponse, HttpFetcher};
pub use result::CrawledPage;
