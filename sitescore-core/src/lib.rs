pub mod crawl;
pub mod data;
pub mod error;
pub mod report;
pub mod scoring;

pub use crawl::{CrawlOptions, CrawlOutcome, crawl_site};
pub use data::{Database, Page, Website};
pub use error::CrawlError;
