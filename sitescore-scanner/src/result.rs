use crate::extract::PageMetadata;
use serde::{Deserialize, Serialize};

/// A page that was fetched with status 200 during a traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    pub metadata: PageMetadata,
    pub links_found: Vec<String>,
}

impl CrawledPage {
    pub fn new(url: String, metadata: PageMetadata) -> Self {
        Self {
            url,
            metadata,
            links_found: Vec::new(),
        }
    }
}
