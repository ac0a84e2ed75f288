use crate::classify::{self, HostMatch};
use crate::error::{Result, ScanError};
use crate::extract::PageMetadata;
use crate::fetch::Fetch;
use crate::result::CrawledPage;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Called once per dequeued, not-yet-visited URL with the number of pages stored so far.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Receives every successfully fetched page as soon as it has been extracted.
pub trait PageSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn store(&mut self, page: &CrawledPage) -> std::result::Result<(), Self::Error>;
}

impl PageSink for Vec<CrawledPage> {
    type Error = Infallible;

    fn store(&mut self, page: &CrawledPage) -> std::result::Result<(), Self::Error> {
        self.push(page.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Pages fetched with status 200 and handed to the sink.
    pub pages_count: usize,
    pub visited_count: usize,
    /// Visited URLs dropped because of a transport failure or a non-200 status.
    pub skipped_count: usize,
}

/// Queue, visited set and counters of one traversal run.
#[derive(Debug, Default)]
struct CrawlState {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    pages_count: usize,
    skipped_count: usize,
}

impl CrawlState {
    fn new(seed: String) -> Self {
        let mut state = Self::default();
        state.queue.push_back(seed);
        state
    }

    fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            pages_count: self.pages_count,
            visited_count: self.visited.len(),
            skipped_count: self.skipped_count,
        }
    }
}

/// Breadth-first walker over the internal links of a single domain.
pub struct Crawler<F> {
    fetcher: F,
    domain: String,
    host_match: HostMatch,
    progress_callback: Option<ProgressCallback>,
}

impl<F: Fetch> Crawler<F> {
    /// `domain` is lowercased, since parsed URLs always carry a lowercase host.
    pub fn new(fetcher: F, domain: impl Into<String>) -> Self {
        Self {
            fetcher,
            domain: domain.into().to_ascii_lowercase(),
            host_match: HostMatch::default(),
            progress_callback: None,
        }
    }

    pub fn with_host_match(mut self, host_match: HostMatch) -> Self {
        self.host_match = host_match;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Walk the domain from `start_url` until the queue drains.
    ///
    /// Fetch failures and non-200 responses skip that URL only. A sink error aborts the
    /// whole run, since the stored page set would no longer match the summary.
    pub async fn crawl<S: PageSink>(&self, start_url: &str, sink: &mut S) -> Result<CrawlSummary> {
        let seed = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        info!("Starting crawl of {} from {}", self.domain, seed);

        let mut state = CrawlState::new(seed.to_string());

        while let Some(url) = state.queue.pop_front() {
            if !state.visited.insert(url.clone()) {
                continue;
            }

            if let Some(ref callback) = self.progress_callback {
                callback(state.pages_count, url.clone());
            }

            let response = match self.fetcher.fetch(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    state.skipped_count += 1;
                    continue;
                }
            };

            if !response.is_ok() {
                debug!("Skipping {}: status {}", url, response.status_code);
                state.skipped_count += 1;
                continue;
            }

            let page = self.process_page(&url, &response.body);
            sink.store(&page)
                .map_err(|e| ScanError::Storage(Box::new(e)))?;
            state.pages_count += 1;

            for link in page.links_found {
                if !state.visited.contains(&link) {
                    state.queue.push_back(link);
                }
            }
        }

        let summary = state.summary();
        info!(
            "Crawl of {} complete. {} pages stored, {} skipped",
            self.domain, summary.pages_count, summary.skipped_count
        );
        Ok(summary)
    }

    fn process_page(&self, url: &str, body: &str) -> CrawledPage {
        let document = Html::parse_document(body);
        let mut page = CrawledPage::new(url.to_string(), PageMetadata::from_document(body, &document));
        page.links_found = discover_links(&document, url, &self.domain, self.host_match);
        page
    }
}

/// Absolute URLs of every internal `<a href>` in the document, in document order.
pub fn discover_links(document: &Html, page_url: &str, domain: &str, host_match: HostMatch) -> Vec<String> {
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute_url) = classify::resolve(page_url, href)
        {
            if host_match.is_outgoing(domain, &absolute_url) {
                debug!("  -> Outgoing, skipping {}", absolute_url);
            } else {
                links.push(absolute_url);
            }
        }
    }
    links
}
