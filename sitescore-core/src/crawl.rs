use crate::data::{Database, Website, current_timestamp};
use crate::error::Result;
use crate::scoring;
use serde::{Deserialize, Serialize};
use sitescore_scanner::{
    CrawlSummary, CrawledPage, Crawler, Fetch, HostMatch, PageMetadata, PageSink,
    ProgressCallback, ScanError,
};
use tracing::{info, warn};
use url::Url;

/// Options for configuring a site crawl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOptions {
    /// Seed the crawl with `https://<domain>` instead of `http://<domain>`
    pub use_https: bool,
    pub host_match: HostMatch,
}

/// What a call to [`crawl_site`] did.
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// The domain already has a website record; nothing was fetched.
    AlreadyCrawled(Website),
    /// The root page could not be fetched or did not answer 200.
    RootUnavailable { url: String, reason: String },
    /// The root page has no title and is not treated as a real site.
    UntitledRoot { url: String },
    Completed {
        website: Website,
        summary: CrawlSummary,
    },
}

/// Persists pages under a website id reserved before the traversal starts.
struct DatabaseSink<'a> {
    db: &'a Database,
    website_id: i64,
}

impl PageSink for DatabaseSink<'_> {
    type Error = rusqlite::Error;

    fn store(&mut self, page: &CrawledPage) -> std::result::Result<(), Self::Error> {
        self.db.insert_page(self.website_id, page)?;
        Ok(())
    }
}

/// Seed URL of a domain, normalised the same way discovered links are.
pub fn root_url(domain: &str, options: &CrawlOptions) -> Result<String> {
    let scheme = if options.use_https { "https" } else { "http" };
    let url = Url::parse(&format!("{}://{}", scheme, domain))
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", domain, e)))?;
    Ok(url.to_string())
}

fn stored_page_total(pages_count: usize) -> Result<u32> {
    u32::try_from(pages_count).map_err(|_| {
        ScanError::Other(format!("{} pages exceed the storable page count", pages_count)).into()
    })
}

/// Crawl `domain` once, store its website and pages, then score every page.
///
/// Returns early, without touching the database, when the domain was crawled before or
/// its root page is unusable. The domain is matched and stored in lowercase.
pub async fn crawl_site<F: Fetch + Sync>(
    db: &Database,
    fetcher: &F,
    domain: &str,
    options: &CrawlOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<CrawlOutcome> {
    let domain = &domain.to_ascii_lowercase();
    if let Some(website) = db.find_website_by_domain(domain)? {
        info!("{} already crawled as website {}", domain, website.id);
        return Ok(CrawlOutcome::AlreadyCrawled(website));
    }

    let url = root_url(domain, options)?;
    let response = match fetcher.fetch(&url).await {
        Ok(response) if response.is_ok() => response,
        Ok(response) => {
            return Ok(CrawlOutcome::RootUnavailable {
                url,
                reason: format!("status {}", response.status_code),
            });
        }
        Err(e) => {
            return Ok(CrawlOutcome::RootUnavailable {
                url,
                reason: e.to_string(),
            });
        }
    };

    let root = PageMetadata::from_markup(&response.body);
    if root.title.is_empty() {
        return Ok(CrawlOutcome::UntitledRoot { url });
    }

    let website_id = db.count_websites()? + 1;
    let stale = db.delete_pages(website_id)?;
    if stale > 0 {
        warn!(
            "Removed {} pages left under website {} by an interrupted crawl",
            stale, website_id
        );
    }

    let mut crawler = Crawler::new(fetcher, domain).with_host_match(options.host_match);
    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(callback);
    }

    let mut sink = DatabaseSink { db, website_id };
    let summary = crawler.crawl(&url, &mut sink).await?;

    let website = Website {
        id: website_id,
        url,
        title: root.title,
        domain: domain.to_string(),
        pages_count: stored_page_total(summary.pages_count)?,
        is_html5: root.is_html5,
        crawled_at: current_timestamp(),
    };
    db.insert_website(&website)?;

    let scored = scoring::assign_scores(db, &website)?;
    info!("Scored {} pages of {}", scored, domain);

    Ok(CrawlOutcome::Completed { website, summary })
}
