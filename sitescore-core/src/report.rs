// Report generation from database

use crate::data::{Database, Page, Website};
use rusqlite::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    pub website: Website,
    /// Highest score first
    pub pages: Vec<Page>,
}

impl SiteReport {
    pub fn average_score(&self) -> f64 {
        if self.pages.is_empty() {
            return 0.0;
        }
        let total: u64 = self.pages.iter().map(|p| p.score as u64).sum();
        total as f64 / self.pages.len() as f64
    }
}

/// Load a stored website and its pages. `None` when the domain was never crawled.
pub fn gather_site_report(db: &Database, domain: &str) -> Result<Option<SiteReport>> {
    let Some(website) = db.find_website_by_domain(domain)? else {
        return Ok(None);
    };

    let mut pages = db.list_pages(website.id)?;
    pages.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    Ok(Some(SiteReport { website, pages }))
}

pub fn generate_text_report(report: &SiteReport) -> String {
    let website = &report.website;
    let mut out = String::new();

    out.push_str(RULE);
    out.push_str("                          SITESCORE SITE REPORT\n");
    out.push_str(RULE);
    out.push('\n');

    out.push_str(&format!("Site:         {}\n", website.title));
    out.push_str(&format!("Domain:       {}\n", website.domain));
    out.push_str(&format!("URL:          {}\n", website.url));
    out.push_str(&format!("Crawled:      {}\n", format_timestamp(website.crawled_at)));
    out.push_str(&format!("Pages:        {}\n", website.pages_count));
    out.push_str(&format!("HTML5:        {}\n", if website.is_html5 { "yes" } else { "no" }));
    out.push_str(&format!("Avg. score:   {:.1}\n", report.average_score()));
    out.push('\n');

    out.push_str(RULE);
    out.push_str("PAGES BY SCORE\n");
    out.push_str(RULE);
    out.push('\n');

    for page in &report.pages {
        let lines = page
            .lines_count
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:>4}  {}\n        lines: {}  images: {}  title: {}\n",
            page.score,
            page.url,
            lines,
            page.images_count,
            if page.title.is_empty() { "(none)" } else { page.title.as_str() },
        ));
    }
    out.push('\n');

    out
}

pub fn generate_json_report(report: &SiteReport) -> std::result::Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Sitescore",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "website": report.website,
            "summary": {
                "pages_count": report.website.pages_count,
                "average_score": report.average_score()
            },
            "pages": report.pages
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// One line per stored website.
pub fn generate_website_list(websites: &[Website]) -> String {
    let mut out = String::new();
    for website in websites {
        out.push_str(&format!(
            "{:>4}  {:<32} {:>6} pages  html5: {:<3}  {}\n",
            website.id,
            website.domain,
            website.pages_count,
            if website.is_html5 { "yes" } else { "no" },
            format_timestamp(website.crawled_at),
        ));
    }
    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    use chrono::{DateTime, Utc};
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
