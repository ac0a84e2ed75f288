//! Page quality heuristic.
//!
//! The score depends on the site-wide page count, which is only final once the traversal
//! has drained, so scores are assigned in a second pass over the stored pages.

use crate::data::{Database, Page, Website};
use rusqlite::Result;
use tracing::debug;

const TITLE_POINTS: u32 = 10;
const DESCRIPTION_POINTS: u32 = 10;
const HTML5_POINTS: u32 = 10;
const PAGES_PER_STEP: u32 = 50;
const SITE_SIZE_POINTS: u32 = 4;
const LINES_PER_STEP: u32 = 50;
const CONTENT_POINTS: u32 = 5;
const IMAGE_POINTS: u32 = 2;

/// Score of `page` given its own metadata and the aggregate metadata of `website`.
///
/// A page without a line count (no `<body>`) contributes nothing for content length.
pub fn score(page: &Page, website: &Website) -> u32 {
    let mut score = 0;
    if !page.title.is_empty() {
        score += TITLE_POINTS;
    }
    if !page.description.is_empty() {
        score += DESCRIPTION_POINTS;
    }
    if website.is_html5 {
        score += HTML5_POINTS;
    }
    score += SITE_SIZE_POINTS * (website.pages_count / PAGES_PER_STEP);
    score += CONTENT_POINTS * (page.lines_count.unwrap_or(0) / LINES_PER_STEP);
    score += IMAGE_POINTS * page.images_count;
    score
}

/// Recompute and store the score of every page of `website`. Returns the number of pages
/// scored.
pub fn assign_scores(db: &Database, website: &Website) -> Result<usize> {
    let pages = db.list_pages(website.id)?;
    for page in &pages {
        let page_score = score(page, website);
        debug!("Score {} for {}", page_score, page.url);
        db.update_page_score(page.id, page_score)?;
    }
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn website(pages_count: u32, is_html5: bool) -> Website {
        Website {
            id: 1,
            url: "http://example.com/".to_string(),
            title: "Example".to_string(),
            domain: "example.com".to_string(),
            pages_count,
            is_html5,
            crawled_at: 0,
        }
    }

    fn page(title: &str, description: &str, lines_count: Option<u32>, images_count: u32) -> Page {
        Page {
            id: 1,
            website_id: 1,
            url: "http://example.com/".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            lines_count,
            images_count,
            score: 0,
        }
    }

    #[test]
    fn test_reference_score() {
        let score = score(&page("T", "", Some(75), 3), &website(120, true));
        assert_eq!(score, 39);
    }

    #[test]
    fn test_empty_page_on_small_site_scores_zero() {
        assert_eq!(score(&page("", "", Some(49), 0), &website(49, false)), 0);
    }

    #[test]
    fn test_thresholds_truncate() {
        assert_eq!(score(&page("", "", Some(50), 0), &website(50, false)), 5 + 4);
        assert_eq!(score(&page("", "", Some(99), 0), &website(99, false)), 5 + 4);
        assert_eq!(score(&page("", "", Some(100), 0), &website(100, false)), 10 + 8);
    }

    #[test]
    fn test_missing_line_count_counts_as_zero() {
        assert_eq!(score(&page("T", "D", None, 1), &website(1, true)), 32);
    }
}
