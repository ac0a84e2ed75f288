//! Page metadata extraction.
//!
//! Every function here is total: a missing element degrades to an empty string, zero or
//! `None` instead of an error, so malformed markup never stops a crawl.

use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};

/// Signals derived from a single fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub is_html5: bool,
    /// `None` when the markup has no `<body>`, i.e. the resource is not a page worth counting.
    pub lines_count: Option<u32>,
    pub images_count: u32,
}

impl PageMetadata {
    pub fn from_markup(markup: &str) -> Self {
        Self::from_document(markup, &Html::parse_document(markup))
    }

    /// `document` must be the parse of `markup`.
    pub fn from_document(markup: &str, document: &Html) -> Self {
        Self {
            title: title(document),
            description: description(document),
            is_html5: is_html5(document),
            lines_count: line_count(markup, document),
            images_count: image_count(document),
        }
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    Some(element.value().attr("content").unwrap_or_default().trim().to_string())
}

/// `og:title`, then `<title>`, then empty.
pub fn title(document: &Html) -> String {
    if let Some(content) = meta_content(document, r#"meta[property="og:title"]"#) {
        return content;
    }

    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// `og:description`, then `<meta name="description">`, then empty.
pub fn description(document: &Html) -> String {
    meta_content(document, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(document, r#"meta[name="description"]"#))
        .unwrap_or_default()
}

/// True for `<!DOCTYPE html>` in any casing, or the `about:legacy-compat` form.
/// HTML 4 and XHTML doctypes carry a public identifier and are rejected.
pub fn is_html5(document: &Html) -> bool {
    document.tree.root().children().any(|node| match node.value() {
        Node::Doctype(doctype) => {
            doctype.name().eq_ignore_ascii_case("html")
                && doctype.public_id().is_empty()
                && (doctype.system_id().is_empty()
                    || doctype.system_id().eq_ignore_ascii_case("about:legacy-compat"))
        }
        _ => false,
    })
}

/// Number of visible text lines longer than one character once `<script>` and `<style>`
/// content is dropped.
///
/// The parser always synthesises a `<body>`, so whether the resource had one is read off
/// the raw markup.
pub fn line_count(markup: &str, document: &Html) -> Option<u32> {
    if !markup.to_ascii_lowercase().contains("<body") {
        return None;
    }

    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| matches!(element.name(), "script" | "style"))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }

    let lines = text
        .lines()
        .filter(|line| line.trim().chars().count() > 1)
        .count();
    Some(lines as u32)
}

pub fn image_count(document: &Html) -> u32 {
    let Ok(selector) = Selector::parse("img") else {
        return 0;
    };
    document.select(&selector).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_title_wins_over_title_tag() {
        let metadata = PageMetadata::from_markup(
            r#"<html><head>
                <meta property="og:title" content="Open Graph Title">
                <title>Plain Title</title>
            </head><body></body></html>"#,
        );
        assert_eq!(metadata.title, "Open Graph Title");
    }

    #[test]
    fn test_title_tag_fallback() {
        let metadata =
            PageMetadata::from_markup("<html><head><title> Plain Title </title></head></html>");
        assert_eq!(metadata.title, "Plain Title");
    }

    #[test]
    fn test_missing_title_defaults_to_empty() {
        let metadata = PageMetadata::from_markup("<html><head></head><body>hi</body></html>");
        assert_eq!(metadata.title, "");
    }

    #[test]
    fn test_og_title_without_content_defaults_to_empty() {
        let metadata = PageMetadata::from_markup(
            r#"<html><head><meta property="og:title"><title>T</title></head></html>"#,
        );
        assert_eq!(metadata.title, "");
    }

    #[test]
    fn test_description_sources() {
        let og = PageMetadata::from_markup(
            r#"<head>
                <meta name="description" content="named">
                <meta property="og:description" content="graph">
            </head>"#,
        );
        assert_eq!(og.description, "graph");

        let named = PageMetadata::from_markup(r#"<head><meta name="description" content="named"></head>"#);
        assert_eq!(named.description, "named");

        let none = PageMetadata::from_markup("<head><title>x</title></head>");
        assert_eq!(none.description, "");
    }

    #[test]
    fn test_html5_doctype_detection() {
        assert!(PageMetadata::from_markup("<!DOCTYPE html><html></html>").is_html5);
        assert!(PageMetadata::from_markup("<!doctype HTML><html></html>").is_html5);
        assert!(!PageMetadata::from_markup("<html><body></body></html>").is_html5);
        assert!(
            !PageMetadata::from_markup(
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><html></html>"#
            )
            .is_html5
        );
    }

    #[test]
    fn test_line_count_skips_scripts_styles_and_short_lines() {
        let markup = "<html><head><title>T</title><style>\nbody {}\np {}\n</style></head><body>\n\
            <p>first line</p>\n\
            <p>second line</p>\n\
            <p>x</p>\n\
            <script>\nvar a = 1;\nvar b = 2;\n</script>\n\
            </body></html>";
        let metadata = PageMetadata::from_markup(markup);
        // "first line" and "second line"; the title "T" and "x" are one character.
        assert_eq!(metadata.lines_count, Some(2));
    }

    #[test]
    fn test_line_count_without_body_is_none() {
        let metadata = PageMetadata::from_markup("just some plain text\nover two lines");
        assert_eq!(metadata.lines_count, None);
    }

    #[test]
    fn test_image_count() {
        let metadata = PageMetadata::from_markup(
            r#"<body><img src="a.png"><div><img src="b.png"></div><img></body>"#,
        );
        assert_eq!(metadata.images_count, 3);
    }

    #[test]
    fn test_malformed_markup_degrades_to_defaults() {
        let metadata = PageMetadata::from_markup("<<<>>><meta <title");
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.images_count, 0);
        assert!(!metadata.is_html5);
    }
}
