// Tests for report generation

use sitescore_core::data::{Database, Website};
use sitescore_core::report::{
    ReportFormat, gather_site_report, generate_json_report, generate_text_report,
    generate_website_list,
};
use sitescore_scanner::{CrawledPage, PageMetadata};

fn seeded_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.insert_website(&Website {
        id: 1,
        url: "http://example.com/".to_string(),
        title: "Example".to_string(),
        domain: "example.com".to_string(),
        pages_count: 2,
        is_html5: true,
        crawled_at: 1_700_000_000,
    })
    .unwrap();

    let low = db
        .insert_page(
            1,
            &CrawledPage::new("http://example.com/low".to_string(), PageMetadata::default()),
        )
        .unwrap();
    let high = db
        .insert_page(
            1,
            &CrawledPage::new(
                "http://example.com/high".to_string(),
                PageMetadata {
                    title: "High".to_string(),
                    lines_count: Some(12),
                    ..Default::default()
                },
            ),
        )
        .unwrap();
    db.update_page_score(low, 10).unwrap();
    db.update_page_score(high, 30).unwrap();
    db
}

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("xml"), None);
}

#[test]
fn test_gather_orders_pages_by_score() {
    let db = seeded_db();

    let report = gather_site_report(&db, "example.com").unwrap().unwrap();
    assert_eq!(report.pages[0].url, "http://example.com/high");
    assert_eq!(report.pages[1].url, "http://example.com/low");
    assert_eq!(report.average_score(), 20.0);
}

#[test]
fn test_gather_unknown_domain() {
    let db = seeded_db();
    assert!(gather_site_report(&db, "unknown.com").unwrap().is_none());
}

#[test]
fn test_text_report() {
    let db = seeded_db();
    let report = gather_site_report(&db, "example.com").unwrap().unwrap();

    let text = generate_text_report(&report);
    assert!(text.contains("SITESCORE SITE REPORT"));
    assert!(text.contains("Domain:       example.com"));
    assert!(text.contains("HTML5:        yes"));
    assert!(text.contains("Avg. score:   20.0"));
    assert!(text.contains("2023-11-14 22:13:20 UTC"));
    assert!(text.find("/high").unwrap() < text.find("/low").unwrap());
    assert!(text.contains("title: (none)"));
}

#[test]
fn test_json_report() {
    let db = seeded_db();
    let report = gather_site_report(&db, "example.com").unwrap().unwrap();

    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "Sitescore");
    assert_eq!(value["report"]["website"]["domain"], "example.com");
    assert_eq!(value["report"]["summary"]["pages_count"], 2);
    assert_eq!(value["report"]["pages"][0]["score"], 30);
    assert_eq!(value["report"]["pages"][1]["lines_count"], serde_json::Value::Null);
}

#[test]
fn test_website_list() {
    let db = seeded_db();
    let list = generate_website_list(&db.list_websites().unwrap());

    assert_eq!(list.lines().count(), 1);
    assert!(list.contains("example.com"));
    assert!(list.contains("2 pages"));
}
