use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use serde::{Deserialize, Serialize};
use sitescore_scanner::CrawledPage;
use std::fs;
use std::io;
use std::path::Path;

pub struct Database {
    conn: Connection,
}

/// One crawled domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub domain: String,
    pub pages_count: u32,
    pub is_html5: bool,
    /// Unix seconds
    pub crawled_at: i64,
}

/// One visited internal URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub website_id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
    pub lines_count: Option<u32>,
    pub images_count: u32,
    pub score: u32,
}

const WEBSITE_COLUMNS: &str = "id, url, title, domain, pages_count, is_html5, crawled_at";
const PAGE_COLUMNS: &str =
    "id, website_id, url, title, description, lines_count, images_count, score";

fn website_from_row(row: &Row<'_>) -> Result<Website> {
    Ok(Website {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        domain: row.get(3)?,
        pages_count: row.get(4)?,
        is_html5: row.get(5)?,
        crawled_at: row.get(6)?,
    })
}

fn page_from_row(row: &Row<'_>) -> Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        website_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        lines_count: row.get(5)?,
        images_count: row.get(6)?,
        score: row.get(7)?,
    })
}

pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Database {
    pub fn drop(path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        // Pages are written before their website row exists, so website_id carries no
        // foreign key constraint.
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS websites (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    domain TEXT NOT NULL UNIQUE,
    pages_count INTEGER NOT NULL DEFAULT 0,
    is_html5 BOOLEAN NOT NULL DEFAULT 0,
    crawled_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    website_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    lines_count INTEGER,      -- NULL when the resource had no <body>
    images_count INTEGER NOT NULL DEFAULT 0,
    score INTEGER NOT NULL DEFAULT 0 CHECK(score >= 0),
    discovered_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_website ON pages(website_id);
CREATE INDEX IF NOT EXISTS idx_pages_score ON pages(website_id, score);
            ",
        )?;
        Ok(())
    }

    // Website operations
    pub fn find_website_by_domain(&self, domain: &str) -> Result<Option<Website>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM websites WHERE domain = ?1",
            WEBSITE_COLUMNS
        ))?;

        stmt.query_row(params![domain], website_from_row).optional()
    }

    pub fn get_website(&self, id: i64) -> Result<Option<Website>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM websites WHERE id = ?1",
            WEBSITE_COLUMNS
        ))?;

        stmt.query_row(params![id], website_from_row).optional()
    }

    pub fn list_websites(&self) -> Result<Vec<Website>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM websites ORDER BY id",
            WEBSITE_COLUMNS
        ))?;

        let websites = stmt
            .query_map([], website_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(websites)
    }

    /// Used to derive the next sequential website id.
    pub fn count_websites(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM websites", [], |row| row.get(0))
    }

    pub fn insert_website(&self, website: &Website) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO websites (id, url, title, domain, pages_count, is_html5, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                website.id,
                &website.url,
                &website.title,
                &website.domain,
                website.pages_count,
                website.is_html5,
                website.crawled_at,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    // Page operations
    pub fn insert_page(&self, website_id: i64, page: &CrawledPage) -> Result<i64> {
        let metadata = &page.metadata;
        self.conn.execute(
            "INSERT INTO pages (
                website_id, url, title, description, lines_count, images_count, score, discovered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                website_id,
                &page.url,
                &metadata.title,
                &metadata.description,
                metadata.lines_count,
                metadata.images_count,
                current_timestamp(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_pages(&self, website_id: i64) -> Result<Vec<Page>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages WHERE website_id = ?1 ORDER BY id",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![website_id], page_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(pages)
    }

    pub fn count_pages(&self, website_id: i64) -> Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE website_id = ?1",
            params![website_id],
            |row| row.get(0),
        )
    }

    pub fn update_page_score(&self, page_id: i64, score: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE pages SET score = ?1 WHERE id = ?2",
            params![score, page_id],
        )?;
        Ok(())
    }

    /// Remove pages stored under `website_id`. Returns the number deleted.
    pub fn delete_pages(&self, website_id: i64) -> Result<usize> {
        self.conn.execute(
            "DELETE FROM pages WHERE website_id = ?1",
            params![website_id],
        )
    }
}
