use sitescore_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
