// ⚠️ Scrape errors
//
// Soft-skips (empty dates, "Defeated" rows, dates outside every known term)
// never reach this type. Everything here aborts the current person.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selector: {0}")]
    Selector(String),

    /// The result vocabulary is closed ("Elected" / "Defeated").
    #[error("Unknown result: {result}")]
    UnknownResult { result: String },

    #[error("malformed membership period: {0:?}")]
    MalformedPeriod(String),

    #[error("malformed date: {0:?}")]
    MalformedDate(String),

    #[error("invalid URL: {0}")]
    Url(String),
}

impl ScrapeError {
    /// True for errors caused by the page content rather than the transport.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::UnknownResult { .. }
                | ScrapeError::MalformedPeriod(_)
                | ScrapeError::MalformedDate(_)
        )
    }
}
