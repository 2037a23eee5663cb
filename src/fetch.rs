// 🌐 Fetcher - HTTP GET with an on-disk cache
//
// The cache has no freshness policy: delete the cache directory to refetch.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ScrapeError;

/// Anything that can turn a URL into page text
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

// ============================================================================
// HTTP
// ============================================================================

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("parlinfo-members/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text()?)
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Wraps another fetcher; bodies are stored as `<cache_dir>/<sha256(url)>.html`
pub struct CachedFetcher<F: Fetcher> {
    inner: F,
    cache_dir: PathBuf,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(inner: F, cache_dir: impl Into<PathBuf>) -> Self {
        CachedFetcher {
            inner,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.html", cache_key(url)))
    }
}

impl<F: Fetcher> Fetcher for CachedFetcher<F> {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let path = self.cache_path(url);
        if path.exists() {
            debug!(url, path = %path.display(), "cache hit");
            return Ok(fs::read_to_string(&path)?);
        }

        let body = self.inner.fetch(url)?;
        fs::create_dir_all(&self.cache_dir)?;

        // Renamed into place: a half-written page must never count as a hit
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(body)
    }
}

/// Hex SHA-256 of the URL
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
