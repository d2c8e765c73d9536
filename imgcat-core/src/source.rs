// ABOUTME: Resolves image references to URLs or paths and fetches their bytes
// ABOUTME: HTTP downloads stream with a size limit; local files are read asynchronously

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

use crate::error::ImageError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Where an image reference points to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Url(String),
    Path(PathBuf),
}

impl ImageSource {
    /// A reference is a URL if and only if it starts with `http`
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http") {
            ImageSource::Url(reference.to_string())
        } else {
            ImageSource::Path(PathBuf::from(reference))
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ImageSource::Url(_))
    }

    /// The reference exactly as the user supplied it
    pub fn reference(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Url(url) => f.write_str(url),
            ImageSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches the raw bytes behind an [`ImageSource`]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_size_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            user_agent: concat!("imgcat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches URLs over HTTP(S) and paths from the local filesystem
pub struct SourceFetcher {
    client: Client,
    config: FetchConfig,
}

impl SourceFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| {
                ImageError::source_unavailable("http client", format!("failed to build: {}", e))
            })?;

        Ok(Self { client, config })
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        log::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::from_http(url, e))?;

        if !response.status().is_success() {
            return Err(ImageError::source_unavailable(
                url,
                format!("HTTP request failed with status {}", response.status()),
            ));
        }

        let limit = self.config.max_size_bytes;
        if let Some(content_length) = response.content_length() {
            if content_length > limit {
                return Err(ImageError::TooLarge {
                    reference: url.to_string(),
                    size: content_length,
                    limit,
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                ImageError::source_unavailable(url, format!("failed to read response body: {}", e))
            })?;
            bytes.extend_from_slice(&chunk);

            // Servers may omit or lie about content-length
            if bytes.len() as u64 > limit {
                return Err(ImageError::TooLarge {
                    reference: url.to_string(),
                    size: bytes.len() as u64,
                    limit,
                });
            }
        }

        log::debug!("Fetched {} ({})", url, format_bytes(bytes.len()));
        Ok(bytes)
    }

    async fn fetch_path(&self, path: &Path) -> Result<Vec<u8>, ImageError> {
        let reference = path.display().to_string();
        log::debug!("Reading {}", reference);

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ImageError::source_unavailable(&reference, e))?;

        if metadata.is_dir() {
            return Err(ImageError::source_unavailable(&reference, "is a directory"));
        }

        let limit = self.config.max_size_bytes;
        if metadata.len() > limit {
            return Err(ImageError::TooLarge {
                reference,
                size: metadata.len(),
                limit,
            });
        }

        tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::source_unavailable(&reference, e))
    }
}

#[async_trait]
impl ImageFetcher for SourceFetcher {
    async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError> {
        match source {
            ImageSource::Url(url) => self.fetch_url(url).await,
            ImageSource::Path(path) => self.fetch_path(path).await,
        }
    }
}

/// Parse a human size such as `10MB`, `512KB` or `1048576`
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().to_uppercase();

    let (number_part, unit) = if let Some(n) = value.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = value.strip_suffix('B') {
        (n, 1)
    } else {
        (value.as_str(), 1)
    };

    number_part
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
