//! Remote assets: the default background image and the Unicode font
//!
//! Downloads go through [`AssetFetcher`] so that tests and offline runs can
//! substitute their own source. The blocking HTTP client runs on tokio's
//! blocking pool.

use crate::constants::MAX_ASSET_BYTES;
use crate::font::EmbeddedFont;
use crate::types::{AnswerKeyError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can fetch the bytes behind a URL
pub trait AssetFetcher: Send + Sync {
    /// Download `url`. The error is a human-readable reason.
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String>;
}

/// Blocking HTTP(S) fetcher backed by `ureq`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    max_bytes: u64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            max_bytes: MAX_ASSET_BYTES,
        }
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = ureq::get(url).call().map_err(|e| e.to_string())?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| e.to_string())?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(format!("response larger than {} bytes", self.max_bytes));
        }
        Ok(bytes)
    }
}

/// Convert a Google Drive viewer link (`.../d/<id>/...`) to its direct
/// download form. Any other URL is returned unchanged.
pub fn drive_download_url(url: &str) -> String {
    let Some((_, rest)) = url.split_once("/d/") else {
        return url.to_string();
    };
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if id.is_empty() {
        return url.to_string();
    }
    format!("https://drive.google.com/uc?export=download&id={}", id)
}

/// Download the default background image
pub async fn fetch_background(fetcher: Arc<dyn AssetFetcher>, url: &str) -> Result<Vec<u8>> {
    let direct = drive_download_url(url);
    log::info!("Downloading default background from {}", direct);

    let task_url = direct.clone();
    let result = tokio::task::spawn_blocking(move || fetcher.fetch(&task_url)).await?;
    result.map_err(|reason| {
        log::warn!("Could not load default background image: {}", reason);
        AnswerKeyError::RemoteFetch {
            url: direct,
            reason,
        }
    })
}

/// On-disk cache for the downloaded TrueType font
#[derive(Clone)]
pub struct FontCache {
    path: PathBuf,
    url: String,
    fetcher: Arc<dyn AssetFetcher>,
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("path", &self.path)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl FontCache {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            fetcher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the font file exists, downloading it if needed.
    ///
    /// Safe to call concurrently: the download goes to a temporary sibling
    /// and is only renamed into place when the target is still absent.
    pub async fn ensure_present(&self) -> Result<PathBuf> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(self.path.clone());
        }

        log::info!("Downloading font from {}", self.url);
        let fetcher = Arc::clone(&self.fetcher);
        let url = self.url.clone();
        let bytes = tokio::task::spawn_blocking(move || fetcher.fetch(&url))
            .await?
            .map_err(|reason| AnswerKeyError::FontFetch {
                url: self.url.clone(),
                reason,
            })?;

        // A broken download must not end up in the cache
        if ttf_parser::Face::parse(&bytes, 0).is_err() {
            return Err(AnswerKeyError::FontFetch {
                url: self.url.clone(),
                reason: "downloaded file is not a TrueType font".to_string(),
            });
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        if tokio::fs::try_exists(&self.path).await? {
            tokio::fs::remove_file(&temp).await?;
        } else {
            tokio::fs::rename(&temp, &self.path).await?;
            log::debug!("Cached font at {}", self.path.display());
        }

        Ok(self.path.clone())
    }

    /// Ensure the font is cached, then parse it
    pub async fn load(&self, family: &str) -> Result<EmbeddedFont> {
        let path = self.ensure_present().await?;
        load_font_file(path, family).await
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.part", std::process::id()));
        self.path.with_file_name(name)
    }
}

/// Read and parse a TrueType font file
pub async fn load_font_file(path: impl AsRef<Path>, family: &str) -> Result<EmbeddedFont> {
    let bytes = tokio::fs::read(path).await?;
    let family = family.to_string();
    tokio::task::spawn_blocking(move || EmbeddedFont::from_bytes(bytes, &family)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_url_conversion() {
        assert_eq!(
            drive_download_url(
                "https://drive.google.com/file/d/1NUwoSCN2OIWgjPQMPX1VileweKzta_HW/view?usp=sharing"
            ),
            "https://drive.google.com/uc?export=download&id=1NUwoSCN2OIWgjPQMPX1VileweKzta_HW"
        );
        assert_eq!(
            drive_download_url("https://drive.google.com/file/d/abc123"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
    }

    #[test]
    fn test_other_urls_pass_through() {
        let url = "https://example.com/background.png";
        assert_eq!(drive_download_url(url), url);
        assert_eq!(drive_download_url("https://example.com/d/"), "https://example.com/d/");
    }
}
