//! Fetching public-domain scriptures into the raw data directory

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::info;
use tracing::warn;

use super::gutenberg::clean_gutenberg_text;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::traditions;
use crate::traditions::ScriptureSource;
use crate::traditions::Tradition;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// What happened to one scripture source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written to disk, size in bytes
    Downloaded(u64),
    /// Already present and not forced
    Skipped,
    /// The catalog has no direct download for this text
    NoUrl,
}

/// Decode as UTF-8, falling back to Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

pub struct Downloader {
    client: Client,
    raw_dir: PathBuf,
    force: bool,
}

impl Downloader {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            raw_dir: raw_dir.into(),
            force: false,
        })
    }

    /// Re-download files that already exist
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn is_downloaded(&self, source: &ScriptureSource) -> bool {
        self.raw_dir.join(source.file_name).exists()
    }

    pub async fn download_source(&self, source: &ScriptureSource) -> Result<DownloadOutcome> {
        let path = self.raw_dir.join(source.file_name);
        if !self.force && tokio::fs::try_exists(&path).await? {
            info!("Already exists: {}", source.file_name);
            return Ok(DownloadOutcome::Skipped);
        }
        let Some(url) = source.url else {
            info!("Skipping {} (no direct URL)", source.file_name);
            return Ok(DownloadOutcome::NoUrl);
        };

        info!("Downloading {} from {}", source.file_name, url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(WisdomError::HttpError(format!(
                "Download of {} failed ({status})",
                source.file_name
            )));
        }

        let bytes = response.bytes().await?;
        let text = clean_gutenberg_text(&decode_text(&bytes));

        tokio::fs::create_dir_all(&self.raw_dir).await?;
        tokio::fs::write(&path, text.as_bytes()).await?;
        let size = text.len() as u64;
        info!("Downloaded {} ({:.1} KB)", source.file_name, size as f64 / 1024.0);
        Ok(DownloadOutcome::Downloaded(size))
    }

    /// Download every source of one tradition; failures are logged and skipped
    pub async fn download_tradition(
        &self,
        tradition: &Tradition,
    ) -> Vec<(&'static str, Result<DownloadOutcome>)> {
        let mut results = Vec::with_capacity(tradition.sources.len());
        for source in tradition.sources {
            let outcome = self.download_source(source).await;
            if let Err(e) = &outcome {
                warn!("Failed to download {}: {}", source.file_name, e);
            }
            results.push((source.file_name, outcome));
        }
        results
    }

    /// Look up a tradition by name and download its sources
    pub async fn download_tradition_named(
        &self,
        name: &str,
    ) -> Result<Vec<(&'static str, Result<DownloadOutcome>)>> {
        let tradition = traditions::find(name).ok_or_else(|| {
            WisdomError::InvalidInput(format!(
                "Unknown tradition: {name}. Available: {}",
                traditions::names().join(", ")
            ))
        })?;
        Ok(self.download_tradition(tradition).await)
    }

    /// Number of newly downloaded files across the catalog
    pub async fn download_all(&self) -> usize {
        let mut downloaded = 0;
        for tradition in traditions::all() {
            downloaded += self
                .download_tradition(tradition)
                .await
                .iter()
                .filter(|(_, r)| matches!(r, Ok(DownloadOutcome::Downloaded(_))))
                .count();
        }
        downloaded
    }
}
