use crate::config::ThumbnailConfig;
use crate::traits::ImageProbe;
use crate::types::{Result, SyndicationError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches remote images and identifies them from their leading bytes.
pub struct HttpImageProbe {
    client: Client,
    config: ThumbnailConfig,
}

impl HttpImageProbe {
    pub fn new(config: ThumbnailConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.timeout_ms))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(
                "HTTP {} fetching image {}: {}",
                status.as_u16(),
                url,
                status.canonical_reason().unwrap_or("Unknown")
            );
            return Ok(None);
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.config.max_bytes {
                warn!("Image too large: {} ({} bytes)", url, length);
                return Ok(None);
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.config.max_bytes {
            warn!("Image too large: {} ({} bytes)", url, bytes.len());
            return Ok(None);
        }
        Ok(Some(bytes.to_vec()))
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn sniff_mime(&self, url: &str) -> Result<Option<String>> {
        url::Url::parse(url).map_err(|e| SyndicationError::Config(format!("invalid image url {}: {}", url, e)))?;

        let Some(bytes) = self.fetch_bytes(url).await? else {
            return Ok(None);
        };

        let mime = sniff_bytes(&bytes);
        debug!("Sniffed {} as {:?} ({} bytes)", url, mime, bytes.len());
        Ok(mime)
    }
}

/// MIME type from magic bytes, when the format is recognised.
pub fn sniff_bytes(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
