use crate::traits::{ContentRepository, ImageProbe};
use crate::types::{meta, ContentItem, Thumbnail};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether a destination needs the MIME type of its thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailMode {
    Skip,
    UrlOnly,
    WithMime,
}

/// Picks the item's representative image: the `_images` override when one is
/// stored, otherwise the repository's featured image.
pub struct ThumbnailResolver {
    repository: Arc<dyn ContentRepository>,
    probe: Arc<dyn ImageProbe>,
    timeout: Duration,
}

impl ThumbnailResolver {
    pub fn new(repository: Arc<dyn ContentRepository>, probe: Arc<dyn ImageProbe>, timeout: Duration) -> Self {
        Self {
            repository,
            probe,
            timeout,
        }
    }

    pub async fn resolve(&self, item: &ContentItem, mode: ThumbnailMode) -> Option<Thumbnail> {
        if mode == ThumbnailMode::Skip {
            return None;
        }

        match override_entry(item) {
            Some(entry) => match entry_url(entry) {
                Some(url) => self.from_override(item, url, entry_title(entry), mode).await,
                None => {
                    debug!("Item {} has an image override without a usable URL", item.id);
                    None
                }
            },
            None => self.from_featured(item).await,
        }
    }

    async fn from_override(
        &self,
        item: &ContentItem,
        url: &str,
        title: Option<String>,
        mode: ThumbnailMode,
    ) -> Option<Thumbnail> {
        if mode == ThumbnailMode::UrlOnly {
            return Some(Thumbnail {
                url: url.to_string(),
                mime_type: None,
                title,
            });
        }

        match tokio::time::timeout(self.timeout, self.probe.sniff_mime(url)).await {
            Ok(Ok(Some(mime_type))) => Some(Thumbnail {
                url: url.to_string(),
                mime_type: Some(mime_type),
                title,
            }),
            Ok(Ok(None)) => {
                debug!("Could not determine image type of {} for item {}", url, item.id);
                None
            }
            Ok(Err(e)) => {
                warn!("Thumbnail probe failed for item {}: {}", item.id, e);
                None
            }
            Err(_) => {
                warn!("Thumbnail probe timed out for item {} after {:?}", item.id, self.timeout);
                None
            }
        }
    }

    async fn from_featured(&self, item: &ContentItem) -> Option<Thumbnail> {
        match self.repository.featured_image(item).await {
            Ok(Some(image)) => Some(Thumbnail {
                url: image.url,
                mime_type: Some(image.mime_type).filter(|m| !m.is_empty()),
                title: Some(image.title).filter(|t| !t.is_empty()),
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Featured image lookup failed for item {}: {}", item.id, e);
                None
            }
        }
    }
}

/// The first stored image entry, if the override holds any.
fn override_entry(item: &ContentItem) -> Option<&Value> {
    let images = item.meta(meta::IMAGES)?;
    match images {
        Value::Array(entries) => entries.first(),
        Value::Object(map) if map.contains_key("url") || map.contains_key("file") => Some(images),
        Value::Object(map) => map.values().next(),
        _ => None,
    }
}

/// The entry's `url`, else its `file`.
fn entry_url(entry: &Value) -> Option<&str> {
    ["url", "file"]
        .iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

fn entry_title(entry: &Value) -> Option<String> {
    entry
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}
