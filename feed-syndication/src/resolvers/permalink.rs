use crate::types::{meta, ContentItem};

/// Swaps in the stored base URL for items imported from an external source.
#[derive(Debug, Clone)]
pub struct PermalinkOverrideResolver {
    external_content_type: String,
}

impl PermalinkOverrideResolver {
    pub fn new(external_content_type: &str) -> Self {
        Self {
            external_content_type: external_content_type.to_string(),
        }
    }

    pub fn external_content_type(&self) -> &str {
        &self.external_content_type
    }

    /// Returns `(link, guid)`.
    pub fn resolve(&self, item: &ContentItem) -> (String, String) {
        if item.content_type == self.external_content_type {
            if let Some(base_url) = item.meta_str(meta::BASE_URL) {
                return (base_url.to_string(), base_url.to_string());
            }
        }
        (item.permalink.clone(), item.guid_or_permalink().to_string())
    }
}
