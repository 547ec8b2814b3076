use crate::types::{meta, ContentItem, RelatedLink};
use serde_json::Value;
use tracing::debug;

/// Extracts `{url, title}` pairs from item metadata, capped per destination.
#[derive(Debug, Clone)]
pub struct RelatedLinkResolver {
    cap: usize,
}

impl RelatedLinkResolver {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Items of the external content type keep their links under a
    /// separate key.
    pub fn field_for(item: &ContentItem, external_content_type: &str) -> &'static str {
        if item.content_type == external_content_type {
            meta::RELATED_RSS_LINKS
        } else {
            meta::RELATED_LINKS
        }
    }

    pub fn resolve(&self, item: &ContentItem, external_content_type: &str) -> Vec<RelatedLink> {
        let field = Self::field_for(item, external_content_type);
        let Some(Value::Array(entries)) = item.meta(field) else {
            return Vec::new();
        };

        let links: Vec<RelatedLink> = entries
            .iter()
            .filter_map(|entry| {
                let url = entry.get("url").and_then(Value::as_str).filter(|u| !u.is_empty());
                let title = entry.get("title").and_then(Value::as_str).filter(|t| !t.is_empty());
                match (url, title) {
                    (Some(url), Some(title)) => Some(RelatedLink {
                        url: url.to_string(),
                        title: title.to_string(),
                    }),
                    _ => {
                        debug!("Skipping incomplete related link on item {}", item.id);
                        None
                    }
                }
            })
            .take(self.cap)
            .collect();

        links
    }
}
