use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known metadata keys persisted per content item.
pub mod meta {
    pub const DELIVERY_SERVICES: &str = "_delivery_services";
    pub const IS_FREE: &str = "_is_free";
    pub const IMAGES: &str = "_images";
    pub const RELATED_LINKS: &str = "_related_links";
    pub const RELATED_RSS_LINKS: &str = "_related_rss_links";
    pub const BASE_URL: &str = "_base_url";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    #[serde(rename = "publish", alias = "published")]
    Published,
    #[serde(rename = "trash", alias = "trashed")]
    Trashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub url: String,
    pub mime_type: String,
    /// The attachment's own title.
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub content_type: String,
    pub status: PostStatus,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub modified_date: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Taxonomy name to term slugs.
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
    pub permalink: String,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ContentItem {
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// String metadata value, ignoring empty strings.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn terms_of(&self, taxonomy: &str) -> &[String] {
        self.terms.get(taxonomy).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The guid, falling back to the permalink when none was stored.
    pub fn guid_or_permalink(&self) -> &str {
        if self.guid.is_empty() {
            &self.permalink
        } else {
            &self.guid
        }
    }
}

// Stored dates arrive either as RFC 3339 or as the repository's
// `YYYY-MM-DD HH:MM:SS` GMT form. Anything else becomes `None` so a single
// malformed row never fails the whole query.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_stored_datetime))
}

pub fn parse_stored_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            tracing::warn!("Unparseable stored date: {}", raw);
            None
        }
    }
}
