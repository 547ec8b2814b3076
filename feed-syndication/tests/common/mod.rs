#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use feed_syndication::criteria::SelectionCriteria;
use feed_syndication::{
    ContentItem, ContentRepository, FeaturedImage, ImageProbe, InMemoryRepository, Result, SyndicationConfig,
    SyndicationError, SyndicationPipeline,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// 2024-03-05 12:00 UTC
pub fn request_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
}

/// An item eligible for the three enabled destinations, flagged not free,
/// published `hours` hours after 2024-01-01 00:00 UTC.
pub fn item(id: u64, content_type: &str, hours: i64, extra: Value) -> ContentItem {
    let published = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(hours);
    let mut base = json!({
        "id": id,
        "content_type": content_type,
        "status": "publish",
        "publish_date": published.to_rfc3339(),
        "modified_date": published.to_rfc3339(),
        "title": format!("Story {}", id),
        "body_html": format!("<p>Body of story {}</p>", id),
        "author": "Desk",
        "permalink": format!("https://news.example.com/{}", id),
        "guid": format!("https://news.example.com/?p={}", id),
        "metadata": {
            "_delivery_services": ["smartnews", "gunosy", "line", "goo", "ballooon", "fujitv"],
            "_is_free": "1"
        }
    });
    merge(&mut base, extra);
    serde_json::from_value(base).unwrap()
}

fn merge(base: &mut Value, extra: Value) {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        for (key, value) in extra {
            match (base.get_mut(&key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                }
                (_, value) => {
                    base.insert(key, value);
                }
            }
        }
    }
}

pub struct StubProbe(pub Option<&'static str>);

#[async_trait]
impl ImageProbe for StubProbe {
    async fn sniff_mime(&self, _url: &str) -> Result<Option<String>> {
        Ok(self.0.map(str::to_string))
    }
}

pub struct FailingProbe;

#[async_trait]
impl ImageProbe for FailingProbe {
    async fn sniff_mime(&self, url: &str) -> Result<Option<String>> {
        Err(SyndicationError::Config(format!("cannot reach {}", url)))
    }
}

/// Wraps an in-memory store and counts queries.
pub struct CountingRepository {
    inner: InMemoryRepository,
    pub queries: AtomicUsize,
}

impl CountingRepository {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentRepository for CountingRepository {
    fn repository_name(&self) -> String {
        "counting".to_string()
    }

    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(criteria).await
    }

    async fn featured_image(&self, item: &ContentItem) -> Result<Option<FeaturedImage>> {
        self.inner.featured_image(item).await
    }
}

pub struct UnavailableRepository;

#[async_trait]
impl ContentRepository for UnavailableRepository {
    fn repository_name(&self) -> String {
        "unavailable".to_string()
    }

    async fn query(&self, _criteria: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        Err(SyndicationError::Repository("connection reset by peer".to_string()))
    }

    async fn featured_image(&self, _item: &ContentItem) -> Result<Option<FeaturedImage>> {
        Ok(None)
    }
}

pub fn site_config() -> SyndicationConfig {
    let mut config = SyndicationConfig::default();
    config.site.title = "Example News".to_string();
    config.site.link = "https://news.example.com".to_string();
    config.site.description = "Local news".to_string();
    config
}

pub fn pipeline(repository: Arc<dyn ContentRepository>) -> SyndicationPipeline {
    SyndicationPipeline::builder(site_config(), repository)
        .image_probe(Arc::new(StubProbe(Some("image/png"))))
        .build()
        .unwrap()
}
