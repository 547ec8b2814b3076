//! File-backed content store used by the CLI and tests.

use crate::criteria::SelectionCriteria;
use crate::traits::ContentRepository;
use crate::types::{ContentItem, FeaturedImage, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// JSON layout: `{ "items": [...], "featured_images": { "<id>": {...} } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFixture {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub featured_images: HashMap<u64, FeaturedImage>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    items: Vec<ContentItem>,
    featured_images: HashMap<u64, FeaturedImage>,
}

impl InMemoryRepository {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            featured_images: HashMap::new(),
        }
    }

    pub fn with_featured_image(mut self, item_id: u64, image: FeaturedImage) -> Self {
        self.featured_images.insert(item_id, image);
        self
    }

    pub fn from_fixture(fixture: ContentFixture) -> Self {
        Self {
            items: fixture.items,
            featured_images: fixture.featured_images,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let fixture: ContentFixture = serde_json::from_str(raw)?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let repository = Self::from_json_str(&raw)?;
        info!("Loaded {} content items from {}", repository.items.len(), path.display());
        Ok(repository)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    fn repository_name(&self) -> String {
        "in-memory".to_string()
    }

    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        let matches: Vec<ContentItem> = criteria.select(&self.items).into_iter().cloned().collect();
        debug!("{} of {} items match criteria for {}", matches.len(), self.items.len(), criteria.destination_id);
        Ok(matches)
    }

    async fn featured_image(&self, item: &ContentItem) -> Result<Option<FeaturedImage>> {
        Ok(self.featured_images.get(&item.id).cloned())
    }
}
