use crate::criteria::SelectionCriteria;
use crate::types::{ContentItem, FeaturedImage, Result};
use async_trait::async_trait;

/// Read-only access to the content store queried by criteria.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Human-readable name used in logs
    fn repository_name(&self) -> String;

    /// Every item matching the criteria. Ordering and truncation are the
    /// aggregator's job, so implementations may return matches in any order.
    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<ContentItem>>;

    /// The repository's own featured image for an item, if it has one
    async fn featured_image(&self, item: &ContentItem) -> Result<Option<FeaturedImage>>;
}

/// Answers which destinations an item may be syndicated to.
pub trait EligibilityService: Send + Sync {
    fn is_eligible(&self, item: &ContentItem, destination_id: &str) -> bool;

    /// Items of one content type eligible for a destination.
    fn eligible_items<'a>(
        &self,
        items: &'a [ContentItem],
        destination_id: &str,
        content_type: &str,
    ) -> Vec<&'a ContentItem> {
        items
            .iter()
            .filter(|item| item.content_type == content_type)
            .filter(|item| self.is_eligible(item, destination_id))
            .collect()
    }
}

/// Determines the MIME type of a remote image by looking at its bytes.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn sniff_mime(&self, url: &str) -> Result<Option<String>>;
}
