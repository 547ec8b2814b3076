use crate::criteria::{CriteriaBuilder, SelectionCriteria};
use crate::traits::ContentRepository;
use crate::types::{AggregatedFeed, ContentItem, FeedDescriptor, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What to do when the same item comes back from more than one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence in merged order.
    #[default]
    DedupeById,
    /// Emit every occurrence.
    KeepAll,
}

/// Runs a destination's primary and supplementary queries and merges them
/// into one newest-first page.
pub struct SourceAggregator {
    repository: Arc<dyn ContentRepository>,
    criteria_builder: Arc<CriteriaBuilder>,
    duplicates: DuplicatePolicy,
}

impl SourceAggregator {
    pub fn new(repository: Arc<dyn ContentRepository>, criteria_builder: Arc<CriteriaBuilder>) -> Self {
        Self {
            repository,
            criteria_builder,
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn criteria_builder(&self) -> &CriteriaBuilder {
        &self.criteria_builder
    }

    /// Queries run sequentially: primary first, then one per secondary
    /// content type in the given order. Any repository failure aborts the
    /// whole aggregation.
    pub async fn aggregate(
        &self,
        descriptor: &FeedDescriptor,
        criteria: &SelectionCriteria,
        secondary_content_types: &[String],
    ) -> Result<AggregatedFeed> {
        let repository_name = self.repository.repository_name();
        let mut sources = Vec::with_capacity(1 + secondary_content_types.len());

        let primary = self.run_query(criteria, &repository_name).await?;
        debug!("Primary query for {} returned {} items", criteria.destination_id, primary.len());
        sources.push(primary);

        for content_type in secondary_content_types {
            let secondary_criteria =
                self.criteria_builder
                    .build_secondary(descriptor, &criteria.destination_id, content_type);
            let items = self.run_query(&secondary_criteria, &repository_name).await?;
            debug!(
                "Secondary query ({}) for {} returned {} items",
                content_type,
                criteria.destination_id,
                items.len()
            );
            sources.push(items);
        }

        let total: usize = sources.iter().map(Vec::len).sum();
        let items = merge_sources(sources, descriptor.page_size, self.duplicates);

        info!(
            "Aggregated {} of {} candidate items for {} from {}",
            items.len(),
            total,
            criteria.destination_id,
            repository_name
        );

        Ok(AggregatedFeed {
            destination_id: criteria.destination_id.clone(),
            items,
        })
    }

    async fn run_query(&self, criteria: &SelectionCriteria, repository_name: &str) -> Result<Vec<ContentItem>> {
        self.repository.query(criteria).await.map_err(|e| {
            error!("Query against {} failed for {}: {}", repository_name, criteria.destination_id, e);
            e
        })
    }
}

/// Concatenates sources in order, stable-sorts by publish date descending
/// (undated items last), applies the duplicate policy and truncates.
pub fn merge_sources(
    sources: Vec<Vec<ContentItem>>,
    page_size: usize,
    duplicates: DuplicatePolicy,
) -> Vec<ContentItem> {
    let mut merged: Vec<ContentItem> = sources.into_iter().flatten().collect();

    // `None < Some(_)`, so comparing b to a puts undated items at the end
    merged.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

    if duplicates == DuplicatePolicy::DedupeById {
        let mut seen = HashSet::new();
        merged.retain(|item| seen.insert(item.id));
    }

    merged.truncate(page_size);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostStatus;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn item(id: u64, hour: Option<u32>) -> ContentItem {
        ContentItem {
            id,
            content_type: "news".to_string(),
            status: PostStatus::Published,
            publish_date: hour.map(|h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()),
            modified_date: None,
            title: format!("item {}", id),
            body_html: String::new(),
            excerpt: String::new(),
            author: String::new(),
            tags: Vec::new(),
            categories: Vec::new(),
            terms: BTreeMap::new(),
            permalink: format!("https://example.com/{}", id),
            guid: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    fn ids(items: &[ContentItem]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn merges_newest_first_across_sources() {
        let merged = merge_sources(
            vec![vec![item(1, Some(3)), item(2, Some(1))], vec![item(3, Some(2))]],
            10,
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(ids(&merged), vec![1, 3, 2]);
    }

    #[test]
    fn equal_dates_keep_concatenation_order() {
        let merged = merge_sources(
            vec![vec![item(5, Some(4)), item(6, Some(4))], vec![item(7, Some(4))]],
            10,
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(ids(&merged), vec![5, 6, 7]);
    }

    #[test]
    fn undated_items_sort_last() {
        let merged = merge_sources(
            vec![vec![item(1, None), item(2, Some(1))], vec![item(3, None), item(4, Some(9))]],
            10,
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(ids(&merged), vec![4, 2, 1, 3]);
    }

    #[test]
    fn truncates_to_page_size() {
        let source: Vec<_> = (0..30).map(|i| item(i, Some((i % 24) as u32))).collect();
        let merged = merge_sources(vec![source], 20, DuplicatePolicy::KeepAll);
        assert_eq!(merged.len(), 20);
        assert!(merged
            .windows(2)
            .all(|pair| pair[0].publish_date >= pair[1].publish_date));
    }

    #[test]
    fn duplicate_policy_controls_repeated_ids() {
        let sources = || vec![vec![item(1, Some(5)), item(2, Some(3))], vec![item(1, Some(5))]];

        let deduped = merge_sources(sources(), 10, DuplicatePolicy::DedupeById);
        assert_eq!(ids(&deduped), vec![1, 2]);

        let kept = merge_sources(sources(), 10, DuplicatePolicy::KeepAll);
        assert_eq!(ids(&kept), vec![1, 1, 2]);
    }

    #[test]
    fn dedupe_happens_before_truncation() {
        let merged = merge_sources(
            vec![vec![item(1, Some(9)), item(2, Some(8))], vec![item(1, Some(9)), item(3, Some(7))]],
            3,
            DuplicatePolicy::DedupeById,
        );
        assert_eq!(ids(&merged), vec![1, 2, 3]);
    }
}
