use crate::config::TaxonomyExclusion;
use crate::traits::EligibilityService;
use crate::types::{meta, ContentItem, FeedDescriptor, PostStatus};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Membership test against an item's eligibility metadata.
#[derive(Clone)]
pub struct EligibilityFilter {
    pub destination_id: String,
    service: Arc<dyn EligibilityService>,
}

impl EligibilityFilter {
    pub fn new(destination_id: &str, service: Arc<dyn EligibilityService>) -> Self {
        Self {
            destination_id: destination_id.to_string(),
            service,
        }
    }

    /// Items of `content_type` the destination may carry.
    pub fn eligible_items<'a>(&self, items: &'a [ContentItem], content_type: &str) -> Vec<&'a ContentItem> {
        self.service.eligible_items(items, &self.destination_id, content_type)
    }
}

impl fmt::Debug for EligibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityFilter")
            .field("destination_id", &self.destination_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionFilter {
    /// Drops items whose free/paid flag is absent or the literal `null`.
    FreeOnly,
    /// Drops items tagged with `term` in `taxonomy`.
    Taxonomy { taxonomy: String, term: String },
}

impl ExclusionFilter {
    pub fn excludes(&self, item: &ContentItem) -> bool {
        match self {
            Self::FreeOnly => match item.meta(meta::IS_FREE) {
                None | Some(Value::Null) => true,
                Some(Value::String(flag)) => flag == "null",
                Some(_) => false,
            },
            Self::Taxonomy { taxonomy, term } => item.terms_of(taxonomy).iter().any(|t| t == term),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    #[default]
    PublishDateDesc,
}

/// Everything the content repository needs to select a destination's items.
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub destination_id: String,
    pub content_types: Vec<String>,
    pub statuses: Vec<PostStatus>,
    pub eligibility: EligibilityFilter,
    pub exclusions: Vec<ExclusionFilter>,
    pub ordering: Ordering,
    pub limit: usize,
}

impl SelectionCriteria {
    /// Picks the matching items out of a candidate set. Eligibility is looked
    /// up per content type, so results come grouped in `content_types` order.
    pub fn select<'a>(&self, items: &'a [ContentItem]) -> Vec<&'a ContentItem> {
        self.content_types
            .iter()
            .flat_map(|content_type| self.eligibility.eligible_items(items, content_type))
            .filter(|item| self.statuses.contains(&item.status))
            .filter(|item| !self.exclusions.iter().any(|filter| filter.excludes(item)))
            .collect()
    }
}

/// Per-destination knobs that shape the criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub statuses: Vec<PostStatus>,
    pub exclude_free_only: bool,
    pub exclude_reserved_category: bool,
    /// Content types fetched by additional queries and folded into the feed.
    pub secondary_content_types: Vec<String>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            // trashed items are still rendered so partners can propagate deletions
            statuses: vec![PostStatus::Published, PostStatus::Trashed],
            exclude_free_only: true,
            exclude_reserved_category: true,
            secondary_content_types: Vec::new(),
        }
    }
}

impl SelectionPolicy {
    /// Eligibility only: no free-flag or taxonomy exclusions.
    pub fn eligibility_only() -> Self {
        Self {
            exclude_free_only: false,
            exclude_reserved_category: false,
            ..Self::default()
        }
    }

    pub fn published_only(mut self) -> Self {
        self.statuses = vec![PostStatus::Published];
        self
    }

    pub fn with_secondary(mut self, content_types: &[&str]) -> Self {
        self.secondary_content_types = content_types.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Turns static destination configuration into repository criteria.
pub struct CriteriaBuilder {
    eligibility: Arc<dyn EligibilityService>,
    reserved_category: TaxonomyExclusion,
}

impl CriteriaBuilder {
    pub fn new(eligibility: Arc<dyn EligibilityService>, reserved_category: TaxonomyExclusion) -> Self {
        Self {
            eligibility,
            reserved_category,
        }
    }

    /// Primary criteria with the default policy.
    pub fn build(&self, descriptor: &FeedDescriptor, destination_id: &str) -> SelectionCriteria {
        self.build_with_policy(descriptor, destination_id, &SelectionPolicy::default())
    }

    pub fn build_with_policy(
        &self,
        descriptor: &FeedDescriptor,
        destination_id: &str,
        policy: &SelectionPolicy,
    ) -> SelectionCriteria {
        let mut exclusions = Vec::new();
        if policy.exclude_free_only {
            exclusions.push(ExclusionFilter::FreeOnly);
        }
        if policy.exclude_reserved_category {
            exclusions.push(ExclusionFilter::Taxonomy {
                taxonomy: self.reserved_category.taxonomy.clone(),
                term: self.reserved_category.term.clone(),
            });
        }

        let mut content_types: Vec<String> = Vec::with_capacity(descriptor.target_content_types.len());
        for content_type in &descriptor.target_content_types {
            if !content_types.contains(content_type) {
                content_types.push(content_type.clone());
            }
        }

        debug!(
            "Built criteria for {}: types={:?} statuses={:?} exclusions={}",
            destination_id,
            content_types,
            policy.statuses,
            exclusions.len()
        );

        SelectionCriteria {
            destination_id: destination_id.to_string(),
            content_types,
            statuses: policy.statuses.clone(),
            eligibility: EligibilityFilter::new(destination_id, self.eligibility.clone()),
            exclusions,
            ordering: Ordering::PublishDateDesc,
            limit: descriptor.page_size,
        }
    }

    /// Criteria for one supplementary content type: same eligibility test,
    /// both statuses, no exclusions.
    pub fn build_secondary(
        &self,
        descriptor: &FeedDescriptor,
        destination_id: &str,
        content_type: &str,
    ) -> SelectionCriteria {
        SelectionCriteria {
            destination_id: destination_id.to_string(),
            content_types: vec![content_type.to_string()],
            statuses: vec![PostStatus::Published, PostStatus::Trashed],
            eligibility: EligibilityFilter::new(destination_id, self.eligibility.clone()),
            exclusions: Vec::new(),
            ordering: Ordering::PublishDateDesc,
            limit: descriptor.page_size,
        }
    }
}
