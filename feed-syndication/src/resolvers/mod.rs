//! Per-item derived fields: thumbnail, related links, permalink, status
//! label, and localized dates.

pub mod permalink;
pub mod related;
pub mod status;
pub mod thumbnail;
pub mod time;

pub use permalink::PermalinkOverrideResolver;
pub use related::RelatedLinkResolver;
pub use status::StatusMapper;
pub use thumbnail::{ThumbnailMode, ThumbnailResolver};
pub use time::{TimeFormatter, RFC2822};

use crate::sanitizer::{strip_tags_except, ContentSanitizer};
use crate::types::{ContentItem, RenderedItem};

/// How a destination wants the item body delivered.
#[derive(Debug, Clone)]
pub enum BodyTransform {
    Raw,
    Sanitized(ContentSanitizer),
    /// Strip every tag except the listed ones.
    StripTags(Vec<String>),
}

impl BodyTransform {
    pub fn apply(&self, item: &ContentItem) -> String {
        match self {
            Self::Raw => item.body_html.clone(),
            Self::Sanitized(sanitizer) => sanitizer.sanitize(&item.body_html),
            Self::StripTags(allowed) => {
                let allowed: Vec<&str> = allowed.iter().map(String::as_str).collect();
                strip_tags_except(&item.body_html, &allowed)
            }
        }
    }
}

/// Which resolvers a destination runs and with what settings.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub status: StatusMapper,
    pub related: Option<RelatedLinkResolver>,
    pub thumbnail: ThumbnailMode,
    pub body: BodyTransform,
}

impl Default for FieldPlan {
    fn default() -> Self {
        Self {
            status: StatusMapper::words(),
            related: None,
            thumbnail: ThumbnailMode::UrlOnly,
            body: BodyTransform::Raw,
        }
    }
}

/// Shared resolver services, combined per destination through a [`FieldPlan`].
pub struct FieldResolvers {
    thumbnails: ThumbnailResolver,
    permalinks: PermalinkOverrideResolver,
    time: TimeFormatter,
}

impl FieldResolvers {
    pub fn new(thumbnails: ThumbnailResolver, permalinks: PermalinkOverrideResolver, time: TimeFormatter) -> Self {
        Self {
            thumbnails,
            permalinks,
            time,
        }
    }

    pub fn time(&self) -> &TimeFormatter {
        &self.time
    }

    pub async fn resolve<'a>(&self, item: &'a ContentItem, plan: &FieldPlan) -> RenderedItem<'a> {
        let (link, guid) = self.permalinks.resolve(item);
        let thumbnail = self.thumbnails.resolve(item, plan.thumbnail).await;
        let related_links = plan
            .related
            .as_ref()
            .map(|resolver| resolver.resolve(item, self.permalinks.external_content_type()))
            .unwrap_or_default();

        let pub_date = item
            .publish_date
            .map(|ts| self.time.rfc2822(&ts))
            .unwrap_or_default();
        let modified_date = item
            .modified_date
            .or(item.publish_date)
            .map(|ts| self.time.rfc2822(&ts))
            .unwrap_or_default();

        RenderedItem {
            item,
            link,
            guid,
            body: plan.body.apply(item),
            thumbnail,
            related_links,
            status_label: plan.status.map(item.status).to_string(),
            pub_date,
            modified_date,
        }
    }
}
