use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{BodyTransform, FieldPlan, StatusMapper, ThumbnailMode};
use crate::types::{FeedDescriptor, PostStatus, RenderedItem, Result};
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "goo";

const ALLOWED_TAGS: &[&str] = &["h2", "p", "br", "img"];
const FALLBACK_CATEGORY: &str = "region";

pub fn strategy() -> DestinationStrategy {
    DestinationStrategy {
        descriptor: FeedDescriptor::new(ID, "Goo", &["post"]).disabled(),
        policy: SelectionPolicy::eligibility_only(),
        fields: FieldPlan {
            status: StatusMapper::new("0", "1"),
            related: None,
            thumbnail: ThumbnailMode::WithMime,
            body: BodyTransform::StripTags(ALLOWED_TAGS.iter().map(|t| t.to_string()).collect()),
        },
        renderer: Arc::new(GooRenderer),
    }
}

pub struct GooRenderer;

impl FeedRenderer for GooRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::OA, ns::CONTENT, ns::DC, ns::GOONEWS, ns::SMP]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        ctx.write_site_basics(sink)?;
        sink.text("language", "ja")?;
        sink.text("pubDate", &ctx.last_build_date())
    }

    fn write_item(&self, ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        // date-prefixed id, stable across edits
        let published = item.item.publish_date.unwrap_or(ctx.request.now);
        let guid = format!("{}-{}", ctx.formatter.format(&published, "%Y%m%d"), item.item.id);

        sink.text_with("guid", &[("isPermaLink", "false")], &guid)?;
        if item.item.status == PostStatus::Trashed {
            sink.text("goonews:delete", &item.status_label)?;
        }
        sink.text("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.modified_date.is_empty() {
            sink.text("goonews:modified", &item.modified_date)?;
        }
        if !item.item.author.is_empty() {
            sink.text("dc:creator", &item.item.author)?;
        }
        sink.cdata("description", &item.body)?;
        if let Some(thumbnail) = &item.thumbnail {
            if let Some(mime_type) = &thumbnail.mime_type {
                sink.empty("enclosure", &[("url", thumbnail.url.as_str()), ("length", "0"), ("type", mime_type.as_str())])?;
            }
        }
        let category = item
            .item
            .categories
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY);
        sink.text("category", category)
    }
}
