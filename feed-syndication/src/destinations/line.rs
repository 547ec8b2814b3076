use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{BodyTransform, FieldPlan, RelatedLinkResolver, StatusMapper, ThumbnailMode};
use crate::sanitizer::{ContentSanitizer, DEFAULT_ALLOWED_TAGS};
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "line";

const RELATED_LINK_CAP: usize = 5;

pub fn strategy() -> Result<DestinationStrategy> {
    Ok(DestinationStrategy {
        descriptor: FeedDescriptor::new(ID, "Line", &["column", "news", "restaurant", "hyakusai", "kojocho"]),
        policy: SelectionPolicy::default(),
        fields: FieldPlan {
            status: StatusMapper::numeric(),
            related: Some(RelatedLinkResolver::new(RELATED_LINK_CAP)),
            thumbnail: ThumbnailMode::WithMime,
            body: BodyTransform::Sanitized(ContentSanitizer::new(DEFAULT_ALLOWED_TAGS)?),
        },
        renderer: Arc::new(LineRenderer),
    })
}

pub struct LineRenderer;

impl FeedRenderer for LineRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::OA]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        sink.cdata("title", &ctx.config.site.title)?;
        sink.text("link", &ctx.config.site.link)?;
        sink.cdata("description", &ctx.config.site.description)?;
        sink.text("lastBuildDate", &ctx.last_build_date())?;
        sink.text("language", &ctx.config.site.language)
    }

    fn write_item(&self, _ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        // LINE identifies items by their public URL
        sink.text("guid", &item.link)?;
        sink.cdata("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        sink.cdata("description", &item.body)?;
        if let Some(thumbnail) = &item.thumbnail {
            if let Some(mime_type) = &thumbnail.mime_type {
                sink.empty("enclosure", &[("url", thumbnail.url.as_str()), ("type", mime_type.as_str())])?;
            }
        }
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.modified_date.is_empty() {
            sink.text("oa:lastPubDate", &item.modified_date)?;
        }
        sink.text("oa:pubStatus", &item.status_label)?;
        for link in &item.related_links {
            sink.start("oa:reflink", &[])?;
            sink.text("oa:refTitle", &link.title)?;
            sink.text("oa:refUrl", &link.url)?;
            sink.end("oa:reflink")?;
        }
        Ok(())
    }
}
