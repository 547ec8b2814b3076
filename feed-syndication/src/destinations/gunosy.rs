use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{FieldPlan, RelatedLinkResolver, StatusMapper, ThumbnailMode};
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "gunosy";

const RELATED_LINK_CAP: usize = 3;

pub fn strategy() -> DestinationStrategy {
    DestinationStrategy {
        descriptor: FeedDescriptor::new(
            ID,
            "Gunosy",
            &["news", "restaurant", "hyakusai", "kojocho", "column", "yahoo"],
        ),
        policy: SelectionPolicy::default().with_secondary(&["column", "yahoo"]),
        fields: FieldPlan {
            status: StatusMapper::words(),
            related: Some(RelatedLinkResolver::new(RELATED_LINK_CAP)),
            thumbnail: ThumbnailMode::WithMime,
            ..FieldPlan::default()
        },
        renderer: Arc::new(GunosyRenderer),
    }
}

pub struct GunosyRenderer;

impl FeedRenderer for GunosyRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::GNF, ns::CONTENT, ns::DC, ns::MEDIA]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        ctx.write_site_basics(sink)?;
        if let Some(logo) = ctx.square_logo() {
            ctx.write_image_block(sink, logo)?;
        }
        if let Some(wide) = ctx.wide_logo() {
            sink.text("gnf:wide_image_link", wide)?;
        }
        sink.text("language", &ctx.config.site.language)?;
        sink.text("lastBuildDate", &ctx.last_build_date())
    }

    fn write_item(&self, _ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        sink.text("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        sink.text_with("guid", &[("isPermaLink", "false")], &item.guid)?;
        sink.text("gnf:category", "economy")?;
        if !item.item.tags.is_empty() {
            sink.text("gnf:keyword", &item.item.tags.join(","))?;
        }
        sink.cdata("description", &item.body)?;
        sink.cdata("content:encoded", &item.body)?;
        sink.empty("media:status", &[("state", item.status_label.as_str())])?;
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.modified_date.is_empty() {
            sink.text("gnf:modified", &item.modified_date)?;
        }
        if let Some(thumbnail) = &item.thumbnail {
            if let Some(mime_type) = &thumbnail.mime_type {
                sink.empty("enclosure", &[("url", thumbnail.url.as_str()), ("type", mime_type.as_str()), ("length", "0")])?;
            }
        }
        for link in &item.related_links {
            sink.empty("gnf:relatedLink", &[("link", link.url.as_str()), ("title", link.title.as_str())])?;
        }
        Ok(())
    }
}
