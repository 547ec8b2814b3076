use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{FieldPlan, StatusMapper, ThumbnailMode};
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::utils::text;
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "fujitv";

pub fn strategy() -> DestinationStrategy {
    DestinationStrategy {
        descriptor: FeedDescriptor::new(ID, "FujiMain", &["post"]).disabled(),
        policy: SelectionPolicy::eligibility_only().published_only(),
        fields: FieldPlan {
            status: StatusMapper::words(),
            thumbnail: ThumbnailMode::UrlOnly,
            ..FieldPlan::default()
        },
        renderer: Arc::new(FujiMainRenderer),
    }
}

pub struct FujiMainRenderer;

impl FeedRenderer for FujiMainRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::CONTENT, ns::WFW, ns::DC, ns::ATOM, ns::SY, ns::SLASH]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        ctx.write_site_basics(sink)?;
        sink.text("lastBuildDate", &ctx.last_build_date())?;
        sink.text("language", &ctx.config.site.language)?;
        sink.text("sy:updatePeriod", "hourly")?;
        sink.text("sy:updateFrequency", "1")
    }

    fn write_item(&self, _ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        sink.text("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.item.author.is_empty() {
            sink.cdata("dc:creator", &item.item.author)?;
        }
        for term in item.item.categories.iter().chain(item.item.tags.iter()) {
            sink.cdata("category", term)?;
        }
        sink.text_with("guid", &[("isPermaLink", "false")], &item.guid)?;
        sink.cdata("description", &text::excerpt_or_body(item.item))?;
        sink.cdata("content:encoded", &item.body)?;
        if let Some(thumbnail) = &item.thumbnail {
            sink.start("image", &[])?;
            sink.text("url", &thumbnail.url)?;
            sink.text("title", thumbnail.title.as_deref().unwrap_or_default())?;
            sink.text("link", &item.link)?;
            sink.end("image")?;
        }
        Ok(())
    }
}
