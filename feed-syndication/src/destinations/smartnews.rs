use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{FieldPlan, StatusMapper, ThumbnailMode};
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "smartnews";

pub fn strategy() -> DestinationStrategy {
    DestinationStrategy {
        descriptor: FeedDescriptor::new(ID, "SmartNews", &["column", "news", "restaurant", "hyakusai", "kojocho"]),
        policy: SelectionPolicy::default(),
        fields: FieldPlan {
            status: StatusMapper::words(),
            thumbnail: ThumbnailMode::UrlOnly,
            ..FieldPlan::default()
        },
        renderer: Arc::new(SmartNewsRenderer),
    }
}

pub struct SmartNewsRenderer;

impl FeedRenderer for SmartNewsRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::CONTENT, ns::DC, ns::MEDIA, ns::SNF]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        ctx.write_site_basics(sink)?;
        sink.text("pubDate", &ctx.now_rfc2822())?;
        sink.text("language", &ctx.config.site.language)?;
        if let Some(logo) = ctx.square_logo() {
            sink.start("snf:logo", &[])?;
            sink.text("url", logo)?;
            sink.end("snf:logo")?;
        }
        Ok(())
    }

    fn write_item(&self, _ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        sink.text("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        sink.text("guid", &item.link)?;
        sink.cdata("description", &item.body)?;
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.item.categories.is_empty() {
            sink.text("category", &item.item.categories.join(","))?;
        }
        sink.cdata("content:encoded", &item.body)?;
        if !item.item.author.is_empty() {
            sink.text("dc:creator", &item.item.author)?;
        }
        if let Some(thumbnail) = &item.thumbnail {
            sink.empty("media:thumbnail", &[("url", thumbnail.url.as_str())])?;
        }
        sink.text("media:status", &item.status_label)
    }
}
