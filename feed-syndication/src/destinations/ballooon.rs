use super::DestinationStrategy;
use crate::criteria::SelectionPolicy;
use crate::render::{ns, ChannelContext, FeedRenderer};
use crate::resolvers::{FieldPlan, StatusMapper, ThumbnailMode};
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::utils::text;
use crate::xml::XmlSink;
use std::sync::Arc;

pub const ID: &str = "ballooon";

const DESCRIPTION_WIDTH: usize = 253;
const KEYWORD_CAP: usize = 10;
const CATEGORY: &str = "ニュース";

pub fn strategy() -> DestinationStrategy {
    DestinationStrategy {
        descriptor: FeedDescriptor::new(ID, "Ballooon", &["post"]).disabled(),
        policy: SelectionPolicy::eligibility_only(),
        fields: FieldPlan {
            status: StatusMapper::words(),
            thumbnail: ThumbnailMode::WithMime,
            ..FieldPlan::default()
        },
        renderer: Arc::new(BallooonRenderer),
    }
}

pub struct BallooonRenderer;

impl FeedRenderer for BallooonRenderer {
    fn namespaces(&self) -> &[(&'static str, &'static str)] {
        &[ns::BLF, ns::CONTENT, ns::DC]
    }

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        ctx.write_site_basics(sink)?;
        if let Some(logo) = ctx.square_logo() {
            ctx.write_image_block(sink, logo)?;
        }
        if let Some(wide) = ctx.wide_logo() {
            sink.text("blf:wide_image_link", wide)?;
        }
        sink.text("language", &ctx.config.site.language)?;
        sink.text("lastBuildDate", &ctx.last_build_date())?;
        sink.text("copyright", &ctx.config.site.title)
    }

    fn write_item(&self, _ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()> {
        let description = text::strim_width(&text::excerpt_or_body(item.item), DESCRIPTION_WIDTH, "...");
        let keywords: Vec<&str> = item.item.tags.iter().take(KEYWORD_CAP).map(String::as_str).collect();

        sink.text("title", &item.item.title)?;
        sink.text("link", &item.link)?;
        sink.text("guid", &item.guid)?;
        if !keywords.is_empty() {
            sink.text("blf:keyword", &keywords.join(","))?;
        }
        sink.cdata("description", &description)?;
        sink.cdata("content:encoded", &item.body)?;
        sink.text("blf:status", &item.status_label)?;
        if !item.pub_date.is_empty() {
            sink.text("pubDate", &item.pub_date)?;
        }
        if !item.item.author.is_empty() {
            sink.text("dc:creator", &item.item.author)?;
        }
        if !item.modified_date.is_empty() {
            sink.text("blf:modified", &item.modified_date)?;
        }
        if let Some(thumbnail) = &item.thumbnail {
            if let Some(mime_type) = &thumbnail.mime_type {
                sink.empty("enclosure", &[("url", thumbnail.url.as_str()), ("length", "0"), ("type", mime_type.as_str())])?;
            }
        }
        sink.text("category", CATEGORY)
    }
}
