//! Shared RSS 2.0 document lifecycle. Destination renderers only supply the
//! namespaces, channel elements, and item elements.

use crate::config::{LogoConfig, SyndicationConfig};
use crate::hooks::{HookPoint, HookRegistry};
use crate::pipeline::RequestContext;
use crate::resolvers::TimeFormatter;
use crate::types::{FeedDescriptor, RenderedItem, Result};
use crate::xml::XmlSink;
use tracing::debug;

pub mod ns {
    pub const CONTENT: (&str, &str) = ("content", "http://purl.org/rss/1.0/modules/content/");
    pub const DC: (&str, &str) = ("dc", "http://purl.org/dc/elements/1.1/");
    pub const MEDIA: (&str, &str) = ("media", "http://search.yahoo.com/mrss/");
    pub const ATOM: (&str, &str) = ("atom", "http://www.w3.org/2005/Atom");
    pub const SY: (&str, &str) = ("sy", "http://purl.org/rss/1.0/modules/syndication/");
    pub const WFW: (&str, &str) = ("wfw", "http://wellformedweb.org/CommentAPI/");
    pub const SLASH: (&str, &str) = ("slash", "http://purl.org/rss/1.0/modules/slash/");
    pub const SNF: (&str, &str) = ("snf", "http://www.smartnews.be/snf");
    pub const GNF: (&str, &str) = ("gnf", "http://assets.gunosy.com/media/gnf");
    pub const OA: (&str, &str) = ("oa", "http://news.line.me/rss/1.0/oa");
    pub const GOONEWS: (&str, &str) = ("goonews", "http://news.goo.ne.jp/rss/2.0/news/goonews/");
    pub const SMP: (&str, &str) = ("smp", "http://news.goo.ne.jp/rss/2.0/news/smp/");
    pub const BLF: (&str, &str) = ("blf", "https://www.ballooon.jp/media/blf/");
}

/// Everything a renderer or hook may read while writing one document.
pub struct ChannelContext<'a> {
    pub descriptor: &'a FeedDescriptor,
    pub config: &'a SyndicationConfig,
    pub formatter: &'a TimeFormatter,
    pub request: &'a RequestContext,
    pub items: &'a [RenderedItem<'a>],
}

impl ChannelContext<'_> {
    pub fn now_rfc2822(&self) -> String {
        self.formatter.rfc2822(&self.request.now)
    }

    /// Latest modification among the rendered items, or now for an empty feed.
    pub fn last_build_date(&self) -> String {
        let latest = self
            .items
            .iter()
            .filter_map(|rendered| rendered.item.modified_date.or(rendered.item.publish_date))
            .max()
            .unwrap_or(self.request.now);
        self.formatter.rfc2822(&latest)
    }

    pub fn logo(&self) -> Option<&LogoConfig> {
        self.config.logo(&self.descriptor.id)
    }

    /// Destination's square logo, else the site logo.
    pub fn square_logo(&self) -> Option<&str> {
        self.logo()
            .and_then(|l| l.square.as_deref())
            .or(self.config.site.logo.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// Destination's wide logo, else the site logo.
    pub fn wide_logo(&self) -> Option<&str> {
        self.logo()
            .and_then(|l| l.wide.as_deref())
            .or(self.config.site.logo.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// `<title>`, `<link>`, `<description>` from the site settings.
    pub fn write_site_basics(&self, sink: &mut XmlSink) -> Result<()> {
        sink.text("title", &self.config.site.title)?;
        sink.text("link", &self.config.site.link)?;
        sink.text("description", &self.config.site.description)
    }

    /// `<image>` block pointing at the given logo.
    pub fn write_image_block(&self, sink: &mut XmlSink, url: &str) -> Result<()> {
        sink.start("image", &[])?;
        sink.text("url", url)?;
        sink.text("title", &self.config.site.title)?;
        sink.text("link", &self.config.site.link)?;
        sink.end("image")
    }
}

/// Destination-specific element vocabulary.
pub trait FeedRenderer: Send + Sync {
    fn namespaces(&self) -> &[(&'static str, &'static str)];

    fn write_channel(&self, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()>;

    fn write_item(&self, ctx: &ChannelContext<'_>, item: &RenderedItem<'_>, sink: &mut XmlSink) -> Result<()>;
}

/// Writes one complete document: declaration, root with namespaces, the
/// channel elements once, then every item in order.
pub fn render_feed(renderer: &dyn FeedRenderer, ctx: &ChannelContext<'_>, hooks: &HookRegistry) -> Result<String> {
    let mut sink = XmlSink::new();
    sink.declaration(&ctx.config.charset)?;

    let mut root_attrs: Vec<(String, String)> = vec![("version".to_string(), "2.0".to_string())];
    for (prefix, uri) in renderer.namespaces() {
        root_attrs.push((format!("xmlns:{}", prefix), uri.to_string()));
    }
    for (prefix, uri) in hooks.namespaces() {
        let name = format!("xmlns:{}", prefix);
        if !root_attrs.iter().any(|(existing, _)| *existing == name) {
            root_attrs.push((name, uri.clone()));
        }
    }
    let root_attrs: Vec<(&str, &str)> = root_attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    sink.start("rss", &root_attrs)?;
    sink.start("channel", &[])?;
    hooks.run_channel(HookPoint::Pre, ctx, &mut sink)?;
    renderer.write_channel(ctx, &mut sink)?;
    hooks.run_channel(HookPoint::Post, ctx, &mut sink)?;

    for item in ctx.items {
        sink.start("item", &[])?;
        hooks.run_item(HookPoint::Pre, ctx, item, &mut sink)?;
        renderer.write_item(ctx, item, &mut sink)?;
        hooks.run_item(HookPoint::Post, ctx, item, &mut sink)?;
        sink.end("item")?;
    }

    sink.end("channel")?;
    sink.end("rss")?;

    debug!(
        "Rendered {} items for {} (request {})",
        ctx.items.len(),
        ctx.descriptor.id,
        ctx.request.request_id
    );
    sink.finish()
}
