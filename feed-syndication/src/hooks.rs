//! Extension points at the channel and item boundaries of every feed.
//!
//! Hooks run in registration order and write straight into the document.
//! `Pre` channel hooks run right after `<channel>` opens, `Post` ones after
//! the standard channel elements and before the first item. Item hooks run
//! right after `<item>` opens and right before it closes.

use crate::render::ChannelContext;
use crate::types::{RenderedItem, Result};
use crate::xml::XmlSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    Pre,
    Post,
}

pub type ChannelHook = Box<dyn Fn(&ChannelContext<'_>, &mut XmlSink) -> Result<()> + Send + Sync>;
pub type ItemHook = Box<dyn Fn(&ChannelContext<'_>, &RenderedItem<'_>, &mut XmlSink) -> Result<()> + Send + Sync>;

#[derive(Default)]
pub struct HookRegistry {
    namespaces: Vec<(String, String)>,
    channel_hooks: Vec<(HookPoint, ChannelHook)>,
    item_hooks: Vec<(HookPoint, ItemHook)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra `xmlns:prefix` declaration on the root element.
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) -> &mut Self {
        self.namespaces.push((prefix.to_string(), uri.to_string()));
        self
    }

    pub fn on_channel<F>(&mut self, point: HookPoint, hook: F) -> &mut Self
    where
        F: Fn(&ChannelContext<'_>, &mut XmlSink) -> Result<()> + Send + Sync + 'static,
    {
        self.channel_hooks.push((point, Box::new(hook)));
        self
    }

    pub fn on_item<F>(&mut self, point: HookPoint, hook: F) -> &mut Self
    where
        F: Fn(&ChannelContext<'_>, &RenderedItem<'_>, &mut XmlSink) -> Result<()> + Send + Sync + 'static,
    {
        self.item_hooks.push((point, Box::new(hook)));
        self
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub(crate) fn run_channel(&self, point: HookPoint, ctx: &ChannelContext<'_>, sink: &mut XmlSink) -> Result<()> {
        for (_, hook) in self.channel_hooks.iter().filter(|(p, _)| *p == point) {
            hook(ctx, sink)?;
        }
        Ok(())
    }

    pub(crate) fn run_item(
        &self,
        point: HookPoint,
        ctx: &ChannelContext<'_>,
        item: &RenderedItem<'_>,
        sink: &mut XmlSink,
    ) -> Result<()> {
        for (_, hook) in self.item_hooks.iter().filter(|(p, _)| *p == point) {
            hook(ctx, item, sink)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("namespaces", &self.namespaces)
            .field("channel_hooks", &self.channel_hooks.len())
            .field("item_hooks", &self.item_hooks.len())
            .finish()
    }
}
