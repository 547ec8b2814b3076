//! Body-text cleanup for destinations that want curated HTML.
//!
//! The passes run in a fixed order. Each one is a pure `&str -> String`
//! transform, and a body that no pass matches comes back unchanged.

use crate::types::{Result, SyndicationError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Tags kept by the final pass unless a destination supplies its own list.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "a", "img", "blockquote", "iframe", "script",
];

/// Shortcodes removed together with any enclosed content.
pub const DEFAULT_SHORTCODES: &[&str] = &["caption", "wp_caption", "gallery", "embed", "audio", "video", "playlist"];

static BLOCKQUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<blockquote\b([^>]*)>.*?</blockquote\s*>").expect("valid regex"));

static EMBED_BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(twitter-tweet|twitter-video|instagram-media|data-instgrm|tiktok-embed|fb-xfbml-parse-ignore)")
        .expect("valid regex")
});

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>.*?</script\s*>").expect("valid regex"));

static SCRIPT_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex"));

static BARE_URL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s<>]+(?:<br\s*/?>)?$").expect("valid regex"));

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n){3,}").expect("valid regex"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("valid regex"));

/// Script hosts whose loaders are needed for preserved embeds.
const EMBED_SCRIPT_HOSTS: &[&str] = &[
    "platform.twitter.com",
    "platform.x.com",
    "www.instagram.com/embed.js",
    "instagram.com/embed.js",
    "www.tiktok.com/embed.js",
    "connect.facebook.net",
];

#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    allowed_tags: HashSet<String>,
    shortcodes: Vec<ShortcodePattern>,
}

#[derive(Debug, Clone)]
struct ShortcodePattern {
    enclosed: Regex,
    open: Regex,
    close: Regex,
}

impl ShortcodePattern {
    fn new(name: &str) -> Result<Self> {
        let name = regex::escape(name);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| SyndicationError::Config(format!("bad shortcode pattern: {}", e)))
        };
        Ok(Self {
            enclosed: compile(format!(r"(?s)\[{name}\b[^\]]*\].*?\[/{name}\]"))?,
            open: compile(format!(r"\[{name}\b[^\]]*\]"))?,
            close: compile(format!(r"\[/{name}\]"))?,
        })
    }
}

impl ContentSanitizer {
    pub fn new(allowed_tags: &[&str]) -> Result<Self> {
        Self::with_shortcodes(allowed_tags, DEFAULT_SHORTCODES)
    }

    pub fn with_shortcodes(allowed_tags: &[&str], shortcodes: &[&str]) -> Result<Self> {
        Ok(Self {
            allowed_tags: allowed_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            shortcodes: shortcodes
                .iter()
                .map(|name| ShortcodePattern::new(name))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Run every pass in order.
    pub fn sanitize(&self, html: &str) -> String {
        let mut result = preserve_embed_blockquotes(html);
        result = preserve_embed_scripts(&result);
        result = self.strip_shortcodes(&result);
        result = remove_bare_url_lines(&result);
        result = collapse_blank_lines(&result);
        result = newlines_to_breaks(&result);
        result = strip_tags(&result, &self.allowed_tags);
        // unwrapping tags can leave a URL alone on its line
        result = remove_bare_url_lines(&result);
        collapse_blank_lines(&result)
    }

    // -----------------------------------------------------------------------
    // Pass 3: Shortcodes
    // -----------------------------------------------------------------------

    fn strip_shortcodes(&self, html: &str) -> String {
        if !html.contains('[') {
            return html.to_string();
        }
        let mut result = html.to_string();
        for pattern in &self.shortcodes {
            result = pattern.enclosed.replace_all(&result, "").into_owned();
            result = pattern.open.replace_all(&result, "").into_owned();
            result = pattern.close.replace_all(&result, "").into_owned();
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Pass 1: Blockquotes
// ---------------------------------------------------------------------------

/// Keep blockquotes that carry an embed provider signature, drop the rest.
fn preserve_embed_blockquotes(html: &str) -> String {
    BLOCKQUOTE_RE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            if EMBED_BLOCKQUOTE_RE.is_match(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Scripts
// ---------------------------------------------------------------------------

/// Keep only scripts loaded from a known embed host.
fn preserve_embed_scripts(html: &str) -> String {
    SCRIPT_RE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let from_embed_host = SCRIPT_SRC_RE
                .captures(&caps[1])
                .map(|src| is_embed_script_host(&src[1]))
                .unwrap_or(false);
            if from_embed_host {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn is_embed_script_host(src: &str) -> bool {
    let src = src
        .trim_start_matches("https:")
        .trim_start_matches("http:")
        .trim_start_matches("//");
    EMBED_SCRIPT_HOSTS.iter().any(|host| src.starts_with(host))
}

// ---------------------------------------------------------------------------
// Pass 4: Bare URL lines
// ---------------------------------------------------------------------------

/// Drop lines that are nothing but a URL; clients would auto-embed them.
fn remove_bare_url_lines(html: &str) -> String {
    if !html.lines().any(|line| BARE_URL_LINE_RE.is_match(line.trim())) {
        return html.to_string();
    }
    html.split('\n')
        .filter(|line| !BARE_URL_LINE_RE.is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 5: Blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 3+ newlines into exactly 2.
fn collapse_blank_lines(html: &str) -> String {
    BLANK_RUN_RE.replace_all(html, "\n\n").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 6: Line breaks and tag whitelist
// ---------------------------------------------------------------------------

/// Single newlines become `<br />`; paragraph breaks (`\n\n`) stay.
fn newlines_to_breaks(html: &str) -> String {
    html.split("\n\n")
        .map(|paragraph| paragraph.replace('\n', "<br />\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Remove every tag whose name is not allowed, keeping its inner text.
/// `br` always survives.
///
/// Runs until nothing changes, since dropping an inner tag can splice the
/// pieces around it into a new one (`<<b>p>` becomes `<p>`).
pub fn strip_tags(html: &str, allowed: &HashSet<String>) -> String {
    let mut current = html.to_string();
    loop {
        let next = strip_tags_once(&current, allowed);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_tags_once(html: &str, allowed: &HashSet<String>) -> String {
    TAG_RE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let name = caps[1].to_ascii_lowercase();
            if name == "br" || allowed.contains(&name) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Convenience form of [`strip_tags`] for a fixed list.
pub fn strip_tags_except(html: &str, allowed: &[&str]) -> String {
    let allowed: HashSet<String> = allowed.iter().map(|t| t.to_ascii_lowercase()).collect();
    strip_tags(html, &allowed)
}
