/// Text processing utilities
pub mod text {
    use crate::types::ContentItem;
    use regex::Regex;
    use std::sync::LazyLock;
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    static ANY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    /// Cut `text` so its display width, marker included, fits in `width`.
    /// Wide (East Asian) characters count as two columns.
    pub fn strim_width(text: &str, width: usize, marker: &str) -> String {
        if text.width() <= width {
            return text.to_string();
        }

        let budget = width.saturating_sub(marker.width());
        let mut used = 0;
        let mut out = String::new();
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            used += w;
            out.push(c);
        }
        out.push_str(marker);
        out
    }

    /// Tags removed, whitespace collapsed.
    pub fn plain_text(html: &str) -> String {
        ANY_TAG_RE
            .replace_all(html, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The stored excerpt, or the body as plain text when none is stored.
    pub fn excerpt_or_body(item: &ContentItem) -> String {
        if item.excerpt.trim().is_empty() {
            plain_text(&item.body_html)
        } else {
            item.excerpt.trim().to_string()
        }
    }

}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Duration, Utc};

    /// HTTP date as used in cache headers, always GMT.
    pub fn http_date(timestamp: &DateTime<Utc>) -> String {
        timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    pub fn expires_at(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
        now + Duration::hours(i64::from(hours))
    }

}
