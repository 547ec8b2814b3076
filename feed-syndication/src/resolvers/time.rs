use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// RFC 2822 in chrono's format syntax.
pub const RFC2822: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Renders stored GMT timestamps in the single configured target zone.
#[derive(Debug, Clone, Copy)]
pub struct TimeFormatter {
    timezone: Option<Tz>,
}

impl TimeFormatter {
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }

    /// Without a configured zone the timestamp is formatted as stored (UTC).
    pub fn format(&self, timestamp: &DateTime<Utc>, format: &str) -> String {
        match self.timezone {
            Some(tz) => timestamp.with_timezone(&tz).format(format).to_string(),
            None => timestamp.format(format).to_string(),
        }
    }

    pub fn rfc2822(&self, timestamp: &DateTime<Utc>) -> String {
        self.format(timestamp, RFC2822)
    }
}
