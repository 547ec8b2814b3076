use crate::types::{Result, SyndicationError};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Process-wide settings, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyndicationConfig {
    pub charset: String,
    /// IANA zone every date is rendered in. `None` disables conversion.
    pub timezone: Option<String>,
    pub expires_hours: u32,
    pub site: SiteInfo,
    pub logos: HashMap<String, LogoConfig>,
    pub thumbnail: ThumbnailConfig,
    pub eligibility_meta_key: String,
    /// Content type imported from an outside source. Its items carry a base
    /// URL override and their own related-link field.
    pub external_content_type: String,
    pub excluded_taxonomy: TaxonomyExclusion,
    pub destinations: HashMap<String, DestinationOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoConfig {
    pub square: Option<String>,
    pub wide: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyExclusion {
    pub taxonomy: String,
    pub term: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationOverride {
    pub enabled: Option<bool>,
    pub page_size: Option<usize>,
}

impl Default for SyndicationConfig {
    fn default() -> Self {
        Self {
            charset: "UTF-8".to_string(),
            timezone: Some("Asia/Tokyo".to_string()),
            expires_hours: 1,
            site: SiteInfo::default(),
            logos: HashMap::new(),
            thumbnail: ThumbnailConfig::default(),
            eligibility_meta_key: interfaces::defs::meta::DELIVERY_SERVICES.to_string(),
            external_content_type: "yahoo".to_string(),
            excluded_taxonomy: TaxonomyExclusion::default(),
            destinations: HashMap::new(),
        }
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Feed Syndication".to_string(),
            link: "https://example.com".to_string(),
            description: String::new(),
            language: "ja".to_string(),
            logo: None,
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3_000,
            user_agent: "Feed-Syndication/1.0".to_string(),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for TaxonomyExclusion {
    fn default() -> Self {
        Self {
            taxonomy: "news-cat".to_string(),
            term: "08".to_string(),
        }
    }
}

impl SyndicationConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading syndication config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.charset.trim().is_empty() {
            return Err(SyndicationError::Config("charset must not be empty".to_string()));
        }
        self.timezone()?;
        for (id, over) in &self.destinations {
            if over.page_size == Some(0) {
                return Err(SyndicationError::Config(format!(
                    "destination {}: page_size must be greater than zero",
                    id
                )));
            }
        }
        debug!("Config validated ({} destination overrides)", self.destinations.len());
        Ok(())
    }

    /// The parsed target zone, if one is configured.
    pub fn timezone(&self) -> Result<Option<Tz>> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| SyndicationError::Config(format!("unknown timezone: {}", name))),
        }
    }

    pub fn logo(&self, destination_id: &str) -> Option<&LogoConfig> {
        self.logos.get(destination_id)
    }

    pub fn destination_override(&self, destination_id: &str) -> Option<&DestinationOverride> {
        self.destinations.get(destination_id)
    }
}
