use serde::{Deserialize, Serialize};
// Content records come from the interfaces crate
pub use interfaces::defs::{meta, ContentItem, FeaturedImage, PostStatus};

/// Static per-destination selection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub id: String,
    pub label: String,
    pub target_content_types: Vec<String>,
    pub page_size: usize,
    pub priority: i32,
    pub enabled: bool,
}

impl FeedDescriptor {
    pub fn new(id: &str, label: &str, target_content_types: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            target_content_types: target_content_types.iter().map(|t| t.to_string()).collect(),
            page_size: 20,
            priority: 1,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(SyndicationError::InvalidDescriptor("empty destination id".to_string()));
        }
        if self.enabled && self.page_size == 0 {
            return Err(SyndicationError::InvalidDescriptor(format!(
                "{}: page size must be greater than zero",
                self.id
            )));
        }
        if self.target_content_types.is_empty() {
            return Err(SyndicationError::InvalidDescriptor(format!(
                "{}: no target content types",
                self.id
            )));
        }
        Ok(())
    }
}

/// Items selected for one destination, newest first, at most `page_size` long.
#[derive(Debug, Clone)]
pub struct AggregatedFeed {
    pub destination_id: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub mime_type: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub url: String,
    pub title: String,
}

/// A content item plus every field derived for one destination.
#[derive(Debug, Clone)]
pub struct RenderedItem<'a> {
    pub item: &'a ContentItem,
    pub link: String,
    pub guid: String,
    pub body: String,
    pub thumbnail: Option<Thumbnail>,
    pub related_links: Vec<RelatedLink>,
    pub status_label: String,
    pub pub_date: String,
    pub modified_date: String,
}

/// Coarse classification surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Repository,
    NotFound,
    Configuration,
    Render,
    Fetch,
}

#[derive(Debug, thiserror::Error)]
pub enum SyndicationError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unknown destination: {id}")]
    UnknownDestination { id: String },

    #[error("Destination disabled: {id}")]
    DestinationDisabled { id: String },

    #[error("Invalid feed descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SyndicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Repository(_) => ErrorKind::Repository,
            Self::UnknownDestination { .. } | Self::DestinationDisabled { .. } => ErrorKind::NotFound,
            Self::InvalidDescriptor(_) | Self::Config(_) | Self::Serialization(_) | Self::Toml(_) => {
                ErrorKind::Configuration
            }
            Self::Xml(_) | Self::Io(_) => ErrorKind::Render,
            Self::Http(_) => ErrorKind::Fetch,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyndicationError>;
