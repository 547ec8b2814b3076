use crate::types::PostStatus;

/// Destination-specific words for published and trashed items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMapper {
    active: String,
    deleted: String,
}

impl StatusMapper {
    pub fn new(active: &str, deleted: &str) -> Self {
        Self {
            active: active.to_string(),
            deleted: deleted.to_string(),
        }
    }

    /// `active` / `deleted`
    pub fn words() -> Self {
        Self::new("active", "deleted")
    }

    /// `2` / `0`
    pub fn numeric() -> Self {
        Self::new("2", "0")
    }

    pub fn map(&self, status: PostStatus) -> &str {
        match status {
            PostStatus::Published => &self.active,
            PostStatus::Trashed => &self.deleted,
        }
    }
}
