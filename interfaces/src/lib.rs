pub mod defs;

pub use defs::{ContentItem, FeaturedImage, PostStatus};
