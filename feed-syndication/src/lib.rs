pub mod types;
pub mod config;
pub mod traits;
pub mod eligibility;
pub mod criteria;
pub mod aggregator;
pub mod sanitizer;
pub mod resolvers;
pub mod fetcher;
pub mod xml;
pub mod hooks;
pub mod render;
pub mod destinations;
pub mod pipeline;
pub mod repository;
pub mod utils;

pub use types::*;
pub use config::SyndicationConfig;
pub use traits::{ContentRepository, EligibilityService, ImageProbe};
pub use eligibility::MetaEligibility;
pub use criteria::{CriteriaBuilder, SelectionCriteria, SelectionPolicy};
pub use aggregator::{DuplicatePolicy, SourceAggregator};
pub use sanitizer::ContentSanitizer;
pub use fetcher::HttpImageProbe;
pub use hooks::{HookPoint, HookRegistry};
pub use render::{ChannelContext, FeedRenderer};
pub use destinations::{DestinationRegistry, DestinationStrategy};
pub use pipeline::{FeedResponse, PipelineBuilder, RequestContext, SyndicationPipeline};
pub use repository::InMemoryRepository;
