use crate::aggregator::{DuplicatePolicy, SourceAggregator};
use crate::config::SyndicationConfig;
use crate::criteria::CriteriaBuilder;
use crate::destinations::{builtin_strategies, DestinationRegistry, DestinationStrategy};
use crate::eligibility::MetaEligibility;
use crate::fetcher::HttpImageProbe;
use crate::hooks::HookRegistry;
use crate::render::{render_feed, ChannelContext};
use crate::resolvers::{FieldResolvers, PermalinkOverrideResolver, ThumbnailResolver, TimeFormatter};
use crate::traits::{ContentRepository, EligibilityService, ImageProbe};
use crate::types::{AggregatedFeed, Result};
use crate::utils::time::{expires_at, http_date};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Identity and clock of a single feed request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub destination_id: String,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(destination_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            destination_id: destination_id.to_string(),
            now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildCriteria,
    Aggregate,
    ResolveFields,
    Render,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BuildCriteria => "build-criteria",
            Stage::Aggregate => "aggregate",
            Stage::ResolveFields => "resolve-fields",
            Stage::Render => "render",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// What the host writes back: headers plus the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub content_type: String,
    pub expires: String,
    pub body: String,
}

/// Request-scoped feed generation over long-lived, read-only state.
pub struct SyndicationPipeline {
    config: Arc<SyndicationConfig>,
    registry: DestinationRegistry,
    aggregator: SourceAggregator,
    resolvers: FieldResolvers,
    hooks: HookRegistry,
}

impl SyndicationPipeline {
    pub fn builder(config: SyndicationConfig, repository: Arc<dyn ContentRepository>) -> PipelineBuilder {
        PipelineBuilder::new(config, repository)
    }

    pub fn config(&self) -> &SyndicationConfig {
        &self.config
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    pub async fn generate(&self, destination_id: &str) -> Result<FeedResponse> {
        self.generate_at(destination_id, Utc::now()).await
    }

    /// Generates the feed as of `now`. Unknown and disabled destinations
    /// are rejected before the repository is touched.
    pub async fn generate_at(&self, destination_id: &str, now: DateTime<Utc>) -> Result<FeedResponse> {
        let request = RequestContext::new(destination_id, now);
        let span = info_span!("feed", request_id = %request.request_id, destination = destination_id);

        async move {
            let strategy = self.registry.enabled(&request.destination_id).map_err(|e| {
                error!("Rejected feed request: {}", e);
                e
            })?;

            let feed = self.aggregate(strategy, &request).await?;
            let body = self.render(strategy, &feed, &request).await?;

            debug!(stage = %Stage::Emit, "Feed ready ({} bytes)", body.len());
            Ok(FeedResponse {
                content_type: format!("text/xml; charset={}", self.config.charset),
                expires: http_date(&expires_at(request.now, self.config.expires_hours)),
                body,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs criteria building and aggregation for one destination.
    pub async fn aggregate(&self, strategy: &DestinationStrategy, request: &RequestContext) -> Result<AggregatedFeed> {
        let descriptor = &strategy.descriptor;
        debug!(
            stage = %Stage::BuildCriteria,
            "Building criteria for {} (request {})",
            descriptor.id,
            request.request_id
        );
        let criteria = self
            .aggregator
            .criteria_builder()
            .build_with_policy(descriptor, &descriptor.id, &strategy.policy);

        debug!(stage = %Stage::Aggregate, "Aggregating {}", descriptor.id);
        self.aggregator
            .aggregate(descriptor, &criteria, &strategy.policy.secondary_content_types)
            .await
    }

    /// Resolves per-item fields and writes the document. Works for disabled
    /// destinations too, so they can be previewed.
    pub async fn render(
        &self,
        strategy: &DestinationStrategy,
        feed: &AggregatedFeed,
        request: &RequestContext,
    ) -> Result<String> {
        debug!(stage = %Stage::ResolveFields, "Resolving {} items", feed.items.len());
        let mut rendered = Vec::with_capacity(feed.items.len());
        for item in &feed.items {
            rendered.push(self.resolvers.resolve(item, &strategy.fields).await);
        }

        debug!(stage = %Stage::Render, "Rendering {}", strategy.descriptor.id);
        let ctx = ChannelContext {
            descriptor: &strategy.descriptor,
            config: &self.config,
            formatter: self.resolvers.time(),
            request,
            items: &rendered,
        };
        let body = render_feed(strategy.renderer.as_ref(), &ctx, &self.hooks)?;

        info!(
            "Rendered {} feed with {} items",
            strategy.descriptor.label,
            rendered.len()
        );
        Ok(body)
    }
}

/// Pipeline builder for easier configuration
pub struct PipelineBuilder {
    config: SyndicationConfig,
    repository: Arc<dyn ContentRepository>,
    eligibility: Option<Arc<dyn EligibilityService>>,
    probe: Option<Arc<dyn ImageProbe>>,
    hooks: HookRegistry,
    duplicates: DuplicatePolicy,
    extra_destinations: Vec<DestinationStrategy>,
}

impl PipelineBuilder {
    pub fn new(config: SyndicationConfig, repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            config,
            repository,
            eligibility: None,
            probe: None,
            hooks: HookRegistry::new(),
            duplicates: DuplicatePolicy::default(),
            extra_destinations: Vec::new(),
        }
    }

    pub fn eligibility(mut self, service: Arc<dyn EligibilityService>) -> Self {
        self.eligibility = Some(service);
        self
    }

    pub fn image_probe(mut self, probe: Arc<dyn ImageProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn add_destination(mut self, strategy: DestinationStrategy) -> Self {
        self.extra_destinations.push(strategy);
        self
    }

    pub fn build(self) -> Result<SyndicationPipeline> {
        self.config.validate()?;
        let timezone = self.config.timezone()?;

        let eligibility: Arc<dyn EligibilityService> = match self.eligibility {
            Some(service) => service,
            None => Arc::new(MetaEligibility::new(self.config.eligibility_meta_key.clone())),
        };
        let probe: Arc<dyn ImageProbe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(HttpImageProbe::new(self.config.thumbnail.clone())?),
        };

        let mut strategies = builtin_strategies()?;
        strategies.extend(self.extra_destinations);
        let registry = DestinationRegistry::from_strategies(strategies, &self.config)?;

        let criteria_builder = Arc::new(CriteriaBuilder::new(eligibility, self.config.excluded_taxonomy.clone()));
        let aggregator =
            SourceAggregator::new(self.repository.clone(), criteria_builder).with_duplicate_policy(self.duplicates);

        let thumbnails = ThumbnailResolver::new(
            self.repository,
            probe,
            Duration::from_millis(self.config.thumbnail.timeout_ms),
        );
        let resolvers = FieldResolvers::new(
            thumbnails,
            PermalinkOverrideResolver::new(&self.config.external_content_type),
            TimeFormatter::new(timezone),
        );

        info!(
            "Syndication pipeline ready: {} destinations, timezone {}",
            registry.len(),
            timezone.map(|tz| tz.name().to_string()).unwrap_or_else(|| "UTC (unconverted)".to_string())
        );

        Ok(SyndicationPipeline {
            config: Arc::new(self.config),
            registry,
            aggregator,
            resolvers,
            hooks: self.hooks,
        })
    }
}
