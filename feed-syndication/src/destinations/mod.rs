//! Built-in syndication destinations and the registry that resolves them.
//!
//! A destination is a strategy bundle: the static descriptor, how its
//! criteria are shaped, which derived fields it needs, and the renderer for
//! its element vocabulary.

pub mod ballooon;
pub mod fujimain;
pub mod goo;
pub mod gunosy;
pub mod line;
pub mod smartnews;

use crate::config::SyndicationConfig;
use crate::criteria::SelectionPolicy;
use crate::render::FeedRenderer;
use crate::resolvers::FieldPlan;
use crate::types::{FeedDescriptor, Result, SyndicationError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct DestinationStrategy {
    pub descriptor: FeedDescriptor,
    pub policy: SelectionPolicy,
    pub fields: FieldPlan,
    pub renderer: Arc<dyn FeedRenderer>,
}

impl std::fmt::Debug for DestinationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationStrategy")
            .field("descriptor", &self.descriptor)
            .field("policy", &self.policy)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DestinationRegistry {
    strategies: BTreeMap<String, DestinationStrategy>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the given strategies, then applies the config overrides.
    /// An override naming no registered destination is a config error.
    pub fn from_strategies(strategies: Vec<DestinationStrategy>, config: &SyndicationConfig) -> Result<Self> {
        let mut registry = Self::new();
        for strategy in strategies {
            registry.register(apply_override(strategy, config))?;
        }

        for id in config.destinations.keys() {
            if !registry.strategies.contains_key(id) {
                return Err(SyndicationError::Config(format!("override for unknown destination: {}", id)));
            }
        }

        info!(
            "Registered {} destinations ({} enabled)",
            registry.strategies.len(),
            registry.strategies.values().filter(|s| s.descriptor.enabled).count()
        );
        Ok(registry)
    }

    pub fn register(&mut self, strategy: DestinationStrategy) -> Result<()> {
        strategy.descriptor.validate()?;
        let id = strategy.descriptor.id.clone();
        if self.strategies.contains_key(&id) {
            return Err(SyndicationError::InvalidDescriptor(format!("duplicate destination id: {}", id)));
        }
        debug!("Registering destination {} ({})", id, strategy.descriptor.label);
        self.strategies.insert(id, strategy);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&DestinationStrategy> {
        self.strategies
            .get(id)
            .ok_or_else(|| SyndicationError::UnknownDestination { id: id.to_string() })
    }

    /// Like [`get`](Self::get), but disabled destinations are rejected.
    pub fn enabled(&self, id: &str) -> Result<&DestinationStrategy> {
        let strategy = self.get(id)?;
        if !strategy.descriptor.enabled {
            return Err(SyndicationError::DestinationDisabled { id: id.to_string() });
        }
        Ok(strategy)
    }

    /// Descriptors ordered by priority (highest first), then label.
    pub fn descriptors(&self) -> Vec<&FeedDescriptor> {
        let mut descriptors: Vec<&FeedDescriptor> = self.strategies.values().map(|s| &s.descriptor).collect();
        descriptors.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.label.cmp(&b.label)));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

pub fn builtin_strategies() -> Result<Vec<DestinationStrategy>> {
    Ok(vec![
        smartnews::strategy(),
        gunosy::strategy(),
        line::strategy()?,
        goo::strategy(),
        ballooon::strategy(),
        fujimain::strategy(),
    ])
}

fn apply_override(mut strategy: DestinationStrategy, config: &SyndicationConfig) -> DestinationStrategy {
    if let Some(over) = config.destination_override(&strategy.descriptor.id) {
        if let Some(enabled) = over.enabled {
            strategy.descriptor.enabled = enabled;
        }
        if let Some(page_size) = over.page_size {
            strategy.descriptor.page_size = page_size;
        }
    }
    strategy
}
