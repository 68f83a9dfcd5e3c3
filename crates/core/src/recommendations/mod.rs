//! Cross-catalog recommendations
//!
//! Given an item from one catalog, ranks related items from a target catalog
//! using three tiers of decreasing confidence: an explicit or structural
//! relation, a shared tag, then a shared category.

mod engine;
mod query;
mod strategy;
mod types;

pub use engine::RecommendationEngine;
pub use query::{RecommendationQuery, RecommendationsView};
pub use strategy::{StrategyEntry, StrongSignal, TypePair, STRATEGY_TABLE};
pub use types::*;

use crate::catalog::CatalogSet;

/// Maximum recommendations to return when the caller does not say
pub const DEFAULT_MAX_ITEMS: usize = 3;

/// Computes recommendations with the built-in strategy table.
pub fn recommend(request: &RecommendationRequest, catalogs: CatalogSet<'_>) -> Vec<Recommendation> {
    RecommendationEngine::new().recommend(request, catalogs)
}
