//! Recommendation Engine implementation

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::CatalogSet;
use crate::domain::content::{normalize_category, ContentId, ContentItem, ContentKind};

use super::strategy::{StrategyEntry, StrongSignal, TypePair, STRATEGY_TABLE};
use super::types::*;

/// Tiered recommendation engine.
///
/// Stateless apart from its strategy table: every call recomputes from the
/// catalogs it is given, so identical inputs give identical output.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    strategies: &'static [StrategyEntry],
}

impl RecommendationEngine {
    /// Create an engine with the built-in pairings
    pub fn new() -> Self {
        Self { strategies: STRATEGY_TABLE }
    }

    /// Create with a custom strategy table
    pub fn with_strategies(strategies: &'static [StrategyEntry]) -> Self {
        Self { strategies }
    }

    pub fn supports(&self, source: ContentKind, target: ContentKind) -> bool {
        StrongSignal::for_pair(self.strategies, TypePair::unchecked(source, target)).is_some()
    }

    /// Ranked, deduplicated recommendations for `request`.
    ///
    /// Degenerate inputs (catalogs still loading, unknown source, unsupported
    /// pairing, zero cap) produce an empty list rather than an error.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        catalogs: CatalogSet<'_>,
    ) -> Vec<Recommendation> {
        if catalogs.is_loading() {
            debug!(
                event_name = "recommendations.engine.catalogs_loading",
                source_id = %request.source_id,
                "catalogs still loading; returning no recommendations"
            );
            return Vec::new();
        }

        if request.options.max_items == 0 {
            return Vec::new();
        }

        let pair = TypePair::unchecked(request.source_kind, request.target_kind);
        let Some(signal) = StrongSignal::for_pair(self.strategies, pair) else {
            warn!(
                event_name = "recommendations.engine.unsupported_pair",
                source_kind = %request.source_kind,
                target_kind = %request.target_kind,
                "no strategy registered for catalog pairing"
            );
            return Vec::new();
        };

        let Some(source) = catalogs.find(request.source_kind, &request.source_id) else {
            debug!(
                event_name = "recommendations.engine.unknown_source",
                source_kind = %request.source_kind,
                source_id = %request.source_id,
                "source item not found in its catalog"
            );
            return Vec::new();
        };

        let recommendations = match request.target_kind {
            ContentKind::Lesson => rank_candidates(
                source,
                ContentKind::Lesson,
                catalogs.lessons.catalog.items(),
                signal,
                &request.options,
            ),
            ContentKind::Tool => rank_candidates(
                source,
                ContentKind::Tool,
                catalogs.tools.catalog.items(),
                signal,
                &request.options,
            ),
        };

        debug!(
            event_name = "recommendations.engine.computed",
            source_kind = %request.source_kind,
            source_id = %request.source_id,
            target_kind = %request.target_kind,
            candidates = catalogs.len(request.target_kind),
            returned = recommendations.len(),
            "recommendations computed"
        );

        recommendations
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the three tiers over `candidates` in precedence order.
///
/// Each tier skips anything a stronger tier already took, so an item keeps
/// the strength of the first tier it qualified for. Within a tier the
/// catalog order is preserved.
fn rank_candidates<T: ContentItem>(
    source: &dyn ContentItem,
    target_kind: ContentKind,
    candidates: &[T],
    signal: StrongSignal,
    options: &RecommendationOptions,
) -> Vec<Recommendation> {
    let mut taken: HashSet<&ContentId> = HashSet::new();
    let mut ranked = Vec::new();

    // Same-catalog pairings must never recommend the source itself.
    if source.kind() == target_kind {
        taken.insert(source.id());
    }

    collect_tier(
        candidates,
        &mut taken,
        &mut ranked,
        (MatchStrength::Strong, signal.reason()),
        |candidate| signal.matches(source, candidate),
    );

    if !source.tags().is_empty() {
        collect_tier(
            candidates,
            &mut taken,
            &mut ranked,
            (MatchStrength::Medium, MatchReason::Tag),
            |candidate| source.shares_tag_with(candidate),
        );
    }

    if options.include_weak_matches {
        let source_category = normalize_category(source.category());
        collect_tier(
            candidates,
            &mut taken,
            &mut ranked,
            (MatchStrength::Weak, MatchReason::Category),
            |candidate| normalize_category(candidate.category()) == source_category,
        );
    }

    ranked.truncate(options.max_items);
    ranked
}

fn collect_tier<'a, T: ContentItem>(
    candidates: &'a [T],
    taken: &mut HashSet<&'a ContentId>,
    ranked: &mut Vec<Recommendation>,
    (strength, reason): (MatchStrength, MatchReason),
    qualifies: impl Fn(&dyn ContentItem) -> bool,
) {
    for candidate in candidates {
        if taken.contains(candidate.id()) || !qualifies(candidate as &dyn ContentItem) {
            continue;
        }
        taken.insert(candidate.id());
        ranked.push(Recommendation::from_item(candidate, strength, reason));
    }
}
