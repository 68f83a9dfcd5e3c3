//! Reactive recommendation query for presentation code

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, CatalogProvider, CatalogSet, CatalogSnapshot};
use crate::domain::content::{Lesson, Tool};

use super::engine::RecommendationEngine;
use super::types::{Recommendation, RecommendationRequest};

/// What a view renders: the list, plus whether the catalogs were ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsView {
    pub recommendations: Vec<Recommendation>,
    pub is_loading: bool,
}

/// Identifies the inputs a memoized result was computed from.
///
/// Catalogs are compared by allocation, not by revision alone: a provider that
/// builds a fresh snapshot per call never reports a stale hit. Holding the
/// `Arc`s keeps the old allocations alive, so an address cannot be reused by a
/// newer catalog while the memo refers to it.
#[derive(Debug, Clone)]
struct MemoKey {
    request: RecommendationRequest,
    lessons: Arc<Catalog<Lesson>>,
    tools: Arc<Catalog<Tool>>,
    lessons_revision: u64,
    tools_revision: u64,
}

impl MemoKey {
    fn new(
        request: &RecommendationRequest,
        lessons: &CatalogSnapshot<Lesson>,
        tools: &CatalogSnapshot<Tool>,
    ) -> Self {
        Self {
            request: request.clone(),
            lessons: Arc::clone(&lessons.catalog),
            tools: Arc::clone(&tools.catalog),
            lessons_revision: lessons.revision,
            tools_revision: tools.revision,
        }
    }

    fn matches(
        &self,
        request: &RecommendationRequest,
        lessons: &CatalogSnapshot<Lesson>,
        tools: &CatalogSnapshot<Tool>,
    ) -> bool {
        self.request == *request
            && Arc::ptr_eq(&self.lessons, &lessons.catalog)
            && Arc::ptr_eq(&self.tools, &tools.catalog)
            && self.lessons_revision == lessons.revision
            && self.tools_revision == tools.revision
    }
}

/// Query bound to a catalog provider.
///
/// Recomputes whenever the request changes or either catalog is replaced
/// (a different `Arc` or revision) and otherwise hands back the previous
/// result. The memo only ever holds output computed from fully loaded
/// catalogs.
#[derive(Debug)]
pub struct RecommendationQuery<P> {
    provider: P,
    engine: RecommendationEngine,
    memo: Option<(MemoKey, Vec<Recommendation>)>,
}

impl<P: CatalogProvider> RecommendationQuery<P> {
    pub fn new(provider: P) -> Self {
        Self::with_engine(provider, RecommendationEngine::new())
    }

    pub fn with_engine(provider: P, engine: RecommendationEngine) -> Self {
        Self { provider, engine, memo: None }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn use_recommendations(&mut self, request: &RecommendationRequest) -> RecommendationsView {
        let lessons = self.provider.lessons();
        let tools = self.provider.tools();

        if lessons.is_loading || tools.is_loading {
            return RecommendationsView { recommendations: Vec::new(), is_loading: true };
        }

        if let Some((cached_key, cached)) = &self.memo {
            if cached_key.matches(request, &lessons, &tools) {
                debug!(
                    event_name = "recommendations.query.cache_hit",
                    source_id = %request.source_id,
                    "reusing memoized recommendations"
                );
                return RecommendationsView { recommendations: cached.clone(), is_loading: false };
            }
        }

        let recommendations = self.engine.recommend(request, CatalogSet::new(&lessons, &tools));
        self.memo = Some((MemoKey::new(request, &lessons, &tools), recommendations.clone()));

        RecommendationsView { recommendations, is_loading: false }
    }

    /// Drop the memoized result
    pub fn clear_cache(&mut self) {
        self.memo = None;
    }
}
