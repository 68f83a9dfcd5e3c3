//! Types for the Recommendation Engine

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::content::{ContentId, ContentItem, ContentKind};

/// Knobs that bound and filter a recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecommendationOptions {
    /// Maximum number of entries returned; zero yields an empty list
    pub max_items: usize,
    /// Whether the category tier is evaluated at all
    pub include_weak_matches: bool,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        Self { max_items: super::DEFAULT_MAX_ITEMS, include_weak_matches: true }
    }
}

/// Request for recommendations related to one source item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecommendationRequest {
    /// Catalog the source item belongs to
    pub source_kind: ContentKind,
    /// Item being viewed
    pub source_id: ContentId,
    /// Catalog to search for related items
    pub target_kind: ContentKind,
    pub options: RecommendationOptions,
}

impl RecommendationRequest {
    /// Create a new request with default options
    pub fn new(
        source_kind: ContentKind,
        source_id: impl Into<String>,
        target_kind: ContentKind,
    ) -> Self {
        Self {
            source_kind,
            source_id: ContentId::new(source_id),
            target_kind,
            options: RecommendationOptions::default(),
        }
    }

    /// Replace all options at once
    pub fn with_options(mut self, options: RecommendationOptions) -> Self {
        self.options = options;
        self
    }

    /// Set max items
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.options.max_items = max_items;
        self
    }

    /// Toggle the category tier
    pub fn with_weak_matches(mut self, include: bool) -> Self {
        self.options.include_weak_matches = include;
        self
    }
}

/// Confidence tier of a match.
///
/// Variants are declared weakest first so that the derived ordering gives
/// `Strong > Medium > Weak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrength {
    Weak,
    Medium,
    Strong,
}

impl MatchStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrength::Strong => "strong",
            MatchStrength::Medium => "medium",
            MatchStrength::Weak => "weak",
        }
    }
}

impl fmt::Display for MatchStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchReason {
    /// Source lists the candidate in its related ids
    Direct,
    /// Source and candidate share at least one tag
    Tag,
    /// Source and candidate have the same category
    Category,
    /// Source and candidate belong to the same module
    Module,
}

/// One ranked output entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: ContentId,
    pub title: String,
    /// Catalog the match came from
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub strength: MatchStrength,
    pub match_reason: MatchReason,
}

impl Recommendation {
    pub fn from_item(item: &dyn ContentItem, strength: MatchStrength, match_reason: MatchReason) -> Self {
        Self {
            id: item.id().clone(),
            title: item.title().to_owned(),
            kind: item.kind(),
            strength,
            match_reason,
        }
    }
}
