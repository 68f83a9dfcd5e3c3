//! Strong-tier strategies keyed by catalog pairing

use crate::domain::content::{ContentItem, ContentKind};
use crate::errors::DomainError;

use super::types::MatchReason;

/// Source and target catalog of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    pub source: ContentKind,
    pub target: ContentKind,
}

impl TypePair {
    /// Builds a pairing, rejecting combinations the built-in table has no
    /// strategy for.
    pub fn new(source: ContentKind, target: ContentKind) -> Result<Self, DomainError> {
        let pair = Self { source, target };
        if StrongSignal::for_pair(STRATEGY_TABLE, pair).is_none() {
            return Err(DomainError::UnsupportedPairing { from: source, to: target });
        }
        Ok(pair)
    }

    pub const fn unchecked(source: ContentKind, target: ContentKind) -> Self {
        Self { source, target }
    }
}

/// What qualifies a candidate for the strong tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrongSignal {
    /// Candidate id appears in the source's related ids.
    DirectRelation,
    /// Candidate shares the source's grouping key.
    SharedModule,
}

impl StrongSignal {
    pub fn reason(&self) -> MatchReason {
        match self {
            StrongSignal::DirectRelation => MatchReason::Direct,
            StrongSignal::SharedModule => MatchReason::Module,
        }
    }

    pub fn matches(&self, source: &dyn ContentItem, candidate: &dyn ContentItem) -> bool {
        match self {
            StrongSignal::DirectRelation => source.is_related_to(candidate),
            StrongSignal::SharedModule => match (source.grouping_key(), candidate.grouping_key()) {
                (Some(source_key), Some(candidate_key)) => source_key == candidate_key,
                _ => false,
            },
        }
    }

    pub fn for_pair(table: &[StrategyEntry], pair: TypePair) -> Option<StrongSignal> {
        table.iter().find(|entry| entry.pair == pair).map(|entry| entry.signal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyEntry {
    pub pair: TypePair,
    pub signal: StrongSignal,
}

/// Supported pairings. tool -> tool has no entry and yields no recommendations.
pub const STRATEGY_TABLE: &[StrategyEntry] = &[
    StrategyEntry {
        pair: TypePair::unchecked(ContentKind::Lesson, ContentKind::Tool),
        signal: StrongSignal::DirectRelation,
    },
    StrategyEntry {
        pair: TypePair::unchecked(ContentKind::Tool, ContentKind::Lesson),
        signal: StrongSignal::DirectRelation,
    },
    StrategyEntry {
        pair: TypePair::unchecked(ContentKind::Lesson, ContentKind::Lesson),
        signal: StrongSignal::SharedModule,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::{Lesson, Tool};

    #[test]
    fn table_covers_three_pairings() {
        assert!(TypePair::new(ContentKind::Lesson, ContentKind::Tool).is_ok());
        assert!(TypePair::new(ContentKind::Tool, ContentKind::Lesson).is_ok());
        assert!(TypePair::new(ContentKind::Lesson, ContentKind::Lesson).is_ok());
    }

    #[test]
    fn tool_to_tool_is_rejected() {
        assert_eq!(
            TypePair::new(ContentKind::Tool, ContentKind::Tool),
            Err(DomainError::UnsupportedPairing { from: ContentKind::Tool, to: ContentKind::Tool })
        );
    }

    #[test]
    fn direct_relation_follows_source_related_ids() {
        let lesson = Lesson::new("L1", "Intro", "Leadership").with_related(["T2"]);
        let related = Tool::new("T2", "Canvas", "Framework");
        let unrelated = Tool::new("T3", "Matrix", "Framework").with_related(["L1"]);

        assert!(StrongSignal::DirectRelation.matches(&lesson, &related));
        // Only the source's own list counts.
        assert!(!StrongSignal::DirectRelation.matches(&lesson, &unrelated));
    }

    #[test]
    fn shared_module_requires_both_keys() {
        let source = Lesson::new("L1", "Intro", "Leadership").with_module("M1");
        let same = Lesson::new("L2", "Next", "Leadership").with_module("M1");
        let none = Lesson::new("L3", "Loose", "Leadership");

        assert!(StrongSignal::SharedModule.matches(&source, &same));
        assert!(!StrongSignal::SharedModule.matches(&source, &none));
        assert!(!StrongSignal::SharedModule.matches(&none, &none));
    }
}
