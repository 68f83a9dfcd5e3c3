pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendations;

pub use catalog::{
    read_catalog_file, Catalog, CatalogProvider, CatalogSet, CatalogSnapshot, DanglingRelation,
    InMemoryCatalogProvider,
};
pub use domain::content::{ContentId, ContentItem, ContentKind, Lesson, Tool};
pub use errors::{ApplicationError, CatalogError, DomainError, InterfaceError};
pub use recommendations::{
    recommend, MatchReason, MatchStrength, Recommendation, RecommendationEngine,
    RecommendationOptions, RecommendationQuery, RecommendationRequest, RecommendationsView,
    TypePair,
};
