use serde_json::json;
use syllabus_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use syllabus_core::{
    ApplicationError, CatalogProvider, ContentId, ContentKind, RecommendationQuery,
    RecommendationRequest, TypePair,
};
use tracing::info;

use super::{load_catalogs, CommandResult};

const COMMAND: &str = "recommend";
const CORRELATION_ID: &str = "cli-recommend";

#[derive(Debug, Clone)]
pub struct RecommendArgs {
    pub source_type: ContentKind,
    pub source_id: String,
    pub target_type: ContentKind,
    pub max_items: Option<usize>,
    pub no_weak: bool,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let overrides = ConfigOverrides {
        max_items: args.max_items,
        include_weak_matches: args.no_weak.then_some(false),
        ..ConfigOverrides::default()
    };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            let interface = ApplicationError::from(error).into_interface(CORRELATION_ID);
            return CommandResult::failure(
                COMMAND,
                interface.error_class(),
                interface.to_string(),
                2,
            );
        }
    };

    if let Err(error) = TypePair::new(args.source_type, args.target_type) {
        let interface = ApplicationError::from(error).into_interface(CORRELATION_ID);
        return CommandResult::failure(COMMAND, interface.error_class(), interface.to_string(), 4);
    }

    let provider = match load_catalogs(&config) {
        Ok(provider) => provider,
        Err(error) => {
            let interface = ApplicationError::from(error).into_interface(CORRELATION_ID);
            return CommandResult::failure(
                COMMAND,
                interface.error_class(),
                interface.to_string(),
                3,
            );
        }
    };

    let source_id = ContentId::new(args.source_id.as_str());
    let known_source = match args.source_type {
        ContentKind::Lesson => provider.lessons().catalog.contains(&source_id),
        ContentKind::Tool => provider.tools().catalog.contains(&source_id),
    };

    let request = RecommendationRequest::new(args.source_type, &args.source_id, args.target_type)
        .with_options(config.recommendations.options());
    let mut query = RecommendationQuery::new(provider);
    let view = query.use_recommendations(&request);

    info!(
        event_name = "cli.recommend.completed",
        correlation_id = CORRELATION_ID,
        source_kind = %args.source_type,
        source_id = %args.source_id,
        target_kind = %args.target_type,
        returned = view.recommendations.len(),
        "recommendations computed"
    );

    let message = if known_source {
        format!(
            "{} recommendation(s) from the {} catalog",
            view.recommendations.len(),
            args.target_type
        )
    } else {
        format!("{} `{}` not found; no recommendations", args.source_type, args.source_id)
    };

    let data = json!({
        "source": { "type": args.source_type, "id": args.source_id },
        "targetType": args.target_type,
        "maxItems": request.options.max_items,
        "includeWeakMatches": request.options.include_weak_matches,
        "isLoading": view.is_loading,
        "recommendations": view.recommendations,
    });

    CommandResult::success(COMMAND, message, Some(data))
}
