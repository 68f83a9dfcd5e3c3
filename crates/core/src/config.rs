use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommendations::{RecommendationOptions, DEFAULT_MAX_ITEMS};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub recommendations: RecommendationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub lessons_path: PathBuf,
    pub tools_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct RecommendationsConfig {
    pub max_items: usize,
    pub include_weak_matches: bool,
}

impl RecommendationsConfig {
    pub fn options(&self) -> RecommendationOptions {
        RecommendationOptions {
            max_items: self.max_items,
            include_weak_matches: self.include_weak_matches,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub lessons_path: Option<PathBuf>,
    pub tools_path: Option<PathBuf>,
    pub max_items: Option<usize>,
    pub include_weak_matches: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                lessons_path: PathBuf::from("data/lessons.json"),
                tools_path: PathBuf::from("data/tools.json"),
            },
            recommendations: RecommendationsConfig {
                max_items: DEFAULT_MAX_ITEMS,
                include_weak_matches: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("syllabus.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(lessons_path) = catalog.lessons_path {
                self.catalog.lessons_path = lessons_path;
            }
            if let Some(tools_path) = catalog.tools_path {
                self.catalog.tools_path = tools_path;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            if let Some(max_items) = recommendations.max_items {
                self.recommendations.max_items = max_items;
            }
            if let Some(include_weak_matches) = recommendations.include_weak_matches {
                self.recommendations.include_weak_matches = include_weak_matches;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SYLLABUS_CATALOG_LESSONS_PATH") {
            self.catalog.lessons_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("SYLLABUS_CATALOG_TOOLS_PATH") {
            self.catalog.tools_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("SYLLABUS_RECOMMENDATIONS_MAX_ITEMS") {
            self.recommendations.max_items =
                parse_usize("SYLLABUS_RECOMMENDATIONS_MAX_ITEMS", &value)?;
        }
        if let Some(value) = read_env("SYLLABUS_RECOMMENDATIONS_INCLUDE_WEAK_MATCHES") {
            self.recommendations.include_weak_matches =
                parse_bool("SYLLABUS_RECOMMENDATIONS_INCLUDE_WEAK_MATCHES", &value)?;
        }

        let log_level =
            read_env("SYLLABUS_LOGGING_LEVEL").or_else(|| read_env("SYLLABUS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SYLLABUS_LOGGING_FORMAT").or_else(|| read_env("SYLLABUS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(lessons_path) = overrides.lessons_path {
            self.catalog.lessons_path = lessons_path;
        }
        if let Some(tools_path) = overrides.tools_path {
            self.catalog.tools_path = tools_path;
        }
        if let Some(max_items) = overrides.max_items {
            self.recommendations.max_items = max_items;
        }
        if let Some(include_weak_matches) = overrides.include_weak_matches {
            self.recommendations.include_weak_matches = include_weak_matches;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("syllabus.toml"), PathBuf::from("config/syllabus.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.lessons_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.lessons_path must not be empty".to_string()));
    }
    if catalog.tools_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.tools_path must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    recommendations: Option<RecommendationsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    lessons_path: Option<PathBuf>,
    tools_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationsPatch {
    max_items: Option<usize>,
    include_weak_matches: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
