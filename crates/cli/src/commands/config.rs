use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syllabus_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "catalog.lessons_path",
        &config.catalog.lessons_path.display().to_string(),
        source("catalog.lessons_path", &["SYLLABUS_CATALOG_LESSONS_PATH"]),
    ));
    lines.push(render_line(
        "catalog.tools_path",
        &config.catalog.tools_path.display().to_string(),
        source("catalog.tools_path", &["SYLLABUS_CATALOG_TOOLS_PATH"]),
    ));

    lines.push(render_line(
        "recommendations.max_items",
        &config.recommendations.max_items.to_string(),
        source("recommendations.max_items", &["SYLLABUS_RECOMMENDATIONS_MAX_ITEMS"]),
    ));
    lines.push(render_line(
        "recommendations.include_weak_matches",
        &config.recommendations.include_weak_matches.to_string(),
        source(
            "recommendations.include_weak_matches",
            &["SYLLABUS_RECOMMENDATIONS_INCLUDE_WEAK_MATCHES"],
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["SYLLABUS_LOGGING_LEVEL", "SYLLABUS_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SYLLABUS_LOGGING_FORMAT", "SYLLABUS_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("syllabus.toml"), PathBuf::from("config/syllabus.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
