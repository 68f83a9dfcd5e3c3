pub mod config;
pub mod doctor;
pub mod recommend;

use serde::Serialize;
use serde_json::Value;
use syllabus_core::config::AppConfig;
use syllabus_core::{read_catalog_file, CatalogError, InMemoryCatalogProvider, Lesson, Tool};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Reads both catalog files named by `config` and publishes them.
pub fn load_catalogs(config: &AppConfig) -> Result<InMemoryCatalogProvider, CatalogError> {
    let lessons = read_catalog_file::<Lesson>(&config.catalog.lessons_path)?;
    let tools = read_catalog_file::<Tool>(&config.catalog.tools_path)?;
    Ok(InMemoryCatalogProvider::with_catalogs(lessons.into_items(), tools.into_items()))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
