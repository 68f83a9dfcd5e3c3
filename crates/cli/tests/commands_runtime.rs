use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use syllabus_cli::commands::{doctor, recommend, recommend::RecommendArgs};
use syllabus_core::ContentKind;
use tempfile::TempDir;

const LESSONS: &str = r#"[
  {"id": "L1", "title": "Coaching Conversations", "category": "Leadership", "module": "M1",
   "tags": ["coaching"], "relatedIds": ["T2"]},
  {"id": "L2", "title": "Giving Feedback", "category": "Leadership", "module": "M1"}
]"#;

const TOOLS: &str = r#"[
  {"id": "T4", "title": "Stakeholder Map", "category": "Leadership"},
  {"id": "T3", "title": "GROW Worksheet", "category": "Framework", "tags": ["coaching"]},
  {"id": "T2", "title": "Feedback Canvas", "category": "Framework", "tags": ["coaching"],
   "relatedIds": ["L1", "L9"]}
]"#;

fn args(source_type: ContentKind, source_id: &str, target_type: ContentKind) -> RecommendArgs {
    RecommendArgs {
        source_type,
        source_id: source_id.to_string(),
        target_type,
        max_items: None,
        no_weak: false,
    }
}

#[test]
fn recommend_returns_ranked_tools_for_lesson() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let result = recommend::run(RecommendArgs {
            max_items: Some(2),
            ..args(ContentKind::Lesson, "L1", ContentKind::Tool)
        });
        assert_eq!(result.exit_code, 0, "expected successful recommend run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["isLoading"], false);

        let recommendations = payload["data"]["recommendations"]
            .as_array()
            .expect("recommendations should be an array");
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0]["id"], "T2");
        assert_eq!(recommendations[0]["strength"], "strong");
        assert_eq!(recommendations[0]["matchReason"], "direct");
        assert_eq!(recommendations[1]["id"], "T3");
        assert_eq!(recommendations[1]["matchReason"], "tag");
    });
}

#[test]
fn recommend_uses_configured_default_cap() {
    with_catalogs(LESSONS, TOOLS, &[("SYLLABUS_RECOMMENDATIONS_MAX_ITEMS", "1")], || {
        let result = recommend::run(args(ContentKind::Lesson, "L1", ContentKind::Tool));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["maxItems"], 1);
        assert_eq!(payload["data"]["recommendations"].as_array().map(Vec::len), Some(1));
    });
}

#[test]
fn recommend_without_weak_matches_drops_category_only_items() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let result = recommend::run(RecommendArgs {
            max_items: Some(10),
            no_weak: true,
            ..args(ContentKind::Lesson, "L1", ContentKind::Tool)
        });
        let payload = parse_payload(&result.output);

        let ids: Vec<&str> = payload["data"]["recommendations"]
            .as_array()
            .expect("recommendations should be an array")
            .iter()
            .filter_map(|item| item["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["T2", "T3"]);
    });
}

#[test]
fn recommend_for_unknown_source_is_empty_success() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let result = recommend::run(args(ContentKind::Lesson, "L404", ContentKind::Tool));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["recommendations"], Value::Array(Vec::new()));
        assert!(payload["message"].as_str().unwrap_or_default().contains("not found"));
    });
}

#[test]
fn recommend_rejects_tool_to_tool() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let result = recommend::run(args(ContentKind::Tool, "T2", ContentKind::Tool));
        assert_eq!(result.exit_code, 4, "expected bad request exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
    });
}

#[test]
fn recommend_reports_missing_catalog_file() {
    with_env(
        &[
            ("SYLLABUS_CATALOG_LESSONS_PATH", "/nonexistent/lessons.json"),
            ("SYLLABUS_CATALOG_TOOLS_PATH", "/nonexistent/tools.json"),
        ],
        || {
            let result = recommend::run(args(ContentKind::Lesson, "L1", ContentKind::Tool));
            assert_eq!(result.exit_code, 3, "expected catalog failure exit code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "catalog_unavailable");
        },
    );
}

#[test]
fn recommend_reports_invalid_config() {
    with_env(&[("SYLLABUS_RECOMMENDATIONS_MAX_ITEMS", "many")], || {
        let result = recommend::run(args(ContentKind::Lesson, "L1", ContentKind::Tool));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"]
            .as_str()
            .unwrap_or_default()
            .contains("SYLLABUS_RECOMMENDATIONS_MAX_ITEMS"));
    });
}

#[test]
fn recommend_accepts_caps_larger_than_the_catalog() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let result = recommend::run(RecommendArgs {
            max_items: Some(100),
            ..args(ContentKind::Lesson, "L1", ContentKind::Tool)
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["maxItems"], 100);
        assert_eq!(payload["data"]["recommendations"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_flags_dangling_relations_as_warning() {
    with_catalogs(LESSONS, TOOLS, &[], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "warn");

        let checks = report["checks"].as_array().expect("checks should be an array");
        let relations = checks
            .iter()
            .find(|check| check["name"] == "relation_integrity")
            .expect("relation check should be present");
        assert_eq!(relations["status"], "warn");
        assert!(relations["details"].as_str().unwrap_or_default().contains("tool T2 -> L9"));
    });
}

#[test]
fn doctor_fails_on_duplicate_ids() {
    let duplicated = r#"[
  {"id": "L1", "title": "One", "category": "Leadership"},
  {"id": "L1", "title": "Two", "category": "Leadership"}
]"#;
    with_catalogs(duplicated, "[]", &[], || {
        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "fail");

        let human = doctor::run(false);
        assert!(human.contains("[fail] lessons_catalog"));
        assert!(human.contains("duplicate id `L1`"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn write_catalog(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("catalog fixture should be writable");
    path.display().to_string()
}

fn with_catalogs(lessons: &str, tools: &str, extra: &[(&str, &str)], test_fn: impl FnOnce()) {
    let dir = TempDir::new().expect("temp dir should be created");
    let lessons_path = write_catalog(dir.path(), "lessons.json", lessons);
    let tools_path = write_catalog(dir.path(), "tools.json", tools);

    let mut vars = vec![
        ("SYLLABUS_CATALOG_LESSONS_PATH", lessons_path.as_str()),
        ("SYLLABUS_CATALOG_TOOLS_PATH", tools_path.as_str()),
    ];
    vars.extend_from_slice(extra);

    with_env(&vars, test_fn);
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SYLLABUS_CATALOG_LESSONS_PATH",
        "SYLLABUS_CATALOG_TOOLS_PATH",
        "SYLLABUS_RECOMMENDATIONS_MAX_ITEMS",
        "SYLLABUS_RECOMMENDATIONS_INCLUDE_WEAK_MATCHES",
        "SYLLABUS_LOGGING_LEVEL",
        "SYLLABUS_LOGGING_FORMAT",
        "SYLLABUS_LOG_LEVEL",
        "SYLLABUS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
