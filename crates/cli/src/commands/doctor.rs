use serde::Serialize;
use syllabus_core::config::{AppConfig, LoadOptions};
use syllabus_core::{
    read_catalog_file, Catalog, CatalogError, CatalogSet, CatalogSnapshot, ContentItem,
    DanglingRelation, Lesson, Tool,
};

/// Dangling relations listed individually before the report summarizes the rest.
const MAX_LISTED_RELATIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            let (lessons_check, lessons) = check_catalog::<Lesson>(
                "lessons_catalog",
                read_catalog_file(&config.catalog.lessons_path),
            );
            let (tools_check, tools) = check_catalog::<Tool>(
                "tools_catalog",
                read_catalog_file(&config.catalog.tools_path),
            );
            checks.push(lessons_check);
            checks.push(tools_check);

            match (lessons, tools) {
                (Some(lessons), Some(tools)) => checks.push(check_relations(lessons, tools)),
                _ => checks.push(skipped("relation_integrity", "a catalog did not load")),
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            let reason = "configuration did not load";
            checks.push(skipped("lessons_catalog", reason));
            checks.push(skipped("tools_catalog", reason));
            checks.push(skipped("relation_integrity", reason));
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if any_fail {
        CheckStatus::Fail
    } else if all_pass {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };
    let summary = match overall_status {
        CheckStatus::Pass => "doctor: all catalog checks passed".to_string(),
        CheckStatus::Warn => "doctor: catalogs usable with warnings".to_string(),
        _ => "doctor: one or more catalog checks failed".to_string(),
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog<T: ContentItem>(
    name: &'static str,
    loaded: Result<Catalog<T>, CatalogError>,
) -> (DoctorCheck, Option<Catalog<T>>) {
    match loaded {
        Ok(catalog) => {
            let check = DoctorCheck {
                name,
                status: if catalog.is_empty() { CheckStatus::Warn } else { CheckStatus::Pass },
                details: format!("{} item(s) loaded", catalog.len()),
            };
            (check, Some(catalog))
        }
        Err(error) => {
            (DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() }, None)
        }
    }
}

fn check_relations(lessons: Catalog<Lesson>, tools: Catalog<Tool>) -> DoctorCheck {
    let lessons = CatalogSnapshot::loaded(lessons.into_items());
    let tools = CatalogSnapshot::loaded(tools.into_items());
    let dangling = CatalogSet::new(&lessons, &tools).dangling_relations();

    if dangling.is_empty() {
        return DoctorCheck {
            name: "relation_integrity",
            status: CheckStatus::Pass,
            details: "every relatedIds entry resolves".to_string(),
        };
    }

    DoctorCheck {
        name: "relation_integrity",
        status: CheckStatus::Warn,
        details: describe_dangling(&dangling),
    }
}

fn describe_dangling(dangling: &[DanglingRelation]) -> String {
    let mut listed = dangling
        .iter()
        .take(MAX_LISTED_RELATIONS)
        .map(|relation| {
            format!("{} {} -> {}", relation.kind, relation.item_id, relation.missing_id)
        })
        .collect::<Vec<_>>()
        .join(", ");
    if dangling.len() > MAX_LISTED_RELATIONS {
        listed.push_str(&format!(" (+{} more)", dangling.len() - MAX_LISTED_RELATIONS));
    }
    format!("{} dangling relation(s): {listed}", dangling.len())
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
