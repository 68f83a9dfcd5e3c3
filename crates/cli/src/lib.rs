pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use syllabus_core::config::{AppConfig, LoadOptions, LogFormat};
use syllabus_core::ContentKind;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "syllabus",
    about = "Syllabus catalog CLI",
    long_about = "Compute lesson/tool recommendations, inspect configuration, and check catalog integrity.",
    after_help = "Examples:\n  syllabus recommend --source-type lesson --source-id L1 --target-type tool\n  syllabus doctor --json\n  syllabus config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank items related to one lesson or tool and print them as JSON")]
    Recommend {
        #[arg(long, help = "Catalog of the item being viewed (lesson|tool)")]
        source_type: ContentKind,
        #[arg(long, help = "Id of the item being viewed")]
        source_id: String,
        #[arg(long, help = "Catalog to search for related items (lesson|tool)")]
        target_type: ContentKind,
        #[arg(long, help = "Maximum number of recommendations (overrides config)")]
        max_items: Option<usize>,
        #[arg(long, help = "Skip category-only matches")]
        no_weak: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Load both catalogs and report counts and relation integrity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Recommend { source_type, source_id, target_type, max_items, no_weak } => {
            commands::recommend::run(commands::recommend::RecommendArgs {
                source_type,
                source_id,
                target_type,
                max_items,
                no_weak,
            })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging() {
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
