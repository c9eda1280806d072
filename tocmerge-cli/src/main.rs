//! tocmerge - Concatenate PDF files and merge their bookmarks.

mod cli;

use clap::Parser;
use std::process;

use crate::cli::Cli;
use tocmerge::config::{Config, OverwriteMode};
use tocmerge::error::TocMergeError;
use tocmerge::merge::{self, MergeRun};
use tocmerge::output::{
    OutputFormatter, display_failed_merge, display_merge_summary, failure_json, summary_json,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Route library logging to stderr. `RUST_LOG` overrides the flags.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet || cli.json {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<(), TocMergeError> {
    cli.validate()?;

    let all_inputs = cli.get_all_inputs().await?;
    let config = cli.to_config(all_inputs)?;
    let formatter = OutputFormatter::from_config(&config);

    for duplicate in &config.duplicates {
        formatter.warning(&format!(
            "Ignoring repeated input: {}",
            duplicate.display()
        ));
    }

    formatter.debug(&format!("{} v{}", tocmerge::NAME, tocmerge::VERSION));
    formatter.detail("Inputs", &config.inputs.len().to_string());
    formatter.detail("Output", &config.output.display().to_string());

    if !config.dry_run {
        handle_output_overwrite(&config, &formatter)?;
    }

    formatter.info(if config.dry_run {
        "Planning merge..."
    } else {
        "Merging documents..."
    });

    let MergeRun { summary, written } = execute(config.clone()).await?;

    let stats = match written {
        Ok(stats) => stats,
        Err(err) => {
            // Still say what happened to each input before failing.
            if config.json {
                print_json(&failure_json(&summary, &err))?;
            } else {
                display_failed_merge(&formatter, &summary);
            }
            return Err(err);
        }
    };

    if config.json {
        print_json(&summary_json(&summary, stats.as_ref()))?;
    } else {
        display_merge_summary(&formatter, &summary, stats.as_ref());
    }

    if config.dry_run && !summary.has_merged_files() {
        return Err(TocMergeError::NoFilesMerged {
            skipped: summary.skipped_count(),
            failed: summary.failed_count(),
        });
    }

    Ok(())
}

/// Run the synchronous merge off the async runtime.
async fn execute(config: Config) -> Result<MergeRun, TocMergeError> {
    tokio::task::spawn_blocking(move || merge::run(&config))
        .await
        .map_err(|err| TocMergeError::merge_failed(format!("Merge task failed: {err}")))
}

fn print_json(report: &serde_json::Value) -> Result<(), TocMergeError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| TocMergeError::other(format!("Failed to serialize summary: {err}")))?;
    println!("{json}");
    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), TocMergeError> {
    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(TocMergeError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask
            if config.quiet || config.json {
                return Err(TocMergeError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| TocMergeError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(TocMergeError::Cancelled)
            }
        }
    }
}
