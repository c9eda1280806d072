//! CLI argument parsing for tocmerge.
//!
//! This module defines the command-line interface using `clap` and turns
//! the parsed arguments into a [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge_cli::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging {} inputs", cli.inputs.len());
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use tocmerge::config::{CompressionLevel, Config, OverwriteMode, resolve_output_path_now};
use tocmerge::error::{Result, TocMergeError};
use tocmerge::merge::WrapperPolicy;
use tocmerge::utils::collect_paths_for_patterns;

/// Concatenate PDF files and merge their bookmarks into one outline.
///
/// Each input's bookmarks are moved to the pages they land on in the
/// merged document. An input without a bookmark on its first page gets a
/// bookmark named after the file, with its own bookmarks nested below.
#[derive(Parser, Debug)]
#[command(name = "tocmerge")]
#[command(version)]
#[command(about = "Concatenate PDF files and merge their bookmarks", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files to merge (in order)
    ///
    /// Glob patterns are expanded. Files are merged in the order given,
    /// repeated files are merged once.
    ///
    /// Examples:
    ///   tocmerge intro.pdf body.pdf -o book.pdf
    ///   tocmerge "chapters/*.pdf" -o book.pdf
    #[arg(value_name = "FILE", required_unless_present = "input_list")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Defaults to merged_output_<timestamp>.pdf. A missing .pdf
    /// extension is added.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for the output file when --output is relative or absent
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Read input file list from a file (one path per line)
    ///
    /// Lines starting with '#' are ignored. Use '-' to read from stdin.
    /// Listed files are merged after the ones given on the command line.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Dry run - show the merged bookmark tree without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show the bookmark tree and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: write objects as copied
    /// - standard: compress streams (default)
    /// - maximum: also drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// When to nest an input's bookmarks under a bookmark named after it
    ///
    /// - auto: only when the input has no bookmark on its first page
    /// - always: for every input
    /// - never: keep each input's bookmarks at their own levels
    #[arg(long, value_name = "MODE", default_value = "auto")]
    #[arg(value_parser = ["auto", "always", "never"])]
    pub wrap: String,

    /// Ignore the inputs' own bookmarks
    #[arg(long)]
    pub no_source_bookmarks: bool,

    /// Print the merge summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Validate CLI arguments before any file is read.
    ///
    /// # Errors
    ///
    /// Returns an error if no inputs were given or an enumerated value is
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(TocMergeError::invalid_config("No input files specified"));
        }

        CompressionLevel::from_str(&self.compression)?;
        WrapperPolicy::from_str(&self.wrap)?;

        Ok(())
    }

    /// Convert CLI arguments into a validated Config.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Expanded input paths, see [`Cli::get_all_inputs`]
    ///
    /// # Errors
    ///
    /// Returns an error if an option value is invalid or the configuration
    /// fails validation.
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let output = resolve_output_path_now(self.output.as_deref(), self.output_dir.as_deref());
        let mut config = Config::new(inputs, output);

        config.compression = CompressionLevel::from_str(&self.compression)?;
        config.wrapper_policy = WrapperPolicy::from_str(&self.wrap)?;
        config.keep_source_bookmarks = !self.no_source_bookmarks;
        config.dry_run = self.dry_run;
        config.verbose = self.verbose;
        config.quiet = self.quiet;
        config.json = self.json;
        config.overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        config.validate().map_err(|e| {
            TocMergeError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Get all input paths, with glob patterns expanded and the input
    /// list appended.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid, the input list cannot be
    /// read, or no inputs remain.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = collect_paths_for_patterns(&self.inputs)?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        if all_inputs.is_empty() {
            return Err(TocMergeError::NoFilesToMerge);
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a file, or from stdin when `path` is `-`.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    if path.as_os_str() == "-" {
        return parse_input_list(BufReader::new(tokio::io::stdin()), path).await;
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| TocMergeError::FailedToReadInputList {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_input_list(BufReader::new(file), path).await
}

/// Parse one path per line, skipping blank lines and `#` comments.
async fn parse_input_list<R>(reader: R, path: &Path) -> Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut paths = Vec::new();
    let mut line_number = 0;

    while let Some(line) =
        lines
            .next_line()
            .await
            .map_err(|e| TocMergeError::FailedToReadInputList {
                path: path.to_path_buf(),
                source: e,
            })?
    {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(TocMergeError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
