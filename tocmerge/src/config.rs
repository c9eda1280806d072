//! Configuration module for tocmerge.
//!
//! This module turns CLI arguments into a validated, normalized configuration
//! that drives a merge. It handles:
//! - Removal of duplicate inputs
//! - The default timestamped output name
//! - Validation of argument combinations
//! - Conversion into merge and write options

use anyhow::{Result, bail};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::TocMergeError;
use crate::io::WriteOptions;
use crate::merge::{MergeOptions, WrapperPolicy};

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - objects are written as they were copied.
    None,
    /// Compress streams and renumber objects.
    #[default]
    Standard,
    /// Also drop objects no page or bookmark refers to.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = TocMergeError;

    /// Parse compression level from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "none", "standard", or "maximum"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(TocMergeError::InvalidConfig {
                message: format!(
                    "Invalid compression level: {s}. Must be one of: none, standard, maximum"
                ),
            }),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths, in merge order, without duplicates.
    pub inputs: Vec<PathBuf>,

    /// Inputs that were listed more than once and dropped.
    pub duplicates: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - plan the merge without writing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print the merge summary as JSON.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// When to nest a source's bookmarks under a wrapper bookmark.
    pub wrapper_policy: WrapperPolicy,

    /// Carry each source's own bookmarks into the output.
    pub keep_source_bookmarks: bool,
}

impl Config {
    /// Create a configuration with default settings.
    ///
    /// Duplicate inputs are removed, keeping the first occurrence.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        let (inputs, duplicates) = dedup_inputs(inputs);
        Self {
            inputs,
            duplicates,
            output,
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            wrapper_policy: WrapperPolicy::default(),
            keep_source_bookmarks: true,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        for input in &self.inputs {
            if same_file(input, &self.output) {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        Ok(())
    }

    /// Options for the bookmark merger.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            wrapper_policy: self.wrapper_policy,
            keep_source_bookmarks: self.keep_source_bookmarks,
        }
    }

    /// Options for the output writer.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            compression: self.compression,
            ..WriteOptions::default()
        }
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

/// Remove repeated inputs, keeping the first occurrence.
///
/// Returns the kept inputs and the dropped duplicates.
pub fn dedup_inputs(inputs: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(inputs.len());
    let mut duplicates = Vec::new();

    for input in inputs {
        let key = input.canonicalize().unwrap_or_else(|_| input.clone());
        if seen.insert(key) {
            kept.push(input);
        } else {
            duplicates.push(input);
        }
    }

    (kept, duplicates)
}

/// Name used when no output path is given: `merged_output_<timestamp>.pdf`.
pub fn default_output_name(now: DateTime<Local>) -> String {
    format!("merged_output_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

/// Resolve the output path.
///
/// Without an explicit path the timestamped default name is used. A `.pdf`
/// extension is appended when missing, and relative paths are placed in
/// `output_dir` when one is given.
pub fn resolve_output_path(
    output: Option<&Path>,
    output_dir: Option<&Path>,
    now: DateTime<Local>,
) -> PathBuf {
    let path = match output {
        Some(path) => with_pdf_extension(path),
        None => PathBuf::from(default_output_name(now)),
    };

    match output_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

/// [`resolve_output_path`] with the current local time.
pub fn resolve_output_path_now(output: Option<&Path>, output_dir: Option<&Path>) -> PathBuf {
    resolve_output_path(output, output_dir, Local::now())
}

fn with_pdf_extension(path: &Path) -> PathBuf {
    let has_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if has_pdf {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(".pdf");
    PathBuf::from(name)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
