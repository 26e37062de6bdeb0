//! cai2hcl command-line front end
//!
//! Reads an asset inventory export (JSON array or newline-delimited JSON),
//! converts it and writes configuration text plus an optional JSON error
//! report.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod logging;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cai2hcl_core::{build_registry, builtin_schemas, ConversionError, ConvertOptions, Converter, IamStyle};
use cai2hcl_hcl::{load_schema_file, parse_inventory};
use clap::Parser;

use crate::config::CliConfig;
use crate::logging::LogFormat;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "cai2hcl")]
#[command(version)]
#[command(about = "Convert asset inventory exports into configuration blocks", long_about = None)]
pub struct Cli {
    /// Inventory export to convert; `-` reads stdin
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write configuration text here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write collected conversion errors as JSON
    #[arg(long, value_name = "FILE")]
    pub errors_json: Option<PathBuf>,

    /// Exit non-zero if any resource failed to convert
    #[arg(long)]
    pub fail_on_error: bool,

    /// Report values that do not match their schema
    #[arg(long)]
    pub strict: bool,

    /// Worker threads for transform groups
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Shape of access-policy blocks (policy, binding, member)
    #[arg(long, value_name = "STYLE")]
    pub iam_style: Option<IamStyle>,

    /// Extra schema document (YAML or JSON) overriding built-in kinds
    #[arg(long, value_name = "FILE")]
    pub schemas: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Options after applying flags over the configuration file
    #[must_use]
    pub fn options(&self, config: &CliConfig) -> ConvertOptions {
        let mut options = config.convert.clone();
        if self.strict {
            options = options.with_strict(true);
        }
        if let Some(workers) = self.workers {
            options = options.with_max_workers(workers);
        }
        if let Some(style) = self.iam_style {
            options = options.with_iam_style(style);
        }
        options
    }

    /// Schema override file, flag first
    #[must_use]
    pub fn schemas_path<'a>(&'a self, config: &'a CliConfig) -> Option<&'a Path> {
        self.schemas.as_deref().or(config.schemas.as_deref())
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Records read from the input
    pub records: usize,
    /// Blocks written
    pub blocks: usize,
    /// Collected conversion errors
    pub errors: Vec<ConversionError>,
}

/// Convert the input named by `cli` and write the outputs
///
/// # Errors
///
/// Fails on I/O, configuration, ingest and serialization errors, and with
/// `--fail-on-error` when any conversion error was collected (after the
/// outputs are written).
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let options = cli.options(&config);

    let mut schemas = builtin_schemas();
    if let Some(path) = cli.schemas_path(&config) {
        let extra = load_schema_file(path)
            .with_context(|| format!("Failed to load schemas: {}", path.display()))?;
        tracing::info!("Loaded {} schema kinds from {}", extra.len(), path.display());
        schemas.overlay(extra);
    }

    let text = read_input(&cli.input)?;
    let records = parse_inventory(&text)
        .with_context(|| format!("Failed to parse inventory: {}", cli.input.display()))?;

    let converter = Converter::new(Arc::new(build_registry()), Arc::new(schemas)).with_options(options);
    let conversion = converter.convert(&records)?;
    let rendered = conversion.render()?;

    match &cli.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => print!("{rendered}"),
    }
    if let Some(path) = &cli.errors_json {
        let report = serde_json::to_string_pretty(&conversion.errors)?;
        std::fs::write(path, report + "\n")
            .with_context(|| format!("Failed to write error report: {}", path.display()))?;
    }

    let summary = RunSummary {
        records: records.len(),
        blocks: conversion.blocks.len(),
        errors: conversion.errors,
    };
    if cli.fail_on_error && !summary.errors.is_empty() {
        bail!("{} resources failed to convert", summary.errors.len());
    }
    Ok(summary)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read input: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["cai2hcl", "in.json", "--workers", "4", "--iam-style", "binding"]).unwrap();
        let config = CliConfig::parse("[convert]\nstrict = true\nmax_workers = 2\n").unwrap();
        let options = cli.options(&config);
        assert!(options.strict);
        assert_eq!(options.max_workers, 4);
        assert_eq!(options.iam_style, IamStyle::Binding);
    }

    #[test]
    fn schemas_flag_wins() {
        let config = CliConfig::parse("schemas = \"from-config.yaml\"\n").unwrap();
        let plain = Cli::try_parse_from(["cai2hcl", "in.json"]).unwrap();
        assert_eq!(plain.schemas_path(&config), Some(Path::new("from-config.yaml")));
        let flagged = Cli::try_parse_from(["cai2hcl", "in.json", "--schemas", "flag.yaml"]).unwrap();
        assert_eq!(flagged.schemas_path(&config), Some(Path::new("flag.yaml")));
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(Cli::try_parse_from(["cai2hcl", "in.json", "--iam-style", "owner"]).is_err());
    }

    #[test]
    fn log_format_flag() {
        let cli = Cli::try_parse_from(["cai2hcl", "-", "--log-format", "json", "-v"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.verbose);
        assert_eq!(cli.input, PathBuf::from("-"));
    }
}
