//! cai2hcl binary

use anyhow::Result;
use cai2hcl_cli::logging::{init_logging, LoggingConfig};
use cai2hcl_cli::{run, Cli};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::verbose(cli.verbose).with_format(cli.log_format))?;

    let summary = run(&cli)?;
    tracing::info!(
        "Converted {} records into {} blocks ({} errors)",
        summary.records,
        summary.blocks,
        summary.errors.len()
    );
    Ok(())
}
