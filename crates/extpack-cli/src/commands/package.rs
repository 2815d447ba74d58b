//! Package command implementation.

use crate::cli::PackageArgs;
use crate::error::add_package_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use extpack_core::NoopProgress;
use extpack_core::package_with_progress;
use tracing::debug;

pub fn execute(args: &PackageArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let config = args.to_config();
    debug!(?config, "resolved package configuration");

    // Use progress bars if TTY is detected and output is not suppressed
    let report = if !quiet && CliProgress::should_show() {
        let mut stage_progress = CliProgress::new("Staging");
        let mut archive_progress = CliProgress::new("Archiving");
        add_package_context(package_with_progress(
            &config,
            &mut stage_progress,
            &mut archive_progress,
        ))?
    } else {
        add_package_context(package_with_progress(
            &config,
            &mut NoopProgress,
            &mut NoopProgress,
        ))?
    };

    formatter.format_package_result(&report)?;

    Ok(())
}
