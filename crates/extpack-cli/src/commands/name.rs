//! Name command implementation.

use crate::cli::NameArgs;
use crate::error::add_package_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use extpack_core::archive_file_name;
use extpack_core::load_manifest;

pub fn execute(args: &NameArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest = add_package_context(load_manifest(&args.source_dir()))?;
    formatter.format_archive_name(&archive_file_name(&manifest))
}
