//! End-to-end packaging: manifest, rules, staging, archive.

use crate::IgnoreRules;
use crate::NoopProgress;
use crate::PackageConfig;
use crate::PackageReport;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::make_zip_with_progress;
use crate::load_manifest;
use crate::stage::stage_files_with_progress;
use tracing::info;

/// Runs a full packaging pass described by `config`.
///
/// Steps run in order and the first failure aborts the run:
///
/// 1. load and sanitize the manifest (nothing is touched if this fails)
/// 2. load ignore rules (a missing rules file means no rules)
/// 3. reset and populate the staging directory
/// 4. build the archive in the output directory
///
/// Concurrent runs sharing a staging or output directory are unsupported.
///
/// # Examples
///
/// ```no_run
/// use extpack_core::PackageConfig;
/// use extpack_core::package;
///
/// let report = package(&PackageConfig::for_project("."))?;
/// println!("{}", report.archive_path().display());
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn package(config: &PackageConfig) -> Result<PackageReport> {
    package_with_progress(config, &mut NoopProgress, &mut NoopProgress)
}

/// Same as [`package`], with separate progress sinks for staging and
/// archiving.
pub fn package_with_progress(
    config: &PackageConfig,
    stage_progress: &mut dyn ProgressCallback,
    archive_progress: &mut dyn ProgressCallback,
) -> Result<PackageReport> {
    config.validate()?;

    let manifest = load_manifest(&config.source_dir)?;
    let rules = match &config.ignore_file {
        Some(path) => IgnoreRules::load(path)?,
        None => IgnoreRules::new(),
    };
    info!(
        source = %config.source_dir.display(),
        name = manifest.name(),
        version = manifest.archive_version(),
        patterns = rules.len(),
        "packaging"
    );

    let stage = stage_files_with_progress(
        &manifest,
        &rules,
        &config.source_dir,
        &config.staging_dir,
        stage_progress,
    )?;

    let archive = make_zip_with_progress(
        &manifest,
        &config.staging_dir,
        &config.output_dir,
        config.archive,
        archive_progress,
    )?;

    Ok(PackageReport {
        name: manifest.name().to_string(),
        version: manifest.archive_version().to_string(),
        key_stripped: manifest.key_was_stripped(),
        ignore_patterns: rules.len(),
        stage,
        archive,
    })
}
