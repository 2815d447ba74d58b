//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use extpack_core::PackageConfig;
use extpack_core::archive::DEFAULT_COMPRESSION_LEVEL;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage an extension and build its store archive
    Package(PackageArgs),
    /// Print the archive file name the manifest would produce
    Name(NameArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct PackageArgs {
    /// Project root (default: current directory)
    #[arg(value_name = "PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Extension source directory (default: <PROJECT_DIR>/src/app)
    #[arg(long, value_name = "DIR", env = "EXT_DIR")]
    pub source: Option<PathBuf>,

    /// Ignore rules file (default: <PROJECT_DIR>/.crxignore)
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Output directory for the archive (default: <PROJECT_DIR>/dist)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Staging directory, wiped on every run (default: <OUT_DIR>/pack)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Compression level (1-9)
    #[arg(
        short = 'l',
        long,
        default_value_t = DEFAULT_COMPRESSION_LEVEL,
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    pub compression_level: u8,
}

impl PackageArgs {
    /// Resolves the flags against the conventional project layout.
    pub fn to_config(&self) -> PackageConfig {
        let mut config = PackageConfig::for_project(&self.project_dir)
            .with_compression_level(self.compression_level);

        if let Some(source) = &self.source {
            config = config.with_source_dir(source);
        }
        if let Some(ignore_file) = &self.ignore_file {
            config = config.with_ignore_file(Some(ignore_file.clone()));
        }
        if let Some(out_dir) = &self.out_dir {
            config = config
                .with_staging_dir(out_dir.join(extpack_core::config::DEFAULT_STAGING_DIR_NAME))
                .with_output_dir(out_dir);
        }
        if let Some(staging_dir) = &self.staging_dir {
            config = config.with_staging_dir(staging_dir);
        }

        config
    }
}

#[derive(clap::Args)]
pub struct NameArgs {
    /// Project root (default: current directory)
    #[arg(value_name = "PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Extension source directory (default: <PROJECT_DIR>/src/app)
    #[arg(long, value_name = "DIR", env = "EXT_DIR")]
    pub source: Option<PathBuf>,
}

impl NameArgs {
    pub fn source_dir(&self) -> PathBuf {
        self.source.clone().unwrap_or_else(|| {
            PackageConfig::for_project(&self.project_dir).source_dir
        })
    }
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
