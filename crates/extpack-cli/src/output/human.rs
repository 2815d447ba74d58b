//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use extpack_core::PackageReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn summary_lines(&self, report: &PackageReport) -> Vec<String> {
        let mut lines = vec![
            format!("  Extension:        {} {}", report.name, report.version),
            format!(
                "  Files staged:     {}",
                Self::format_number(report.stage.files_staged)
            ),
            format!(
                "  Files ignored:    {}",
                Self::format_number(report.stage.files_ignored)
            ),
            format!(
                "  Total size:       {}",
                Self::format_size(report.archive.bytes_written)
            ),
            format!(
                "  Archive size:     {}",
                Self::format_size(report.archive.bytes_compressed)
            ),
        ];

        if report.key_stripped {
            lines.push("  Manifest key:     stripped".to_string());
        }

        if self.verbose {
            lines.push(format!(
                "  Compression:      {:.1}%",
                report.archive.compression_percentage()
            ));
            lines.push(format!("  Ignore patterns:  {}", report.ignore_patterns));
            lines.push(format!("  Duration:         {:?}", report.duration()));
            for path in &report.stage.ignored_paths {
                lines.push(format!("    ignored: {}", path.display()));
            }
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let path = report.archive_path().display();
        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Archive created: {path}",
                style("✓").green().bold()
            ));
        } else {
            let _ = self.term.write_line(&format!("Archive created: {path}"));
        }

        let _ = self.term.write_line("");
        for line in self.summary_lines(report) {
            let _ = self.term.write_line(&line);
        }

        Ok(())
    }

    fn format_archive_name(&self, name: &str) -> Result<()> {
        // The name is the whole result, so it is printed even in quiet mode.
        let _ = self.term.write_line(name);
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
