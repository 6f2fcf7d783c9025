//! Output formatting and progress indicators
//!
//! Progress bars, status prefixes and report rendering. With `--json` every
//! command prints a single JSON document to stdout instead.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::core::builder::{BuildAction, PublishAction, RunReport, UnitReport};

/// How command output should be rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Emit JSON instead of human-readable text
    pub json: bool,
    /// Verbosity level from `-v` flags
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration from the global flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default log level for the tracing subscriber
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }

    /// Whether human-readable lines and progress bars should be shown
    pub fn human(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Create a progress bar for build steps
pub fn create_build_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} units ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// One-line rendering of a unit's outcome
pub fn format_unit(unit: &UnitReport) -> String {
    let prefix = match (&unit.build, &unit.publish) {
        (BuildAction::Failed { .. }, _) | (_, PublishAction::Failed { .. }) => status::ERROR,
        (BuildAction::Blocked, _) => status::WARNING,
        (BuildAction::Built, _) | (_, PublishAction::Uploaded | PublishAction::Linked) => {
            status::SUCCESS
        }
        _ => status::INFO,
    };

    let build = match &unit.build {
        BuildAction::Built => "built".to_string(),
        BuildAction::Skipped => "already built".to_string(),
        BuildAction::Failed { error } => format!("build failed: {error}"),
        BuildAction::Blocked => "blocked by a failed dependency".to_string(),
    };

    let publish = match &unit.publish {
        PublishAction::Uploaded => Some("uploaded".to_string()),
        PublishAction::Linked => Some("linked".to_string()),
        PublishAction::NoOp => Some("already on channel".to_string()),
        PublishAction::Disabled => Some("not published (no token)".to_string()),
        PublishAction::NotAttempted => None,
        PublishAction::Failed { error } => Some(format!("publish failed: {error}")),
    };

    match publish {
        Some(publish) => format!("{prefix} {}: {build}, {publish}", unit.basename),
        None => format!("{prefix} {}: {build}", unit.basename),
    }
}

/// Human-readable run summary
pub fn print_report(report: &RunReport) {
    for unit in &report.units {
        println!("{}", format_unit(unit));
    }
    println!(
        "\n{} units: {} built, {} already built, {} uploaded, {} linked",
        report.units.len(),
        report.built(),
        report.skipped(),
        report.uploaded(),
        report.linked()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(build: BuildAction, publish: PublishAction) -> UnitReport {
        UnitReport {
            name: "foo".to_string(),
            basename: "linux-64/foo-1.0-0.tar.bz2".to_string(),
            build,
            publish,
        }
    }

    #[test]
    fn test_log_level() {
        assert_eq!(OutputConfig::new(false, false, 0).log_level(), tracing::Level::WARN);
        assert_eq!(OutputConfig::new(false, false, 1).log_level(), tracing::Level::INFO);
        assert_eq!(OutputConfig::new(false, false, 3).log_level(), tracing::Level::DEBUG);
        assert_eq!(OutputConfig::new(true, false, 2).log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_human_output() {
        assert!(OutputConfig::default().human());
        assert!(!OutputConfig::new(true, false, 0).human());
        assert!(!OutputConfig::new(false, true, 0).human());
    }

    #[test]
    fn test_format_unit() {
        let line = format_unit(&unit(BuildAction::Built, PublishAction::Uploaded));
        assert_eq!(line, "✓ linux-64/foo-1.0-0.tar.bz2: built, uploaded");

        let line = format_unit(&unit(BuildAction::Blocked, PublishAction::NotAttempted));
        assert!(line.starts_with(status::WARNING));
        assert!(line.ends_with("blocked by a failed dependency"));

        let line = format_unit(&unit(
            BuildAction::Skipped,
            PublishAction::Failed {
                error: "HTTP 500".to_string(),
            },
        ));
        assert!(line.starts_with(status::ERROR));
        assert!(line.contains("publish failed: HTTP 500"));
    }
}
