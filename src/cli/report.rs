//! Build report formatting and printing.
//!
//! Kept separate from the build itself so the library stays free of
//! terminal output.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::build::{BuildSummary, FileAction};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// One-line summary without the leading mark, e.g.
/// `olive_src -> src: 2 transformed, 1 copied`.
pub fn summary_line(summary: &BuildSummary) -> String {
    let parts: Vec<String> = [
        (summary.transformed(), "transformed"),
        (summary.unchanged(), "unchanged"),
        (summary.copied(), "copied"),
        (summary.skipped(), "skipped"),
        (summary.failed(), "failed"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, label)| format!("{count} {label}"))
    .collect();

    let counts = if parts.is_empty() {
        "no files".to_string()
    } else {
        parts.join(", ")
    };
    let dry_run = if summary.dry_run { " (dry run)" } else { "" };
    format!(
        "{} -> {}{}: {}",
        summary.mapping.source.display(),
        summary.mapping.output.display(),
        dry_run,
        counts
    )
}

pub fn print_build(summary: &BuildSummary, verbose: bool) {
    print_build_to(summary, verbose, &mut io::stdout().lock(), &mut io::stderr().lock());
}

/// Print a build summary to custom writers: details and the summary line
/// go to `out`, errors and warnings to `err`.
pub fn print_build_to<W: Write, E: Write>(summary: &BuildSummary, verbose: bool, out: &mut W, err: &mut E) {
    for file in &summary.files {
        if let FileAction::Failed(message) = &file.action {
            let _ = writeln!(err, "{} {}", "error:".bold().red(), message);
        }
    }

    if verbose {
        for file in &summary.files {
            let detail = match &file.action {
                FileAction::Transformed { merged, .. } => {
                    format!("{} ({})", "transformed".green(), plural(*merged, "comment"))
                }
                FileAction::Unchanged { .. } => "unchanged".dimmed().to_string(),
                FileAction::Copied => "copied".to_string(),
                FileAction::Skipped => "skipped".dimmed().to_string(),
                FileAction::Failed(_) => "failed".red().to_string(),
            };
            let path = summary.mapping.source.join(&file.path);
            let _ = writeln!(out, "  {} {}", detail, path.display());
        }
    }

    let unresolved = summary.unresolved();
    if unresolved > 0 {
        let _ = writeln!(
            err,
            "{} {} without a target element left in place",
            "warning:".bold().yellow(),
            plural(unresolved, "comment")
        );
    }

    let line = summary_line(summary);
    if summary.failed() > 0 {
        let _ = writeln!(out, "{} {}", FAILURE_MARK.red(), line.red());
    } else {
        let _ = writeln!(out, "{} {}", SUCCESS_MARK.green(), line.green());
    }
}
